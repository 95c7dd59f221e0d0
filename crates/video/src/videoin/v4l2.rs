use {
    crate::*,
    base::*,
    image::{Image, PixelFormat},
    v4l::{
        Device, Format, FourCC, buffer::Type, io::mmap::Stream as MmapStream,
        io::traits::CaptureStream, video::Capture,
    },
};

pub(crate) struct V4l2 {
    stream: Option<MmapStream<'static>>,
    size: Vec2<usize>,
    format: PixelFormat,
}

impl V4l2 {
    pub fn new() -> Self {
        Self {
            stream: None,
            size: Vec2::zero(),
            format: PixelFormat::Yuyv,
        }
    }
}

impl VideoInDevice for V4l2 {
    fn open(&mut self, config: &CaptureConfig) -> Result<Negotiated, VideoError> {
        // close stream
        self.stream.take();

        let path = match config.backend() {
            CaptureBackend::V4l2 { path } => path.clone(),
            other => {
                return Err(VideoError::Device(format!(
                    "V4l2::open called with {:?}",
                    other
                )));
            }
        };

        // create device from path or default
        let device = match &path {
            Some(path) => Device::with_path(path)?,
            None => Device::new(0)?,
        };
        let device_format = Capture::format(&device)?;

        // ask for the hinted size, keep the device's fourcc when it is usable
        let desired_fourcc = match &device_format.fourcc.repr {
            b"MJPG" => FourCC::new(b"MJPG"),
            _ => FourCC::new(b"YUYV"),
        };
        let hint = config.size();
        let actual_format = Capture::set_format(
            &device,
            &Format::new(hint.x as u32, hint.y as u32, desired_fourcc),
        )?;

        // read back what the driver actually picked
        self.size = Vec2::new(actual_format.width as usize, actual_format.height as usize);
        self.format = match &actual_format.fourcc.repr {
            b"YUYV" => PixelFormat::Yuyv,
            b"MJPG" => PixelFormat::Jpeg,
            _ => {
                return Err(VideoError::Device(format!(
                    "unsupported pixel format: {}",
                    actual_format.fourcc
                )));
            }
        };

        let actual_params = Capture::set_params(
            &device,
            &v4l::video::capture::Parameters::with_fps(config.frame_rate().round() as u32),
        )?;
        let frame_rate = if actual_params.interval.numerator == 0 {
            config.frame_rate()
        } else {
            actual_params.interval.denominator as f32 / actual_params.interval.numerator as f32
        };

        self.stream = match MmapStream::with_buffers(&device, Type::VideoCapture, 4u32) {
            Ok(stream) => Some(stream),
            Err(error) => return Err(VideoError::from(error)),
        };

        if self.size != hint {
            log_info!("v4l2: asked for {}, device delivers {}", hint, self.size);
        }

        Ok(Negotiated {
            size: self.size,
            format: self.format,
            frame_rate,
        })
    }

    fn close(&mut self) {
        self.stream.take();
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(VideoError::Stream("no stream".to_string()));
        };
        match CaptureStream::next(stream) {
            Ok((frame_data, metadata)) => {
                // mmap buffers may be padded past the frame
                let used = match self.format {
                    PixelFormat::Jpeg => metadata.bytesused as usize,
                    _ => self.size.area() * 2,
                };
                let data = frame_data[..used.min(frame_data.len())].to_vec();
                Ok(Image::new(self.size, data, self.format))
            }
            Err(error) => Err(VideoError::Stream(error.to_string())),
        }
    }
}
