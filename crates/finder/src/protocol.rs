use {
    base::{Rect, Vec2},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// One encoded frame on its way to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePayload {
    pub encoded_image: Vec<u8>,
    pub captured_at_ms: u64,
    pub sequence_number: u64,
}

impl FramePayload {
    pub fn to_message(&self) -> FrameMessage {
        FrameMessage {
            frame: image::jpeg_data_uri(&self.encoded_image),
            timestamp: self.captured_at_ms,
            frame_count: self.sequence_number,
        }
    }
}

/// Outbound wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    pub frame: String,
    pub timestamp: u64,
    pub frame_count: u64,
}

/// Box corners in the coordinates of the transmitted frame. On the wire this
/// is the array `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Corners are taken per axis, so `x2 < x1` or `y2 < y1` spans the same area.
    pub fn to_rect(&self) -> Rect<f32> {
        Rect::from_min_max(
            Vec2::new(self.x1.min(self.x2), self.y1.min(self.y2)),
            Vec2::new(self.x1.max(self.x2), self.y1.max(self.y2)),
        )
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub bbox: BoundingBox,
    pub class_name: String,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_class: Option<String>,
}

impl DetectionRecord {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            class_name: class_name.into(),
            confidence,
            class_id: None,
            original_class: None,
        }
    }

    /// Overlay label, e.g. `bottle 87.0%`.
    pub fn label(&self) -> String {
        format!("{} {:.1}%", self.class_name, self.confidence * 100.0)
    }
}

/// Everything the service reported for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSet {
    pub detections: Vec<DetectionRecord>,
    pub frame_count: u64,
    pub timestamp: Option<u64>,
}

impl DetectionSet {
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Inbound wire message.
///
/// Error replies from the service carry `error` and an empty detection list
/// but no `frame_count`, hence the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<DetectionRecord>>,
    #[serde(default)]
    pub frame_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultMessage {
    /// Parse one text message. A message must carry `detections`, `error`,
    /// or both.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let message: ResultMessage = serde_json::from_str(text)?;
        if message.detections.is_none() && message.error.is_none() {
            return Err(ProtocolError::Malformed(
                "neither detections nor error present".to_string(),
            ));
        }
        Ok(message)
    }

    pub fn into_set(self) -> DetectionSet {
        DetectionSet {
            detections: self.detections.unwrap_or_default(),
            frame_count: self.frame_count,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    Malformed(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(msg) => write!(f, "malformed message: {}", msg),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Malformed(error.to_string())
    }
}
