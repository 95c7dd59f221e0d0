//! Camera capture for the finder pipeline.
//!
//! A device is opened on a blocking worker thread and every frame it delivers
//! lands in a single latest-frame slot. Consumers sample that slot at their
//! own cadence; nothing queues up behind a slow reader.

mod capture;
pub use capture::*;

mod config;
pub use config::*;

mod videoerror;
pub use videoerror::*;

mod videoframe;
pub use videoframe::*;

mod videoin;
pub use videoin::*;
