//! Live detection overlay client.
//!
//! Frames from a camera are sampled at a fixed rate, JPEG-encoded and streamed
//! to a remote detection service over a websocket. Whatever the service sends
//! back replaces the current detection set, which the overlay renderer draws
//! on top of the live picture. `Session` ties the pieces together and owns
//! every resource the pipeline holds.

mod channel;
pub use channel::*;

mod config;
pub use config::*;

pub mod font;

mod model;
pub use model::*;

mod overlay;
pub use overlay::*;

mod protocol;
pub use protocol::*;

mod sampler;
pub use sampler::*;

mod session;
pub use session::*;

mod state;
pub use state::*;

mod stats;
pub use stats::*;

mod store;
pub use store::*;
