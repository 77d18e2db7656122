#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Grabs single video frames by driving an external `ffmpeg`.
//!
//! Nothing here links against libav; the transcoder is a subprocess that can always be
//! killed, which is what lets callers put hard deadlines on hostile inputs.

mod error;
mod grabber;
mod process;
mod transcoder;

pub use error::Error;
pub use grabber::{FrameGrabber, FrameGrabberBuilder};
pub use process::{run_with_deadline, ProcessOutput};
pub use transcoder::{Transcoder, DEFAULT_PROGRAM};
