//! Audio capture: the live-recognition seam and the raw microphone
//! recorder.

pub mod recognition;
pub mod recorder;
