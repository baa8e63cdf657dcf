//! Views drawn onto the canvas
//!
//! Each view owns its animation timers and repaints the whole canvas when
//! rendered. None of them touch the hardware.

pub mod clock;
pub mod loading;
pub mod spectrum;

pub use clock::ClockFace;
pub use loading::LoadingScreen;
pub use spectrum::SpectrumPipeline;
