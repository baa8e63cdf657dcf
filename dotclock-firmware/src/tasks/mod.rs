//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod buttons;
pub mod render;
pub mod settings;

pub use buttons::button_task;
pub use render::{render_task, Matrix, RenderContext, Sampler};
pub use settings::settings_task;
