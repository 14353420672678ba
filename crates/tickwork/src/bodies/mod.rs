//! Tick bodies for the three demo workers

mod animation;
mod computation;
mod marquee;

pub use animation::{AnimationBody, FrameView, Particle};
pub use computation::{ComputationBody, progress_line};
pub use marquee::MarqueeBody;
