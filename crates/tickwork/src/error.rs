//! Configuration errors
//!
//! Worker control never fails; only a configuration can be rejected.

/// Rejected configuration value
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Canvas must have a positive area
    #[error("Animation canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    /// Particle cap of zero
    #[error("Animation max_particles must be at least 1")]
    NoParticles,

    /// Computation batch of zero terms
    #[error("Computation batch_size must be at least 1")]
    EmptyBatch,

    /// Nothing to scroll
    #[error("Marquee text must not be empty")]
    EmptyMarquee,

    /// Marquee that would not move leftwards
    #[error("Marquee step must be at least 1, got {0}")]
    NonPositiveStep(i32),

    /// Strip with nowhere to re-enter
    #[error("Marquee visible_width must be at least 1, got {0}")]
    NonPositiveVisibleWidth(i32),

    /// Glyph width of zero or less
    #[error("Marquee glyph_width must be at least 1, got {0}")]
    NonPositiveGlyphWidth(i32),

    /// Progress log that cannot hold a line
    #[error("Progress log capacity must be at least 1 character")]
    ZeroLogCapacity,
}
