//! Worker Configuration

use serde::Deserialize;

use crate::error::ConfigError;

/// Controller configuration options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Animation worker settings
    pub animation: AnimationConfig,

    /// Computation worker settings
    pub computation: ComputationConfig,

    /// Marquee worker settings
    pub marquee: MarqueeConfig,

    /// Characters retained by the progress log
    pub progress_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            computation: ComputationConfig::default(),
            marquee: MarqueeConfig::default(),
            progress_capacity: 8000,
        }
    }
}

impl Config {
    /// Check every section, reporting the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let anim = &self.animation;
        if anim.width == 0 || anim.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: anim.width,
                height: anim.height,
            });
        }
        if anim.max_particles == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.computation.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.marquee.text.is_empty() {
            return Err(ConfigError::EmptyMarquee);
        }
        let marquee = &self.marquee;
        if marquee.step <= 0 {
            return Err(ConfigError::NonPositiveStep(marquee.step));
        }
        if marquee.visible_width <= 0 {
            return Err(ConfigError::NonPositiveVisibleWidth(marquee.visible_width));
        }
        if marquee.glyph_width <= 0 {
            return Err(ConfigError::NonPositiveGlyphWidth(marquee.glyph_width));
        }
        if self.progress_capacity == 0 {
            return Err(ConfigError::ZeroLogCapacity);
        }
        Ok(())
    }
}

/// Animation worker settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Initial delay between ticks (ms)
    pub delay_ms: u64,

    /// Upper bound on live particles
    pub max_particles: usize,

    /// Canvas width; particles spawn at its centre
    pub width: u32,

    /// Canvas height
    pub height: u32,

    /// Simulation time added per tick
    pub time_step: f64,

    /// Fixed RNG seed (random when absent)
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 40,
            max_particles: 200,
            width: 600,
            height: 400,
            time_step: 0.05,
            seed: None,
        }
    }
}

/// Computation worker settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComputationConfig {
    /// Initial delay between ticks (ms)
    pub delay_ms: u64,

    /// Series terms summed per consumed frame
    pub batch_size: u64,
}

impl Default for ComputationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 150,
            batch_size: 500,
        }
    }
}

/// Marquee worker settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Initial delay between ticks (ms)
    pub delay_ms: u64,

    /// Scroll distance per tick
    pub step: i32,

    /// Width of the visible strip; wrapped text re-enters here
    pub visible_width: i32,

    /// Advance of one character
    pub glyph_width: i32,

    /// Scrolled text
    pub text: String,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            delay_ms: 40,
            step: 3,
            visible_width: 1000,
            glyph_width: 8,
            text: "  Multithreaded application: running marquee example  ".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_canvas() {
        let mut config = Config::default();
        config.animation.height = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyCanvas { width: 600, height: 0 })
        );
    }

    #[test]
    fn test_rejects_zero_batch_and_text() {
        let mut config = Config::default();
        config.computation.batch_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyBatch));

        let mut config = Config::default();
        config.marquee.text.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyMarquee));
    }

    #[test]
    fn test_rejects_marquee_that_cannot_wrap() {
        let mut config = Config::default();
        config.marquee.step = -3;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveStep(-3)));

        config.marquee.step = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveStep(0)));

        config.marquee.step = i32::MIN;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveStep(i32::MIN)));

        let mut config = Config::default();
        config.marquee.visible_width = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveVisibleWidth(0)));

        let mut config = Config::default();
        config.marquee.glyph_width = -8;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveGlyphWidth(-8)));

        config.marquee.glyph_width = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveGlyphWidth(0)));
    }
}
