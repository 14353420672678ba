//! Text-mode stand-ins for the animation and marquee panels

use tickwork::{FrameRenderer, FrameView, MarqueeRenderer};

/// Logs a one-line summary of each animation frame
#[derive(Debug, Default)]
pub struct FrameLogger {
    frames: u64,
}

impl FrameRenderer for FrameLogger {
    fn render_frame(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;
        let brightest = frame
            .particles
            .iter()
            .map(|p| p.alpha)
            .fold(0.0_f32, f32::max);
        tracing::trace!(
            target: "tickwork_demo::animation",
            frame = self.frames,
            time = frame.time,
            particles = frame.particles.len(),
            brightest,
            "frame"
        );
    }
}

/// Logs the visible slice of the marquee strip
#[derive(Debug)]
pub struct MarqueeLogger {
    /// Visible columns
    columns: usize,
    /// Width of one column in marquee units
    glyph_width: i32,
}

impl MarqueeLogger {
    pub fn new(columns: usize, glyph_width: i32) -> Self {
        Self {
            columns,
            glyph_width: glyph_width.max(1),
        }
    }

    /// Strip contents for a text drawn at `offset`
    pub fn visible(&self, text: &str, offset: i32) -> String {
        let start = offset / self.glyph_width;
        (0..self.columns as i32)
            .map(|col| {
                usize::try_from(col - start)
                    .ok()
                    .and_then(|idx| text.chars().nth(idx))
                    .unwrap_or(' ')
            })
            .collect()
    }
}

impl MarqueeRenderer for MarqueeLogger {
    fn render_marquee(&mut self, text: &str, offset: i32) {
        tracing::trace!(
            target: "tickwork_demo::marquee",
            offset,
            "[{}]",
            self.visible(text, offset)
        );
    }
}
