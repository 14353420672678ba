//! Marquee tick body

use crate::config::MarqueeConfig;
use crate::sink::MarqueeRenderer;
use crate::worker::TickBody;

/// Scrolls a line of text leftwards, re-entering from the right edge
pub struct MarqueeBody {
    text: String,
    offset: i32,
    step: i32,
    visible_width: i32,
    text_width: i32,
    renderer: Box<dyn MarqueeRenderer>,
}

impl std::fmt::Debug for MarqueeBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarqueeBody")
            .field("text", &self.text)
            .field("offset", &self.offset)
            .finish()
    }
}

impl MarqueeBody {
    pub fn new(config: &MarqueeConfig, renderer: impl MarqueeRenderer + 'static) -> Self {
        let glyphs = i32::try_from(config.text.chars().count()).unwrap_or(i32::MAX);
        Self {
            text: config.text.clone(),
            offset: 0,
            step: config.step,
            visible_width: config.visible_width,
            text_width: glyphs.saturating_mul(config.glyph_width),
            renderer: Box::new(renderer),
        }
    }

    /// X position of the first glyph
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Rendered width of the text
    pub fn text_width(&self) -> i32 {
        self.text_width
    }

    /// Scrolled text
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TickBody for MarqueeBody {
    fn tick(&mut self) {
        self.offset = self.offset.saturating_sub(self.step);
        if self.offset < self.text_width.saturating_neg() {
            self.offset = self.visible_width;
        }
        self.renderer.render_marquee(&self.text, self.offset);
    }
}
