use std::{cell::RefCell, rc::Rc};

use crate::{
    foundation::error::KinetypeResult,
    render::surface::Surface,
    text::glyphs::GlyphSource,
    text::layout::TextLayout,
    text::style::{StyleChange, StylePatch, TextStyle},
};

/// Shared handle to a text box; animators hold a weak reference to it.
pub type SharedTextBox = Rc<RefCell<TextBox>>;

/// Styled, wrapped text inside a clipped rectangle.
///
/// Text and font-size/width changes rebuild the chunk list immediately; bounds
/// and alignment changes only mark draw positions stale until the next paint.
pub struct TextBox {
    glyphs: Rc<dyn GlyphSource>,
    text: String,
    style: TextStyle,
    layout: TextLayout,
    position_dirty: bool,
}

impl std::fmt::Debug for TextBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBox")
            .field("text", &self.text)
            .field("style", &self.style)
            .field("chunks", &self.layout.chunks.len())
            .field("position_dirty", &self.position_dirty)
            .finish()
    }
}

impl TextBox {
    pub fn new(glyphs: Rc<dyn GlyphSource>, text: impl Into<String>) -> KinetypeResult<Self> {
        Self::with_style(glyphs, text, TextStyle::default())
    }

    pub fn with_style(
        glyphs: Rc<dyn GlyphSource>,
        text: impl Into<String>,
        style: TextStyle,
    ) -> KinetypeResult<Self> {
        let text = text.into();
        let layout = TextLayout::build(glyphs.as_ref(), &text, &style)?;
        Ok(Self {
            glyphs,
            text,
            style,
            layout,
            position_dirty: false,
        })
    }

    pub fn into_shared(self) -> SharedTextBox {
        Rc::new(RefCell::new(self))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn glyphs(&self) -> &Rc<dyn GlyphSource> {
        &self.glyphs
    }

    /// Current chunks. Positions may be stale until the next paint.
    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn is_position_dirty(&self) -> bool {
        self.position_dirty
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> KinetypeResult<()> {
        let text = text.into();
        self.layout = TextLayout::build(self.glyphs.as_ref(), &text, &self.style)?;
        self.text = text;
        self.position_dirty = false;
        Ok(())
    }

    /// Merge `patch` into the style.
    ///
    /// On a measurement error neither the style nor the layout changes.
    pub fn apply(&mut self, patch: &StylePatch) -> KinetypeResult<StyleChange> {
        let mut style = self.style.clone();
        let change = patch.apply_to(&mut style);
        if change.layout {
            self.layout = TextLayout::build(self.glyphs.as_ref(), &self.text, &style)?;
            self.position_dirty = false;
        } else if change.position {
            self.position_dirty = true;
        }
        self.style = style;
        Ok(change)
    }

    /// Paint background and glyphs clipped to the box. Surface state is
    /// restored before returning, also on error.
    pub fn paint(&mut self, surface: &mut dyn Surface) -> KinetypeResult<()> {
        if self.position_dirty {
            self.layout.reposition(&self.style);
            self.position_dirty = false;
        }

        surface.save();
        let res = self.paint_clipped(surface);
        surface.restore();
        res
    }

    fn paint_clipped(&self, surface: &mut dyn Surface) -> KinetypeResult<()> {
        let style = &self.style;
        let outline = style.bounds.outline();
        surface.clip(&outline);
        if style.outline {
            surface.set_stroke(style.foreground, 1.0);
            surface.stroke_path(&outline);
        }
        surface.set_fill(style.background);
        surface.fill_rect(style.bounds.rect());

        surface.set_fill(style.foreground);
        for chunk in &self.layout.chunks {
            if chunk.text.is_empty() {
                continue;
            }
            let baseline = self.layout.baseline(chunk, style.line_height);
            let path = self.glyphs.outline(&chunk.text, baseline, style.font_size)?;
            surface.fill_path(&path);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/text_box.rs"]
mod tests;
