use crate::foundation::core::{Bounds, Point, Rgba8};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Horizontal placement of each wrapped line inside the box.
pub enum HAlign {
    /// Every line starts at the box's left edge.
    #[default]
    Left,
    /// Every line is centered on its own width.
    Center,
    /// Every line ends at the box's right edge.
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Vertical placement of the stacked lines inside the box.
pub enum VAlign {
    /// Block starts at the box's top edge.
    #[default]
    Top,
    /// Block is centered vertically.
    Center,
    /// Last line sits on the box's bottom edge.
    Bottom,
}

/// Full visual state of a [`TextBox`](crate::TextBox).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub background: Rgba8,
    pub foreground: Rgba8,
    pub bounds: Bounds,
    /// Multiplier applied to the row pitch.
    pub line_height: f64,
    /// Stroke the box rectangle when painting.
    pub outline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 48.0,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            background: Rgba8::TRANSPARENT,
            foreground: Rgba8::BLACK,
            bounds: Bounds::default(),
            line_height: 1.0,
            outline: false,
        }
    }
}

/// Partial style update.
///
/// Every `Some` field overrides the corresponding [`TextStyle`] value; `None` keeps it.
/// `origin`, `width` and `height` replace the matching parts of [`TextStyle::bounds`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_align: Option<HAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_align: Option<VAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Rgba8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<bool>,
}

/// Which cached layout state a patch invalidated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleChange {
    /// Chunks must be rebuilt (font size or box width changed).
    pub layout: bool,
    /// Draw positions must be recomputed (alignment, origin, height or line height changed).
    pub position: bool,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn font_size(mut self, v: f64) -> Self {
        self.font_size = Some(v);
        self
    }

    pub fn h_align(mut self, v: HAlign) -> Self {
        self.h_align = Some(v);
        self
    }

    pub fn v_align(mut self, v: VAlign) -> Self {
        self.v_align = Some(v);
        self
    }

    pub fn background(mut self, v: Rgba8) -> Self {
        self.background = Some(v);
        self
    }

    pub fn foreground(mut self, v: Rgba8) -> Self {
        self.foreground = Some(v);
        self
    }

    pub fn origin(mut self, v: Point) -> Self {
        self.origin = Some(v);
        self
    }

    pub fn width(mut self, v: f64) -> Self {
        self.width = Some(v);
        self
    }

    pub fn height(mut self, v: f64) -> Self {
        self.height = Some(v);
        self
    }

    pub fn line_height(mut self, v: f64) -> Self {
        self.line_height = Some(v);
        self
    }

    pub fn outline(mut self, v: bool) -> Self {
        self.outline = Some(v);
        self
    }

    /// Merge into `style`, reporting which caches the changed fields invalidate.
    ///
    /// Fields set to the value they already hold do not count as changes.
    pub fn apply_to(&self, style: &mut TextStyle) -> StyleChange {
        fn set<T: PartialEq + Copy>(slot: &mut T, v: Option<T>) -> bool {
            match v {
                Some(v) if *slot != v => {
                    *slot = v;
                    true
                }
                _ => false,
            }
        }

        let mut change = StyleChange::default();
        change.layout |= set(&mut style.font_size, self.font_size);
        change.layout |= set(&mut style.bounds.width, self.width);
        change.position |= set(&mut style.h_align, self.h_align);
        change.position |= set(&mut style.v_align, self.v_align);
        change.position |= set(&mut style.bounds.origin, self.origin);
        change.position |= set(&mut style.bounds.height, self.height);
        change.position |= set(&mut style.line_height, self.line_height);
        set(&mut style.background, self.background);
        set(&mut style.foreground, self.foreground);
        set(&mut style.outline, self.outline);
        change
    }

    /// Patch that would reset every field this patch touches back to `style`'s value.
    pub fn snapshot_of(&self, style: &TextStyle) -> Self {
        Self {
            font_size: self.font_size.map(|_| style.font_size),
            h_align: self.h_align.map(|_| style.h_align),
            v_align: self.v_align.map(|_| style.v_align),
            background: self.background.map(|_| style.background),
            foreground: self.foreground.map(|_| style.foreground),
            origin: self.origin.map(|_| style.bounds.origin),
            width: self.width.map(|_| style.bounds.width),
            height: self.height.map(|_| style.bounds.height),
            line_height: self.line_height.map(|_| style.line_height),
            outline: self.outline.map(|_| style.outline),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/style.rs"]
mod tests;
