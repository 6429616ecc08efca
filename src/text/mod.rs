pub mod glyphs;
pub mod layout;
pub mod style;
pub mod svg_font;
pub mod text_box;
