use std::{cell::RefCell, path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::core::{BezPath, Point, Rect},
    foundation::error::{KinetypeError, KinetypeResult},
    text::glyphs::GlyphSource,
};

/// Glyph source backed by `usvg` text-to-path conversion.
///
/// Outlines and ink bounds come from usvg's flattened text; advance widths come
/// from a Parley layout over the same font bytes so that spaces are measured.
pub struct SvgGlyphs {
    family: String,
    fontdb: Arc<usvg::fontdb::Database>,
    measure: RefCell<Measurer>,
}

struct Measurer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family: String,
}

impl std::fmt::Debug for SvgGlyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgGlyphs")
            .field("family", &self.family)
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl SvgGlyphs {
    /// Load a single `.ttf`/`.otf` file and use its first family.
    pub fn from_font_file(path: &Path) -> KinetypeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?;
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes);
        let family = db
            .faces()
            .next()
            .and_then(|f| f.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| {
                KinetypeError::config(format!("no font faces found in '{}'", path.display()))
            })?;
        Self::from_database(db, &family)
    }

    /// Resolve `family` (falling back to any sans-serif face) among system fonts.
    pub fn system(family: &str) -> KinetypeResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db, family)
    }

    #[tracing::instrument(skip(db), fields(faces = db.len()))]
    pub fn from_database(db: usvg::fontdb::Database, family: &str) -> KinetypeResult<Self> {
        use usvg::fontdb::{Family, Query};

        let id = db
            .query(&Query {
                families: &[Family::Name(family), Family::SansSerif],
                ..Query::default()
            })
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| KinetypeError::config("font database has no faces"))?;
        let resolved = db
            .face(id)
            .and_then(|f| f.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| KinetypeError::config("resolved font face has no family name"))?;
        let bytes = db
            .with_face_data(id, |data, _index| data.to_vec())
            .ok_or_else(|| KinetypeError::config("font face data is unavailable"))?;

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            KinetypeError::config("no font families registered from font bytes")
        })?;
        let measure_family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| KinetypeError::config("registered font family has no name"))?
            .to_string();

        if resolved != family {
            tracing::debug!(requested = family, resolved = %resolved, "font family fallback");
        }

        Ok(Self {
            family: resolved,
            fontdb: Arc::new(db),
            measure: RefCell::new(Measurer {
                font_ctx,
                layout_ctx: parley::LayoutContext::new(),
                family: measure_family,
            }),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn parse(&self, text: &str, baseline: Point, font_size: f64) -> KinetypeResult<usvg::Tree> {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="{x}" y="{y}" font-family="{family}" font-size="{size}" xml:space="preserve">{body}</text></svg>"#,
            x = baseline.x,
            y = baseline.y,
            family = escape_xml(&self.family),
            size = font_size,
            body = escape_xml(text),
        );
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| KinetypeError::layout(format!("text outline failed: {e}")))?;
        Ok(tree)
    }
}

impl GlyphSource for SvgGlyphs {
    fn outline(&self, text: &str, baseline: Point, font_size: f64) -> KinetypeResult<BezPath> {
        let mut out = BezPath::new();
        if text.trim().is_empty() || font_size <= 0.0 {
            return Ok(out);
        }
        let tree = self.parse(text, baseline, font_size)?;
        collect_paths(tree.root(), &mut out);
        Ok(out)
    }

    fn bounding_box(&self, text: &str, font_size: f64) -> KinetypeResult<Rect> {
        if text.trim().is_empty() || font_size <= 0.0 {
            return Ok(Rect::ZERO);
        }
        let tree = self.parse(text, Point::ZERO, font_size)?;
        Ok(find_text_bounds(tree.root()).unwrap_or(Rect::ZERO))
    }

    fn advance_width(&self, text: &str, font_size: f64) -> KinetypeResult<f64> {
        if text.is_empty() || font_size <= 0.0 {
            return Ok(0.0);
        }
        let mut m = self.measure.borrow_mut();
        let Measurer {
            font_ctx,
            layout_ctx,
            family,
        } = &mut *m;

        let mut builder = layout_ctx.ranged_builder(font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size as f32));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(f64::from(layout.full_width()))
    }
}

fn collect_paths(group: &usvg::Group, out: &mut BezPath) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_paths(g, out),
            usvg::Node::Text(t) => collect_paths(t.flattened(), out),
            usvg::Node::Path(p) => append_path(p, out),
            usvg::Node::Image(_) => {}
        }
    }
}

fn append_path(path: &usvg::Path, out: &mut BezPath) {
    use usvg::tiny_skia_path::PathSegment;

    let ts = path.abs_transform();
    let map = |p: usvg::tiny_skia_path::Point| -> Point {
        let (x, y) = (f64::from(p.x), f64::from(p.y));
        Point::new(
            f64::from(ts.sx) * x + f64::from(ts.kx) * y + f64::from(ts.tx),
            f64::from(ts.ky) * x + f64::from(ts.sy) * y + f64::from(ts.ty),
        )
    };
    for seg in path.data().segments() {
        match seg {
            PathSegment::MoveTo(p) => out.move_to(map(p)),
            PathSegment::LineTo(p) => out.line_to(map(p)),
            PathSegment::QuadTo(p1, p2) => out.quad_to(map(p1), map(p2)),
            PathSegment::CubicTo(p1, p2, p3) => out.curve_to(map(p1), map(p2), map(p3)),
            PathSegment::Close => out.close_path(),
        }
    }
}

fn find_text_bounds(group: &usvg::Group) -> Option<Rect> {
    for node in group.children() {
        match node {
            usvg::Node::Text(t) => {
                let r = t.bounding_box();
                return Some(Rect::new(
                    f64::from(r.left()),
                    f64::from(r.top()),
                    f64::from(r.right()),
                    f64::from(r.bottom()),
                ));
            }
            usvg::Node::Group(g) => {
                if let Some(r) = find_text_bounds(g) {
                    return Some(r);
                }
            }
            usvg::Node::Path(_) | usvg::Node::Image(_) => {}
        }
    }
    None
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
