pub use kurbo::{BezPath, Point, Rect};

/// Straight (non-premultiplied) RGBA8 color.
///
/// Serialized as a `[r, g, b, a]` array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn premultiplied(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        c.to_array()
    }
}

/// Rectangular placement of a text box.
///
/// `origin` is the bottom-left corner (`x1`, `y1`); the box extends `width` to the
/// right and `height` upwards, i.e. it covers `[y1 - height, y1]` on a y-down surface.
/// Corner points are always derived from these three fields and never stored.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, 100.0),
            width: 300.0,
            height: 100.0,
        }
    }
}

impl Bounds {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn x1(&self) -> f64 {
        self.origin.x
    }

    pub fn y1(&self) -> f64 {
        self.origin.y
    }

    /// The four corners, clockwise starting at the origin.
    pub fn corners(&self) -> [Point; 4] {
        let Point { x, y } = self.origin;
        [
            Point::new(x, y),
            Point::new(x, y - self.height),
            Point::new(x + self.width, y - self.height),
            Point::new(x + self.width, y),
        ]
    }

    pub fn rect(&self) -> Rect {
        let [p1, _, p3, _] = self.corners();
        Rect::from_points(p1, p3)
    }

    /// Closed quad through the four corners.
    pub fn outline(&self) -> BezPath {
        let [p1, p2, p3, p4] = self.corners();
        let mut path = BezPath::new();
        path.move_to(p1);
        path.line_to(p2);
        path.line_to(p3);
        path.line_to(p4);
        path.close_path();
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
