use crate::{
    animation::ease::Ease,
    foundation::core::{Point, Rgba8},
};

/// Values a [`PropertyAnimator`](crate::PropertyAnimator) can ease between two states.
pub trait Lerp: Copy {
    fn eased(ease: Ease, elapsed: f64, from: Self, to: Self, duration: f64) -> Self;
}

impl Lerp for f64 {
    fn eased(ease: Ease, elapsed: f64, from: Self, to: Self, duration: f64) -> Self {
        ease.interpolate(elapsed, from, to, duration)
    }
}

impl Lerp for Point {
    fn eased(ease: Ease, elapsed: f64, from: Self, to: Self, duration: f64) -> Self {
        Point::new(
            ease.interpolate(elapsed, from.x, to.x, duration),
            ease.interpolate(elapsed, from.y, to.y, duration),
        )
    }
}

impl Lerp for Rgba8 {
    fn eased(ease: Ease, elapsed: f64, from: Self, to: Self, duration: f64) -> Self {
        let channel = |a: u8, b: u8| -> u8 {
            let v = ease.interpolate(elapsed, f64::from(a), f64::from(b), duration);
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba8::new(
            channel(from.r, to.r),
            channel(from.g, to.g),
            channel(from.b, to.b),
            channel(from.a, to.a),
        )
    }
}
