use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Named easing curves.
///
/// Serialized by name (`"easeInQuad"`, `"linear"`, ...). Unknown names are rejected
/// at deserialization and by [`Ease::from_name`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    Linear,
    #[default]
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
}

impl Ease {
    pub const ALL: [Self; 15] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InExpo,
        Self::OutExpo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeInQuad",
            Self::OutQuad => "easeOutQuad",
            Self::InOutQuad => "easeInOutQuad",
            Self::InCubic => "easeInCubic",
            Self::OutCubic => "easeOutCubic",
            Self::InOutCubic => "easeInOutCubic",
            Self::InQuart => "easeInQuart",
            Self::OutQuart => "easeOutQuart",
            Self::InOutQuart => "easeInOutQuart",
            Self::InSine => "easeInSine",
            Self::OutSine => "easeOutSine",
            Self::InOutSine => "easeInOutSine",
            Self::InExpo => "easeInExpo",
            Self::OutExpo => "easeOutExpo",
        }
    }

    /// Look up a curve by its table name.
    pub fn from_name(name: &str) -> KinetypeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| KinetypeError::config(format!("unknown easing function '{name}'")))
    }

    /// Map normalized progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        use std::f64::consts::PI;

        // Endpoints are pinned; trig curves would otherwise round just short of 1.
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => 2f64.powf(10.0 * t - 10.0),
            Self::OutExpo => 1.0 - 2f64.powf(-10.0 * t),
        }
    }

    /// `(elapsed, from, to, duration) -> value`.
    ///
    /// Returns exactly `from` at `elapsed <= 0`, exactly `to` at `elapsed >= duration`,
    /// and `from` throughout when `from == to`.
    pub fn interpolate(self, elapsed: f64, from: f64, to: f64, duration: f64) -> f64 {
        if from == to || elapsed <= 0.0 {
            return from;
        }
        if elapsed >= duration {
            return to;
        }
        let p = self.apply(elapsed / duration);
        from * (1.0 - p) + to * p
    }
}

impl TryFrom<String> for Ease {
    type Error = KinetypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.name().to_string()
    }
}

impl std::fmt::Display for Ease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
