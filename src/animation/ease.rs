use std::f64::consts::PI;

/// Easing functions used to map normalized tween progress.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Elastic ease-out: overshoots the target and settles with a decaying oscillation.
    OutElastic {
        /// Overshoot amplitude, clamped to `[1, 10]`.
        amplitude: f64,
        /// Oscillation period, clamped to `[0.1, 2]`.
        period: f64,
    },
}

impl Default for Ease {
    fn default() -> Self {
        Self::out_elastic()
    }
}

impl Ease {
    /// Elastic ease-out with amplitude `1` and period `0.8`.
    pub fn out_elastic() -> Self {
        Self::OutElastic {
            amplitude: 1.0,
            period: 0.8,
        }
    }

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    ///
    /// Every variant maps `0 -> 0` and `1 -> 1` exactly. Elastic output may leave `[0, 1]` in
    /// between.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
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
            Self::OutElastic { amplitude, period } => {
                1.0 - in_elastic(1.0 - t, amplitude, period)
            }
        }
    }

    /// Return `true` when parameters are finite.
    pub fn is_valid(self) -> bool {
        match self {
            Self::OutElastic { amplitude, period } => amplitude.is_finite() && period.is_finite(),
            _ => true,
        }
    }
}

fn in_elastic(t: f64, amplitude: f64, period: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let a = amplitude.clamp(1.0, 10.0);
    let p = period.clamp(0.1, 2.0);
    let s = p / (2.0 * PI) * (1.0 / a).asin();
    -a * 2f64.powf(10.0 * (t - 1.0)) * (((t - 1.0) - s) * (2.0 * PI) / p).sin()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
