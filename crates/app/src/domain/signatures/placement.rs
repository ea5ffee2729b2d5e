//! Where on the last page the signature goes.

/// Relative signature position and size.
///
/// `x_ratio` is measured from the left edge and `y_ratio` from the top edge of the page, both
/// as fractions of the page size. `scale` is the stamp width as a fraction of the page width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignaturePlacement {
    pub x_ratio: f64,
    pub y_ratio: f64,
    pub scale: f64,
}

impl SignaturePlacement {
    pub const DEFAULT_X_RATIO: f64 = 0.72;
    pub const DEFAULT_Y_RATIO: f64 = 0.82;
    pub const DEFAULT_SCALE: f64 = 0.20;

    pub const MIN_SCALE: f64 = 0.08;
    pub const MAX_SCALE: f64 = 0.5;

    /// Build a placement, clamping every field into range. Non-finite values fall back to the
    /// field's default.
    #[must_use]
    pub fn new(x_ratio: f64, y_ratio: f64, scale: f64) -> Self {
        Self {
            x_ratio: clamp_or(x_ratio, 0.0, 1.0, Self::DEFAULT_X_RATIO),
            y_ratio: clamp_or(y_ratio, 0.0, 1.0, Self::DEFAULT_Y_RATIO),
            scale: clamp_or(scale, Self::MIN_SCALE, Self::MAX_SCALE, Self::DEFAULT_SCALE),
        }
    }

    /// Parse raw form values. Missing or unparseable fields use their defaults independently.
    #[must_use]
    pub fn parse(x_ratio: Option<&str>, y_ratio: Option<&str>, scale: Option<&str>) -> Self {
        Self::new(
            parse_or(x_ratio, Self::DEFAULT_X_RATIO),
            parse_or(y_ratio, Self::DEFAULT_Y_RATIO),
            parse_or(scale, Self::DEFAULT_SCALE),
        )
    }
}

impl Default for SignaturePlacement {
    fn default() -> Self {
        Self {
            x_ratio: Self::DEFAULT_X_RATIO,
            y_ratio: Self::DEFAULT_Y_RATIO,
            scale: Self::DEFAULT_SCALE,
        }
    }
}

fn parse_or(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

fn clamp_or(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(
            SignaturePlacement::parse(None, None, None),
            SignaturePlacement::default()
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let placement = SignaturePlacement::parse(Some("1.5"), Some("-0.25"), Some("0.9"));

        assert_eq!(
            placement,
            SignaturePlacement {
                x_ratio: 1.0,
                y_ratio: 0.0,
                scale: 0.5,
            }
        );
    }

    #[test]
    fn tiny_scale_is_raised_to_minimum() {
        let placement = SignaturePlacement::parse(None, None, Some("0.01"));

        assert!((placement.scale - SignaturePlacement::MIN_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_fields_fall_back_individually() {
        let placement = SignaturePlacement::parse(Some(" 0.25 "), Some("top"), Some("NaN"));

        assert_eq!(
            placement,
            SignaturePlacement {
                x_ratio: 0.25,
                y_ratio: SignaturePlacement::DEFAULT_Y_RATIO,
                scale: SignaturePlacement::DEFAULT_SCALE,
            }
        );
    }

    #[test]
    fn infinite_values_use_defaults() {
        let placement = SignaturePlacement::new(f64::INFINITY, 0.5, f64::NEG_INFINITY);

        assert_eq!(placement.x_ratio, SignaturePlacement::DEFAULT_X_RATIO);
        assert_eq!(placement.scale, SignaturePlacement::DEFAULT_SCALE);
    }
}
