use crate::CoreError;

/// Infinity norm of a slice; NaN entries propagate as NaN.
pub fn inf_norm(values: &[f64]) -> f64 {
    let mut max = 0.0_f64;
    for &v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        max = max.max(v.abs());
    }
    max
}

pub fn ensure_len(values: &[f64], expected: usize, what: &'static str) -> Result<(), CoreError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(CoreError::Dimension {
            what,
            expected,
            got: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inf_norm_picks_largest_magnitude() {
        assert_eq!(inf_norm(&[]), 0.0);
        assert_eq!(inf_norm(&[1.0, -3.0, 2.0]), 3.0);
        assert!(inf_norm(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn ensure_len_reports_dimensions() {
        assert!(ensure_len(&[1.0, 2.0], 2, "x").is_ok());
        let err = ensure_len(&[1.0], 2, "x").unwrap_err();
        assert_eq!(
            err,
            CoreError::Dimension {
                what: "x",
                expected: 2,
                got: 1
            }
        );
        assert_eq!(err.to_string(), "Dimension mismatch for x: expected 2, got 1");
    }
}
