use super::ControlError;

/// The [start, end) time window that should repeat. Only ever built through
/// `new`, so holding one means the invariant already checked out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl LoopRegion {
    /// Validate and build a region. Rejects start >= end rather than
    /// clamping - a silently adjusted region surprises nobody pleasantly.
    pub fn new(start_seconds: f64, end_seconds: f64) -> Result<Self, ControlError> {
        if start_seconds < 0.0
            || !start_seconds.is_finite()
            || !end_seconds.is_finite()
            || start_seconds >= end_seconds
        {
            return Err(ControlError::InvalidRegion {
                start: start_seconds,
                end: end_seconds,
            });
        }

        Ok(Self {
            start_seconds,
            end_seconds,
        })
    }

    /// The whole media item as a region, used as the default once the
    /// duration becomes known.
    pub fn full(duration_seconds: f64) -> Self {
        Self {
            start_seconds: 0.0,
            end_seconds: duration_seconds,
        }
    }

    pub fn len_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_region() {
        let region = LoopRegion::new(5.0, 10.0).unwrap();
        assert_eq!(region.start_seconds, 5.0);
        assert_eq!(region.end_seconds, 10.0);
        assert_eq!(region.len_seconds(), 5.0);
    }

    #[test]
    fn test_start_must_be_below_end() {
        assert!(LoopRegion::new(10.0, 5.0).is_err());
        assert!(LoopRegion::new(5.0, 5.0).is_err());
    }

    #[test]
    fn test_negative_and_nonfinite_rejected() {
        assert!(LoopRegion::new(-1.0, 5.0).is_err());
        assert!(LoopRegion::new(f64::NAN, 5.0).is_err());
        assert!(LoopRegion::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_carries_the_offending_bounds() {
        let err = LoopRegion::new(10.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            ControlError::InvalidRegion {
                start: 10.0,
                end: 5.0
            }
        );
    }
}
