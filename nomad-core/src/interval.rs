use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open occupancy window `[check_in, check_out)`.
///
/// The check-out day is not occupied, so a stay ending on a given day and
/// another starting that same day never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayInterval {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("check-out {check_out} must be strictly after check-in {check_in}")]
    Empty {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

impl StayInterval {
    /// Zero-length and inverted windows are invalid input, not
    /// always-available intervals.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, IntervalError> {
        if check_out <= check_in {
            return Err(IntervalError::Empty {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Overlap under half-open semantics. Touching endpoints
    /// (checkout day of one == checkin day of the next) do not overlap.
    pub fn overlaps(&self, other: &StayInterval) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn interval(check_in: &str, check_out: &str) -> StayInterval {
        StayInterval::new(date(check_in), date(check_out)).unwrap()
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = StayInterval::new(date("2024-05-01"), date("2024-05-01"));
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_rejected() {
        let result = StayInterval::new(date("2024-05-05"), date("2024-05-01"));
        assert!(result.is_err());
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = interval("2024-05-01", "2024-05-05");
        let b = interval("2024-05-05", "2024-05-08");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_one_day_overlap_conflicts() {
        let a = interval("2024-05-01", "2024-05-05");
        let b = interval("2024-05-04", "2024-05-06");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_contained_interval_conflicts() {
        let a = interval("2024-05-01", "2024-05-10");
        let b = interval("2024-05-03", "2024-05-04");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_nights() {
        assert_eq!(interval("2024-05-01", "2024-05-05").nights(), 4);
        assert_eq!(interval("2024-05-01", "2024-05-02").nights(), 1);
    }
}
