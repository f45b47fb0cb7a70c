use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Calendar month labels in their fixed order, Jan = 0 ... Dec = 11.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub fn all() -> [Month; 12] {
        [
            Month::Jan,
            Month::Feb,
            Month::Mar,
            Month::Apr,
            Month::May,
            Month::Jun,
            Month::Jul,
            Month::Aug,
            Month::Sep,
            Month::Oct,
            Month::Nov,
            Month::Dec,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Month::all().get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        MONTH_LABELS[self.index()]
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MONTH_LABELS
            .iter()
            .position(|label| label.eq_ignore_ascii_case(trimmed))
            .and_then(Month::from_index)
            .ok_or_else(|| ValidationError::InvalidMonth(s.to_string()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `(month, year)` bucket. Ordering is chronological: year first, then
/// month index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Period {
        Period { year, month }
    }

    pub fn successor(self) -> Period {
        match Month::from_index(self.month.index() + 1) {
            Some(month) => Period::new(self.year, month),
            None => Period::new(self.year + 1, Month::Jan),
        }
    }

    pub fn predecessor(self) -> Period {
        match self.month.index().checked_sub(1).and_then(Month::from_index) {
            Some(month) => Period::new(self.year, month),
            None => Period::new(self.year - 1, Month::Dec),
        }
    }

    /// Short label used on chart axes, e.g. `Jan-2025`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.month, self.year)
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month.index()).cmp(&(other.year, other.month.index()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parsing() {
        assert_eq!("Jan".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!(" dec ".parse::<Month>().unwrap(), Month::Dec);
        assert!("January".parse::<Month>().is_err());
        assert!("".parse::<Month>().is_err());
    }

    #[test]
    fn test_period_ordering() {
        let a = Period::new(2025, Month::Dec);
        let b = Period::new(2026, Month::Jan);
        let c = Period::new(2026, Month::Mar);
        assert!(a < b);
        assert!(b < c);

        let mut periods = vec![c, a, b];
        periods.sort();
        assert_eq!(periods, vec![a, b, c]);
    }

    #[test]
    fn test_successor_and_predecessor_wrap_years() {
        let dec = Period::new(2025, Month::Dec);
        assert_eq!(dec.successor(), Period::new(2026, Month::Jan));
        assert_eq!(Period::new(2026, Month::Jan).predecessor(), dec);
        assert_eq!(
            Period::new(2025, Month::Jun).successor().predecessor(),
            Period::new(2025, Month::Jun)
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(Period::new(2027, Month::Aug).label(), "Aug-2027");
        assert_eq!(Period::new(2025, Month::Jan).to_string(), "Jan-2025");
    }
}
