use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::period::{Month, Period};

/// One recorded investment: what was put into a fund in a given month and the
/// total value of that fund observed at the end of the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct Entry {
    #[serde(rename = "sipName")]
    fund_name: String,
    #[serde(rename = "amount")]
    invested: f64,
    #[serde(rename = "currentAmount")]
    current: f64,
    year: i32,
    month: Month,
}

/// Entry as it appears in the data file, before the month label is checked.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "sipName", alias = "fundName")]
    fund_name: String,
    #[serde(rename = "amount", alias = "investedAmount")]
    invested: f64,
    #[serde(rename = "currentAmount", default)]
    current: f64,
    #[serde(alias = "periodYear")]
    year: i32,
    #[serde(alias = "periodMonth")]
    month: String,
}

impl TryFrom<RawEntry> for Entry {
    type Error = ValidationError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        Ok(Entry {
            fund_name: raw.fund_name,
            invested: check_amount(raw.invested)?,
            current: check_amount(raw.current)?,
            year: raw.year,
            month: raw.month.parse()?,
        })
    }
}

impl Entry {
    pub fn new(fund_name: &str, invested: f64, current: f64, year: i32, month: Month) -> Entry {
        Entry {
            fund_name: fund_name.to_string(),
            invested,
            current,
            year,
            month,
        }
    }

    pub fn get_fund_name(&self) -> &str {
        &self.fund_name
    }

    pub fn get_invested(&self) -> f64 {
        self.invested
    }

    pub fn get_current(&self) -> f64 {
        self.current
    }

    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }
}

/// Raw form input for a new entry. Every field is text exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub fund_name: String,
    pub invested: String,
    pub current: String,
    pub year: String,
    pub month: String,
}

impl EntryDraft {
    /// Checks presence of every field and turns the draft into an entry.
    pub fn validate(&self) -> Result<Entry, ValidationError> {
        let fund_name = self.fund_name.trim();
        if fund_name.is_empty() {
            return Err(ValidationError::FundNameRequired);
        }
        if self.invested.trim().is_empty() {
            return Err(ValidationError::InvestedRequired);
        }
        if self.current.trim().is_empty() {
            return Err(ValidationError::CurrentRequired);
        }
        if self.year.trim().is_empty() {
            return Err(ValidationError::YearRequired);
        }
        if self.month.trim().is_empty() {
            return Err(ValidationError::MonthRequired);
        }

        let invested = parse_amount(&self.invested)?;
        let current = parse_amount(&self.current)?;
        let year = self
            .year
            .trim()
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidYear(self.year.clone()))?;
        let month = self.month.parse::<Month>()?;

        Ok(Entry::new(fund_name, invested, current, year, month))
    }
}

fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    let value = input
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidAmount(input.to_string()))?;
    check_amount(value).map_err(|e| match e {
        ValidationError::NegativeAmount(_) => e,
        _ => ValidationError::InvalidAmount(input.to_string()),
    })
}

fn check_amount(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidAmount(value.to_string()));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeAmount(value));
    }
    Ok(value)
}

/// Decodes one stored record. A record that is not a valid entry is skipped
/// with a warning; both store backends share this policy.
pub fn from_record(record: &[u8]) -> Option<Entry> {
    match serde_json::from_slice::<Entry>(record) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Skipping stored entry: {e}");
            None
        }
    }
}

/// Parses a JSON array of records without interpreting them, so a rewrite can
/// carry records that do not decode as entries.
pub fn records_from_string(data: &str) -> Result<Vec<serde_json::Value>, serde_json::Error> {
    serde_json::from_str(data)
}

/// Parses a JSON array of entries. Records that are not valid entries are
/// dropped with a warning instead of failing the whole snapshot.
#[cfg(test)]
pub fn from_string(data: &str) -> Result<Vec<Entry>, serde_json::Error> {
    let records = records_from_string(data)?;
    Ok(from_records(records))
}

pub fn from_records(records: Vec<serde_json::Value>) -> Vec<Entry> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Entry>(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping stored entry: {e}");
                None
            }
        })
        .collect()
}

/// Serialises entries back into the data file format.
pub fn to_string(entries: &[Entry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        EntryDraft {
            fund_name: "Parag Parikh Flexi Cap".to_string(),
            invested: "5000".to_string(),
            current: "5120.50".to_string(),
            year: "2025".to_string(),
            month: "Mar".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_draft() {
        let entry = draft().validate().unwrap();
        assert_eq!(entry.get_fund_name(), "Parag Parikh Flexi Cap");
        assert_eq!(entry.get_invested(), 5000.0);
        assert_eq!(entry.get_current(), 5120.5);
        assert_eq!(entry.period(), Period::new(2025, Month::Mar));
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut d = draft();
        d.fund_name = "  ".to_string();
        assert_eq!(d.validate(), Err(ValidationError::FundNameRequired));

        let mut d = draft();
        d.current.clear();
        assert_eq!(d.validate(), Err(ValidationError::CurrentRequired));

        let mut d = draft();
        d.month.clear();
        assert_eq!(d.validate(), Err(ValidationError::MonthRequired));
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut d = draft();
        d.invested = "abc".to_string();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidAmount(_))));

        let mut d = draft();
        d.invested = "NaN".to_string();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidAmount(_))));

        let mut d = draft();
        d.current = "-10".to_string();
        assert_eq!(d.validate(), Err(ValidationError::NegativeAmount(-10.0)));

        let mut d = draft();
        d.month = "Smarch".to_string();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidMonth(_))));
    }

    #[test]
    fn test_from_string_reads_data_file_format() {
        let data = r#"[
            {"sipName": "A", "amount": 1000, "currentAmount": 1000, "year": 2025, "month": "Jan"},
            {"fundName": "B", "investedAmount": 500.5, "currentAmount": 510, "periodYear": 2025, "periodMonth": "Feb"},
            {"sipName": "C", "amount": 10, "currentAmount": 10, "year": 2025, "month": "Foo"}
        ]"#;
        let entries = from_string(data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].get_fund_name(), "B");
        assert_eq!(entries[1].get_invested(), 500.5);
        assert_eq!(entries[1].period(), Period::new(2025, Month::Feb));
    }

    #[test]
    fn test_from_string_skips_negative_and_mistyped_records() {
        let data = r#"[
            {"sipName": "A", "amount": -5, "currentAmount": 10, "year": 2025, "month": "Jan"},
            {"sipName": "B", "amount": "lots", "currentAmount": 10, "year": 2025, "month": "Jan"},
            {"sipName": "C", "amount": 5, "currentAmount": -1, "year": 2025, "month": "Jan"},
            {"sipName": "D", "amount": 5, "currentAmount": 6, "year": 2025, "month": "Jan"}
        ]"#;
        let entries = from_string(data).unwrap();
        assert_eq!(entries, vec![Entry::new("D", 5.0, 6.0, 2025, Month::Jan)]);
    }

    #[test]
    fn test_from_record_shares_the_skip_policy() {
        let good = br#"{"sipName": "A", "amount": 1, "currentAmount": 2, "year": 2025, "month": "Feb"}"#;
        let bad = br#"{"sipName": "A", "amount": 1, "currentAmount": 2, "year": 2025, "month": "February"}"#;
        assert_eq!(from_record(good), Some(Entry::new("A", 1.0, 2.0, 2025, Month::Feb)));
        assert_eq!(from_record(bad), None);
        assert_eq!(from_record(b"not json"), None);
    }

    #[test]
    fn test_from_string_rejects_malformed_json() {
        assert!(from_string("{not json").is_err());
    }

    #[test]
    fn test_export_then_import_is_identical() {
        let entries = vec![
            Entry::new("A", 1000.0, 1000.0, 2025, Month::Jan),
            Entry::new("B", 250.25, 300.0, 2026, Month::Nov),
        ];
        let json = to_string(&entries).unwrap();
        assert!(json.contains("\"sipName\": \"A\""));
        assert!(json.contains("\"month\": \"Nov\""));
        assert_eq!(from_string(&json).unwrap(), entries);
    }
}
