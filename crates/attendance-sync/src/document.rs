//! Document identities, revision tokens, and the attendance record type.

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// A synced document: a JSON object of string keys to arbitrary values.
///
/// No schema is enforced beyond being an object.
pub type Document = Map<String, Value>;

/// Selects one of the two documents tracked in the remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Attendance,
    Schools,
}

impl DocumentId {
    /// Path of the document within the repository.
    pub fn path(self) -> &'static str {
        match self {
            DocumentId::Attendance => "attendance.json",
            DocumentId::Schools => "schools.json",
        }
    }
}

/// Opaque revision token returned by the contents API on read.
///
/// Clients receive a token when fetching a document and must supply it
/// when storing to prove they've seen the current version. Omitted when
/// creating a document that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionToken(String);

impl RevisionToken {
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-school attendance summary stored in the attendance document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub school_name: String,
    pub city: String,
    pub state: String,
    /// Formatted to two decimal places, rounded half away from zero.
    pub final_average_percentage: String,
}

impl AttendanceRecord {
    pub fn new(school_name: &str, city: &str, state: &str, percentage: f64) -> Self {
        Self {
            school_name: school_name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            final_average_percentage: format_percentage(percentage),
        }
    }

    /// Lookup key for this record within the attendance document.
    pub fn composite_key(&self) -> String {
        composite_key(&self.school_name, &self.city, &self.state)
    }

    /// JSON value stored under the composite key.
    pub fn to_value(&self) -> Value {
        json!({
            "schoolName": self.school_name,
            "city": self.city,
            "state": self.state,
            "finalAveragePercentage": self.final_average_percentage,
        })
    }
}

/// Unique lookup key for a school: `"{schoolName}-{city}-{state}"`.
pub fn composite_key(school_name: &str, city: &str, state: &str) -> String {
    format!("{}-{}-{}", school_name, city, state)
}

/// Format a percentage to two decimals, rounding half away from zero at
/// the second decimal place.
pub fn format_percentage(value: f64) -> String {
    let cents = (value * 100.0).round();
    format!("{:.2}", cents / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_paths() {
        assert_eq!(DocumentId::Attendance.path(), "attendance.json");
        assert_eq!(DocumentId::Schools.path(), "schools.json");
    }

    #[test]
    fn test_composite_key_format() {
        assert_eq!(
            composite_key("Lincoln High", "Springfield", "IL"),
            "Lincoln High-Springfield-IL"
        );
    }

    #[test]
    fn test_format_percentage_two_decimals() {
        assert_eq!(format_percentage(87.5), "87.50");
        assert_eq!(format_percentage(12.0), "12.00");
        assert_eq!(format_percentage(0.0), "0.00");
    }

    #[test]
    fn test_format_percentage_rounds_half_away_from_zero() {
        // Eighths are exact in binary, so these genuinely hit the halfway case.
        assert_eq!(format_percentage(87.125), "87.13");
        assert_eq!(format_percentage(87.375), "87.38");
    }

    #[test]
    fn test_format_percentage_carries_into_whole_part() {
        assert_eq!(format_percentage(99.999), "100.00");
    }

    #[test]
    fn test_record_value_uses_wire_field_names() {
        let record = AttendanceRecord::new("Lincoln High", "Springfield", "IL", 87.5);
        let value = record.to_value();
        assert_eq!(value["schoolName"], "Lincoln High");
        assert_eq!(value["city"], "Springfield");
        assert_eq!(value["state"], "IL");
        assert_eq!(value["finalAveragePercentage"], "87.50");
    }

    #[test]
    fn test_record_round_trips_through_value() {
        let record = AttendanceRecord::new("Lincoln High", "Springfield", "IL", 87.5);
        let parsed: AttendanceRecord = serde_json::from_value(record.to_value()).unwrap();
        assert_eq!(parsed, record);
    }
}
