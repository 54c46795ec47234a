//! Helpers shared by the wire-record conversions.

use chrono::{DateTime, Utc};

use crate::http::HttpError;

/// Parses an RFC 3339 timestamp from a wire record.
pub(crate) fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, HttpError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| HttpError::MalformedRecord(format!("{field} {raw:?}: {e}")))
}

/// Path of one resource in `collection`. The id is percent-encoded so it
/// always stays a single path segment.
pub(crate) fn resource_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_utc_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 4, 12, 0, 0).unwrap();
        assert_eq!(
            parse_timestamp("createdAt", "2021-03-04T12:00:00Z").unwrap(),
            expected
        );
        assert_eq!(
            parse_timestamp("createdAt", "2021-03-04T14:00:00+02:00").unwrap(),
            expected
        );
    }

    #[test]
    fn resource_path_encodes_the_id() {
        assert_eq!(resource_path("compute/jobs", "J1"), "compute/jobs/J1");
        assert_eq!(
            resource_path("/grants", "G1/../admin?x=1"),
            "/grants/G1%2F..%2Fadmin%3Fx%3D1"
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("createdAt", "yesterday").unwrap_err();
        assert!(err.to_string().contains("createdAt"));
    }
}
