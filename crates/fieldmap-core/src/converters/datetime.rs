use chrono::{DateTime, SecondsFormat, Utc};

use crate::converter::ValueConverter;
use crate::error::ConverterError;

/// Converter for `DateTime<Utc>`.
///
/// Writes RFC 3339 with nanosecond precision and a `Z` suffix; accepts any
/// RFC 3339 offset on input and normalises it to UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl ValueConverter for DateTimeConverter {
    type Target = DateTime<Utc>;

    fn serialize(&self, value: &DateTime<Utc>) -> Result<String, ConverterError> {
        Ok(value.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    fn deserialize(&self, text: &str) -> Result<DateTime<Utc>, ConverterError> {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ConverterError::malformed::<DateTime<Utc>>(text, e))
    }

    fn name(&self) -> &'static str {
        "datetime"
    }
}
