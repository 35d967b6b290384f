use std::time::Duration;

use crate::converter::ValueConverter;
use crate::error::ConverterError;

/// Converter for [`std::time::Duration`] using the ISO 8601 seconds form.
///
/// Whole seconds are written as `PT181S`; sub-second precision as
/// `PT60.123456789S` (always nine fractional digits).
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl ValueConverter for DurationConverter {
    type Target = Duration;

    fn serialize(&self, value: &Duration) -> Result<String, ConverterError> {
        if value.subsec_nanos() == 0 {
            Ok(format!("PT{}S", value.as_secs()))
        } else {
            Ok(format!("PT{}.{:09}S", value.as_secs(), value.subsec_nanos()))
        }
    }

    fn deserialize(&self, text: &str) -> Result<Duration, ConverterError> {
        parse_iso8601_seconds(text)
            .ok_or_else(|| ConverterError::malformed::<Duration>(text, "expected PT<secs>[.<frac>]S"))
    }

    fn name(&self) -> &'static str {
        "duration"
    }
}

/// Parse `PTxS` or `PTx.yS` with up to nine fractional digits.
fn parse_iso8601_seconds(s: &str) -> Option<Duration> {
    let secs_str = s.trim().strip_prefix("PT")?.strip_suffix('S')?;
    let (whole, frac) = match secs_str.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (secs_str, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: u64 = whole.parse().ok()?;

    let nanos = match frac {
        None => 0,
        Some(frac) => {
            if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // "5" means 500_000_000 nanoseconds, not 5.
            let padded = format!("{frac:0<9}");
            padded.parse::<u32>().ok()?
        }
    };

    Some(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_roundtrip() {
        let conv = DurationConverter;
        for d in [
            Duration::ZERO,
            Duration::from_secs(181),
            Duration::new(60, 123_456_789),
            Duration::new(1, 5),
            Duration::from_millis(1500),
        ] {
            let text = conv.serialize(&d).unwrap();
            assert_eq!(conv.deserialize(&text).unwrap(), d, "text was {text}");
        }
    }

    #[test]
    fn test_duration_text_forms() {
        let conv = DurationConverter;
        assert_eq!(conv.serialize(&Duration::from_secs(181)).unwrap(), "PT181S");
        assert_eq!(
            conv.serialize(&Duration::from_millis(1500)).unwrap(),
            "PT1.500000000S"
        );
    }

    #[test]
    fn test_duration_short_fraction_is_scaled() {
        assert_eq!(
            DurationConverter.deserialize("PT60.5S").unwrap(),
            Duration::from_millis(60_500)
        );
    }

    #[test]
    fn test_duration_rejects_malformed() {
        let conv = DurationConverter;
        for bad in ["", "PT", "PTS", "P1D", "PT-1S", "PT1.S", "PT1.1234567890S", "60"] {
            assert!(conv.deserialize(bad).is_err(), "accepted {bad:?}");
        }
    }
}
