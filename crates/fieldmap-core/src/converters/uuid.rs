use uuid::Uuid;

use crate::converter::ValueConverter;
use crate::error::ConverterError;

/// Converter for [`Uuid`], using the hyphenated lowercase form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConverter;

impl ValueConverter for UuidConverter {
    type Target = Uuid;

    fn serialize(&self, value: &Uuid) -> Result<String, ConverterError> {
        Ok(value.hyphenated().to_string())
    }

    fn deserialize(&self, text: &str) -> Result<Uuid, ConverterError> {
        Uuid::parse_str(text).map_err(|e| ConverterError::malformed::<Uuid>(text, e))
    }

    fn name(&self) -> &'static str {
        "uuid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_roundtrip() {
        let conv = UuidConverter;
        for id in [Uuid::nil(), Uuid::max(), Uuid::new_v4()] {
            let text = conv.serialize(&id).unwrap();
            assert_eq!(conv.deserialize(&text).unwrap(), id);
        }
    }

    #[test]
    fn test_uuid_text_form() {
        let id = Uuid::parse_str("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(
            UuidConverter.serialize(&id).unwrap(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn test_uuid_rejects_garbage() {
        let err = UuidConverter.deserialize("not-a-uuid").unwrap_err();
        assert!(matches!(err, ConverterError::Malformed { .. }));
    }
}
