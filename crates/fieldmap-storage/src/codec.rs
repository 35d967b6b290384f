//! Text codecs for documents.

use std::path::Path;

use anyhow::{Context, Result};
use fieldmap_core::Document;
use serde::{Deserialize, Serialize};

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format for a file extension (`json`, `yml`, `yaml`; case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Codec for this format.
    ///
    /// `pretty` only affects JSON; YAML is always written in block style.
    pub fn codec(self, pretty: bool) -> Box<dyn DocumentCodec> {
        match self {
            Self::Json => Box::new(JsonCodec { pretty }),
            Self::Yaml => Box::new(YamlCodec),
        }
    }
}

/// Converts a document to text and back.
///
/// Decoding blank input yields an empty document. A top level that is not a
/// mapping is an error.
pub trait DocumentCodec: Send + Sync {
    fn encode(&self, doc: &Document) -> Result<String>;

    fn decode(&self, text: &str) -> Result<Document>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    /// Indent nested values when encoding
    pub pretty: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonCodec {
    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl DocumentCodec for JsonCodec {
    fn encode(&self, doc: &Document) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(doc)
        } else {
            serde_json::to_string(doc)
        };
        text.context("Failed to encode document as JSON")
    }

    fn decode(&self, text: &str) -> Result<Document> {
        if text.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(text).context("Failed to parse JSON document")
    }
}

/// YAML codec backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn encode(&self, doc: &Document) -> Result<String> {
        serde_yaml::to_string(doc).context("Failed to encode document as YAML")
    }

    fn decode(&self, text: &str) -> Result<Document> {
        if text.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_yaml::from_str(text).context("Failed to parse YAML document")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_core::DocumentValue;

    fn sample() -> Document {
        let nested: Document = [("z", 1i64), ("a", 2i64)].into_iter().collect();
        [
            ("name", DocumentValue::from("Ada")),
            ("score", DocumentValue::from(4.5)),
            ("active", DocumentValue::from(true)),
            ("tags", DocumentValue::from(vec!["b", "a"])),
            ("links", DocumentValue::Mapping(nested)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("YML"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_extension("yaml"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_extension("toml"), None);
        assert_eq!(
            DocumentFormat::from_path(Path::new("conf/app.yaml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_json_keeps_key_order() {
        let codec = JsonCodec::compact();
        let text = codec.encode(&sample()).unwrap();
        assert_eq!(
            text,
            r#"{"name":"Ada","score":4.5,"active":true,"tags":["b","a"],"links":{"z":1,"a":2}}"#
        );
        assert_eq!(codec.decode(&text).unwrap(), sample());
    }

    #[test]
    fn test_json_pretty_by_default() {
        let text = JsonCodec::default().encode(&sample()).unwrap();
        assert!(text.contains("\n  \"name\": \"Ada\""));
        assert_eq!(JsonCodec::default().decode(&text).unwrap(), sample());
    }

    #[test]
    fn test_yaml_block_style_roundtrip() {
        let codec = YamlCodec;
        let text = codec.encode(&sample()).unwrap();
        assert!(text.starts_with("name: Ada\n"));
        assert!(text.contains("tags:\n- b\n- a\n"));
        assert_eq!(codec.decode(&text).unwrap(), sample());
    }

    #[test]
    fn test_blank_input_is_empty_document() {
        assert!(JsonCodec::default().decode("").unwrap().is_empty());
        assert!(YamlCodec.decode("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_non_mapping_top_level_is_error() {
        assert!(JsonCodec::default().decode("[1, 2]").is_err());
        assert!(YamlCodec.decode("- 1\n- 2\n").is_err());
    }
}
