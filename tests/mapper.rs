use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use fieldmap::{
    ConvertError, ConverterError, DocumentValue, FieldAccess, FieldDescriptor, FromValue,
    MappingKind, Mappable, Mapper, Schema, SequenceKind, SkipReason, StorageConfig, TypeShape,
    Value, ValueConverter,
};
use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Semantic version, stored as `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

struct VersionConverter;

impl ValueConverter for VersionConverter {
    type Target = Version;

    fn serialize(&self, v: &Version) -> Result<String, ConverterError> {
        Ok(format!("{}.{}.{}", v.major, v.minor, v.patch))
    }

    fn deserialize(&self, text: &str) -> Result<Version, ConverterError> {
        let parts: Vec<u32> = text
            .split('.')
            .map(|p| p.parse())
            .collect::<Result<_, _>>()
            .map_err(|e| ConverterError::malformed::<Version>(text, e))?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(Version {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(ConverterError::malformed::<Version>(text, "expected 3 parts")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Handle(String);

#[derive(Debug, Clone, PartialEq)]
struct Release {
    name: String,
    version: Version,
    build: Uuid,
    published: DateTime<Utc>,
    timeout: Duration,
    downloads: u64,
    stable: bool,
    notes: Option<String>,
    artifacts: Vec<Uuid>,
    mirrors: HashMap<String, Uuid>,
    maintainer: Handle,
}

impl Release {
    fn sample() -> Self {
        Self {
            name: "fieldmap".to_string(),
            version: Version {
                major: 1,
                minor: 4,
                patch: 2,
            },
            build: Uuid::new_v4(),
            published: Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap(),
            timeout: Duration::from_millis(2500),
            downloads: 1_000_000,
            stable: true,
            notes: Some("first stable".to_string()),
            artifacts: vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            mirrors: HashMap::from([
                ("eu".to_string(), Uuid::new_v4()),
                ("us".to_string(), Uuid::new_v4()),
            ]),
            maintainer: Handle("@ada".to_string()),
        }
    }

    fn empty() -> Self {
        Self {
            name: String::new(),
            version: Version {
                major: 0,
                minor: 0,
                patch: 0,
            },
            build: Uuid::nil(),
            published: Utc.timestamp_opt(0, 0).unwrap(),
            timeout: Duration::ZERO,
            downloads: 0,
            stable: false,
            notes: None,
            artifacts: Vec::new(),
            mirrors: HashMap::new(),
            maintainer: Handle(String::new()),
        }
    }
}

fn rejected(field: &str) -> ConvertError {
    ConvertError::field_access(field, "unexpected value type")
}

impl FieldAccess for Release {
    fn get(&self, field: &str) -> Option<Value> {
        let value = match field {
            "name" => self.name.clone().into(),
            "version" => Value::object(self.version),
            "build" => Value::object(self.build),
            "published" => Value::object(self.published),
            "timeout" => Value::object(self.timeout),
            "downloads" => self.downloads.into(),
            "stable" => self.stable.into(),
            "notes" => self.notes.clone().into(),
            "artifacts" => Value::object_sequence(SequenceKind::Vec, self.artifacts.iter().copied()),
            "mirrors" => Value::mapping(
                MappingKind::HashMap,
                self.mirrors.iter().map(|(k, v)| (k.clone(), Value::object(*v))),
            ),
            "maintainer" => Value::object(self.maintainer.clone()),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
        match field {
            "name" => self.name = String::from_value(value).ok_or_else(|| rejected(field))?,
            "version" => self.version = value.into_object().map_err(|_| rejected(field))?,
            "build" => self.build = value.into_object().map_err(|_| rejected(field))?,
            "published" => self.published = value.into_object().map_err(|_| rejected(field))?,
            "timeout" => self.timeout = value.into_object().map_err(|_| rejected(field))?,
            "downloads" => self.downloads = u64::from_value(value).ok_or_else(|| rejected(field))?,
            "stable" => self.stable = bool::from_value(value).ok_or_else(|| rejected(field))?,
            "notes" => {
                self.notes = Option::<String>::from_value(value).ok_or_else(|| rejected(field))?
            }
            "artifacts" => {
                self.artifacts = value
                    .collect_sequence(|v| v.into_object::<Uuid>().ok())
                    .ok_or_else(|| rejected(field))?
            }
            "mirrors" => {
                self.mirrors = value
                    .collect_mapping(String::from_value, |v| v.into_object::<Uuid>().ok())
                    .ok_or_else(|| rejected(field))?
            }
            "maintainer" => self.maintainer = value.into_object().map_err(|_| rejected(field))?,
            _ => return Err(ConvertError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl Mappable for Release {
    fn schema() -> Schema {
        Schema::default()
            .field(FieldDescriptor::new("name", TypeShape::scalar::<String>()))
            .field(FieldDescriptor::new("version", TypeShape::scalar::<Version>()))
            .field(FieldDescriptor::new("build", TypeShape::scalar::<Uuid>()).with_key("build_id"))
            .field(FieldDescriptor::new("published", TypeShape::scalar::<DateTime<Utc>>()))
            .field(FieldDescriptor::new("timeout", TypeShape::scalar::<Duration>()))
            .field(FieldDescriptor::new("downloads", TypeShape::scalar::<u64>()))
            .field(FieldDescriptor::new("stable", TypeShape::scalar::<bool>()))
            .field(FieldDescriptor::new("notes", TypeShape::scalar::<String>()))
            .field(FieldDescriptor::new("artifacts", TypeShape::sequence::<Uuid>()))
            .field(FieldDescriptor::new("mirrors", TypeShape::mapping::<String, Uuid>()))
            .field(FieldDescriptor::new("maintainer", TypeShape::scalar::<Handle>()))
    }
}

fn mapper(config: StorageConfig) -> Mapper {
    let mut mapper = Mapper::new(config);
    assert!(mapper.registry_mut().register(VersionConverter));
    mapper
}

#[test]
fn test_json_file_roundtrip() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("release.json");
    let mapper = mapper(StorageConfig::json());
    let release = Release::sample();

    mapper.save_file(&path, &release).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let name_at = text.find("\"name\"").unwrap();
    let version_at = text.find("\"version\": \"1.4.2\"").unwrap();
    let mirrors_at = text.find("\"mirrors\"").unwrap();
    assert!(name_at < version_at && version_at < mirrors_at);
    assert!(!text.contains("maintainer"));

    let mut loaded = Release::empty();
    let report = mapper.load_file(&path, &mut loaded).unwrap();

    assert_eq!(
        loaded,
        Release {
            maintainer: Handle(String::new()),
            ..release
        }
    );
    assert_eq!(report.skip_reason("maintainer"), Some(SkipReason::Missing));
}

#[test]
fn test_yaml_file_roundtrip() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("release.yaml");
    let mapper = mapper(StorageConfig::yaml());
    let release = Release::sample();

    mapper.save_file(&path, &release).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("name: fieldmap\n"));
    assert!(text.contains("timeout: PT2.500000000S\n"));
    assert!(text.contains(&format!("build_id: {}\n", release.build)));

    let mut loaded = Release::empty();
    mapper.load_file(&path, &mut loaded).unwrap();
    assert_eq!(loaded.version, release.version);
    assert_eq!(loaded.timeout, release.timeout);
    assert_eq!(loaded.artifacts, release.artifacts);
    assert_eq!(loaded.mirrors, release.mirrors);
    assert_eq!(loaded.notes, release.notes);
}

#[test]
fn test_largest_download_count_survives_both_formats() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let release = Release {
        downloads: u64::MAX,
        ..Release::sample()
    };

    for (name, config) in [("big.json", StorageConfig::json()), ("big.yaml", StorageConfig::yaml())] {
        let path = dir.path().join(name);
        let mapper = mapper(config);
        mapper.save_file(&path, &release).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(&u64::MAX.to_string()));

        let mut loaded = Release::empty();
        let report = mapper.load_file(&path, &mut loaded).unwrap();
        assert!(report.is_applied("downloads"));
        assert_eq!(loaded.downloads, u64::MAX);
    }
}

#[test]
fn test_load_missing_file_creates_it_and_keeps_values() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("release.json");
    let mapper = mapper(StorageConfig::default());

    let mut release = Release::sample();
    let before = release.clone();
    let report = mapper.load_file(&path, &mut release).unwrap();

    assert!(path.exists());
    assert_eq!(release, before);
    assert_eq!(report.applied().count(), 0);
}

#[test]
fn test_hand_edited_file_is_parsed_leniently() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("release.yml");
    std::fs::write(
        &path,
        "downloads: \"250\"\nstable: \"TRUE\"\nname: 42\nnotes: ~\nversion: 2.0.1\n",
    )
    .unwrap();

    let mapper = mapper(StorageConfig::default());
    let mut release = Release::sample();
    let report = mapper.load_file(&path, &mut release).unwrap();

    assert_eq!(release.downloads, 250);
    assert!(release.stable);
    assert_eq!(release.name, "42");
    assert_eq!(release.notes.as_deref(), Some("first stable"));
    assert_eq!(
        release.version,
        Version {
            major: 2,
            minor: 0,
            patch: 1
        }
    );
    assert_eq!(report.skip_reason("notes"), Some(SkipReason::Missing));
}

#[test]
fn test_custom_converter_failure_is_reported() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("release.json");
    std::fs::write(&path, r#"{"name": "renamed", "version": "one.two"}"#).unwrap();

    let mapper = mapper(StorageConfig::default());
    let mut release = Release::sample();
    let err = mapper.load_file(&path, &mut release).unwrap_err();

    let convert = err.downcast_ref::<ConvertError>().unwrap();
    assert!(matches!(convert, ConvertError::Converter { field, .. } if field == "version"));
    assert_eq!(release.name, "renamed");
}

#[test]
fn test_without_custom_converter_field_is_omitted() {
    init_logging();
    let mapper = Mapper::default();
    let doc = mapper.to_document(&Release::sample()).unwrap();

    assert!(!doc.contains_key("version"));
    assert_eq!(doc.get("downloads"), Some(&DocumentValue::from(1_000_000i64)));
    assert_eq!(
        doc.get("published"),
        Some(&DocumentValue::from("2026-03-14T15:09:26.000000000Z"))
    );
}
