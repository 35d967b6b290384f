//! Builtin converters for common non-primitive types.
//!
//! - [`UuidConverter`] - `uuid::Uuid`, hyphenated lowercase
//! - [`DateTimeConverter`] - `chrono::DateTime<Utc>`, RFC 3339
//! - [`DurationConverter`] - `std::time::Duration`, ISO 8601 `PT<secs>S`

mod datetime;
mod duration;
mod uuid;

pub use self::datetime::DateTimeConverter;
pub use self::duration::DurationConverter;
pub use self::uuid::UuidConverter;
