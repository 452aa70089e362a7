//! Field-path and value checks shared by the admission validators

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, ValidationError};
use crate::string_enum::StringEnum;

/// Load balancer names: lowercase alphanumeric with inner hyphens
pub(crate) const LOAD_BALANCER_NAME_REGEX: &str = r"^([a-z]|[a-z][-a-z0-9]*[a-z0-9])$";

/// COS instance names: 3-63 lowercase alphanumeric, dots and hyphens
pub(crate) const COS_INSTANCE_NAME_REGEX: &str = r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$";

pub(crate) static LOAD_BALANCER_NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(LOAD_BALANCER_NAME_REGEX).ok());

pub(crate) static COS_INSTANCE_NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(COS_INSTANCE_NAME_REGEX).ok());

pub(crate) fn child(path: &str, field: &str) -> String {
    format!("{path}.{field}")
}

pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Optional strings may be absent, but never present and empty
pub(crate) fn optional_non_empty(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Ok(()),
    }
}

pub(crate) fn require_range(field: &str, value: i64, min: i64, max: i64) -> Result<i64> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

pub(crate) fn unsupported<E: StringEnum>(field: &str, value: &E) -> ValidationError {
    ValidationError::UnsupportedValue {
        field: field.to_string(),
        value: value.as_str().to_string(),
        expected: E::KNOWN.join(", "),
    }
}

pub(crate) fn require_known<E: StringEnum>(field: &str, value: &E) -> Result<()> {
    if value.is_known() {
        return Ok(());
    }
    Err(unsupported(field, value))
}

pub(crate) fn require_pattern(
    field: &str,
    value: &str,
    pattern: &LazyLock<Option<Regex>>,
    source: &str,
    max_len: usize,
) -> Result<()> {
    if value.len() > max_len {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            message: format!("must be at most {max_len} characters, got {}", value.len()),
        });
    }

    let Some(regex) = pattern.as_ref() else {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            message: "pattern validation unavailable".to_string(),
        });
    };

    if !regex.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            message: format!("{value:?} must match {source}"),
        });
    }
    Ok(())
}

/// Reports the first value that appears twice
pub(crate) fn require_unique<'a, I>(field: impl Fn(usize) -> String, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    for (i, value) in values.into_iter().enumerate() {
        if !seen.insert(value) {
            return Err(ValidationError::DuplicateEntry {
                field: field(i),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
