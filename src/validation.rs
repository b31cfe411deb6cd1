use crate::errors::{DomainError, DomainResult, ValidationError};
use regex::Regex;
use std::sync::OnceLock;

/// A trait that request DTOs implement for validation before a manager is called.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

pub fn uuid_regex() -> &'static Regex {
    static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
    UUID_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
    })
}

pub fn sha256_hash_regex() -> &'static Regex {
    static HASH_REGEX: OnceLock<Regex> = OnceLock::new();
    HASH_REGEX.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{64}$").unwrap())
}

/// Fluent validation helper, mirroring the style used across managers: build
/// up a list of field errors, then collapse to the first one.
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self { field_name: field_name.to_string(), value, errors: Vec::new() }
    }

    pub fn required(mut self) -> Self {
        if self.value.is_none() {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn validate(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.errors[0].clone()))
        }
    }
}

impl ValidationBuilder<String> {
    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn not_empty(mut self) -> Self {
        if let Some(value) = &self.value {
            if value.trim().is_empty() {
                self.errors.push(ValidationError::required(&self.field_name));
            }
        }
        self
    }

    pub fn one_of(mut self, allowed: &[&str]) -> Self {
        if let Some(value) = &self.value {
            if !allowed.contains(&value.as_str()) {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    &format!("must be one of: {}", allowed.join(", ")),
                ));
            }
        }
        self
    }
}

/// Strips path separators, control characters and caps length, while
/// preserving the extension. Used on every attachment's original filename
/// before it is stored (spec.md §4.7).
pub fn sanitize_filename(original: &str) -> String {
    let basename = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = basename
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    let cleaned = cleaned.trim();
    let cleaned = if cleaned.is_empty() { "file" } else { cleaned };

    if cleaned.chars().count() <= 255 {
        return cleaned.to_string();
    }

    // Preserve the extension when truncating an overlong name.
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.len() < 32 => {
            let keep = 255 - ext.len() - 1;
            let truncated_stem: String = stem.chars().take(keep).collect();
            format!("{}.{}", truncated_stem, ext)
        }
        _ => cleaned.chars().take(255).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_regex_matches_canonical_form() {
        assert!(uuid_regex().is_match("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!uuid_regex().is_match("not-a-uuid"));
        assert!(!uuid_regex().is_match("550e8400e29b41d4a716446655440000"));
    }

    #[test]
    fn hash_regex_matches_sha256_hex() {
        let hash = "a".repeat(64);
        assert!(sha256_hash_regex().is_match(&hash));
        assert!(!sha256_hash_regex().is_match(&"a".repeat(63)));
    }

    #[test]
    fn validation_builder_collects_required_error() {
        let value: Option<String> = None;
        let result = ValidationBuilder::new("name", value).required().validate();
        assert!(result.is_err());
    }

    #[test]
    fn validation_builder_checks_length_bounds() {
        let result = ValidationBuilder::new("name", Some("x".repeat(33)))
            .max_length(32)
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("name", Some("ok".to_string()))
            .max_length(32)
            .validate();
        assert!(result.is_ok());
    }

    #[test]
    fn sanitize_filename_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\a\\report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_filename_strips_control_characters() {
        assert_eq!(sanitize_filename("evil\0name.txt"), "evilname.txt");
    }

    #[test]
    fn sanitize_filename_truncates_long_names_preserving_extension() {
        let long_name = format!("{}.png", "a".repeat(300));
        let sanitized = sanitize_filename(&long_name);
        assert!(sanitized.chars().count() <= 255);
        assert!(sanitized.ends_with(".png"));
    }
}
