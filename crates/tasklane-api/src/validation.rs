//! Shared validation functions for the API layer.
//!
//! Field checks are empty-string checks only; values are not trimmed
//! before checking. Every violated field is reported, not just the first.

use tasklane_server::handlers::bulk::FieldViolation;

/// Validates a create payload.
pub fn validate_create(title: &str, description: &str) -> Vec<FieldViolation> {
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push(FieldViolation::new("title", "Title is required"));
    }
    if description.is_empty() {
        errors.push(FieldViolation::new("description", "Description is required"));
    }
    errors
}

/// Validates an update payload.
///
/// Both fields are optional but must be non-empty when present, and at
/// least one must be present.
pub fn validate_update(title: Option<&str>, description: Option<&str>) -> Vec<FieldViolation> {
    let mut errors = Vec::new();
    if title == Some("") {
        errors.push(FieldViolation::new("title", "Title is required"));
    }
    if description == Some("") {
        errors.push(FieldViolation::new("description", "Description is required"));
    }
    if title.is_none() && description.is_none() {
        errors.push(FieldViolation::new(
            "body",
            "At least one field (title or description) must be provided",
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_reports_every_violated_field() {
        assert!(validate_create("a", "b").is_empty());

        let errors = validate_create("", "");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "description"]);
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let errors = validate_update(None, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }

    #[test]
    fn update_rejects_empty_present_fields() {
        let errors = validate_update(Some(""), Some("fine"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");

        assert!(validate_update(None, Some("fine")).is_empty());
        assert!(validate_update(Some("fine"), None).is_empty());
    }
}
