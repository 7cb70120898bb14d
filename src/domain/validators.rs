//! Field-level validation rules shared by signup, user management and the
//! catalog endpoints.

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::constants::{RESERVED_USERNAME, limits, messages, scores};

/// Field-keyed validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Key for errors that are not tied to a single field.
    pub const NON_FIELD: &'static str = "non_field_errors";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Records the error of `result`, if any, under `field`.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    /// Unwraps a required value, recording "This field is required." when
    /// it is missing.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, messages::REQUIRED);
        }
        value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

pub fn validate_username(username: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^[\w.@+-]+\z");

    if username.is_empty() {
        return Err(messages::BLANK.to_string());
    }

    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(format!(
            "Using \"{RESERVED_USERNAME}\" as a username is not allowed."
        ));
    }

    if username.chars().count() > limits::USERNAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            limits::USERNAME_MAX_LENGTH
        ));
    }

    if !re.is_match(username) {
        return Err(
            "Username may contain only letters, digits and the characters . @ + - _".to_string(),
        );
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$");

    if email.is_empty() {
        return Err(messages::BLANK.to_string());
    }

    if email.chars().count() > limits::EMAIL_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            limits::EMAIL_MAX_LENGTH
        ));
    }

    if !re.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }

    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^[-a-zA-Z0-9_]+$");

    if slug.is_empty() {
        return Err(messages::BLANK.to_string());
    }

    if slug.len() > limits::SLUG_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            limits::SLUG_MAX_LENGTH
        ));
    }

    if !re.is_match(slug) {
        return Err(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens."
                .to_string(),
        );
    }

    Ok(())
}

/// Non-blank text bounded by `max` characters (`None` means unbounded).
pub fn validate_text(value: &str, max: Option<usize>) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(messages::BLANK.to_string());
    }

    if let Some(max) = max
        && value.chars().count() > max
    {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }

    Ok(())
}

/// Optional free text such as a bio or first name: may be empty.
pub fn validate_optional_text(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), String> {
    validate_year_against(year, chrono::Utc::now().year())
}

fn validate_year_against(year: i32, current_year: i32) -> Result<(), String> {
    if year > current_year {
        return Err(format!(
            "Release year cannot be later than the current year ({current_year})."
        ));
    }
    Ok(())
}

pub fn validate_score(score: i32) -> Result<(), String> {
    if !(scores::MIN_SCORE..=scores::MAX_SCORE).contains(&score) {
        return Err(format!(
            "Score must be between {} and {}.",
            scores::MIN_SCORE,
            scores::MAX_SCORE
        ));
    }
    Ok(())
}
