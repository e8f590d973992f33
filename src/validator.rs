// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission validator.
//!
//! The form is described by a small declarative schema. Validation walks
//! the schema in declaration order and collects every violation rather
//! than stopping at the first one:
//! - `name`: required, at least 2 characters
//! - `email`: required, email address syntax
//! - `company`: optional, unconstrained
//! - `message`: required, at least 10 characters
//! - `_hp`: optional honeypot, inspected only by the spam filter

use email_address::{EmailAddress, Options};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// JSON field carrying the honeypot value.
pub const HONEYPOT_FIELD: &str = "_hp";

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub honeypot: Option<String>,
}

/// Constraint a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Required field absent
    Required,
    /// Field present with the wrong JSON type
    InvalidType { received: &'static str },
    /// Fewer characters than allowed
    TooShort { min: usize },
    /// Not a syntactically valid value
    InvalidFormat,
}

/// One violated constraint, tagged with its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip)]
    pub violation: Violation,
}

impl FieldError {
    pub fn new(field: &str, violation: Violation) -> Self {
        Self {
            field: field.to_string(),
            message: describe(field, violation),
            violation,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Human-readable message for a violation.
fn describe(field: &str, violation: Violation) -> String {
    match violation {
        Violation::Required => "Required".to_string(),
        Violation::InvalidType { received } if field.is_empty() => {
            format!("Expected object, received {received}")
        }
        Violation::InvalidType { received } => format!("Expected string, received {received}"),
        Violation::TooShort { min } => {
            format!("{} must be at least {min} characters", capitalize(field))
        }
        Violation::InvalidFormat if field == "email" => "Invalid email address".to_string(),
        Violation::InvalidFormat => format!("Invalid {field}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Per-field rule.
#[derive(Debug, Clone, Copy)]
enum Rule {
    None,
    MinChars(usize),
    Email,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    required: bool,
    rule: Rule,
}

const SCHEMA: &[FieldSpec] = &[
    FieldSpec { name: "name", required: true, rule: Rule::MinChars(2) },
    FieldSpec { name: "email", required: true, rule: Rule::Email },
    FieldSpec { name: "company", required: false, rule: Rule::None },
    FieldSpec { name: "message", required: true, rule: Rule::MinChars(10) },
    FieldSpec { name: HONEYPOT_FIELD, required: false, rule: Rule::None },
];

/// Contact form validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactValidator;

impl ContactValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate an arbitrary JSON value into a [`Submission`].
    ///
    /// Returns every violation in field declaration order. Unknown fields
    /// are ignored.
    pub fn validate(&self, input: &Value) -> Result<Submission, Vec<FieldError>> {
        let object = match input {
            Value::Object(map) => map,
            other => {
                debug!(received = json_kind(other), "Submission is not an object");
                return Err(vec![FieldError::new(
                    "",
                    Violation::InvalidType { received: json_kind(other) },
                )]);
            }
        };

        let mut errors = Vec::new();
        let mut values: [Option<String>; 5] = Default::default();

        for (slot, field) in values.iter_mut().zip(SCHEMA) {
            match check_field(object, field) {
                Ok(value) => *slot = value,
                Err(violation) => errors.push(FieldError::new(field.name, violation)),
            }
        }

        if !errors.is_empty() {
            debug!(count = errors.len(), "Submission failed validation");
            return Err(errors);
        }

        let [name, email, company, message, honeypot] = values;
        Ok(Submission {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            company,
            message: message.unwrap_or_default(),
            honeypot,
        })
    }
}

fn check_field(object: &Map<String, Value>, spec: &FieldSpec) -> Result<Option<String>, Violation> {
    let value = match object.get(spec.name) {
        None => None,
        Some(Value::Null) if !spec.required => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            return Err(Violation::InvalidType { received: json_kind(other) });
        }
    };

    let Some(value) = value else {
        return if spec.required { Err(Violation::Required) } else { Ok(None) };
    };

    match spec.rule {
        Rule::None => {}
        Rule::MinChars(min) => {
            if value.chars().count() < min {
                return Err(Violation::TooShort { min });
            }
        }
        Rule::Email => {
            if !is_plain_address(value) {
                return Err(Violation::InvalidFormat);
            }
        }
    }

    Ok(Some(value.clone()))
}

/// A bare `local@domain.tld` address, safe to reuse as a `Reply-To` header.
///
/// Display text, domain literals, single-label domains and quoted local
/// parts are all RFC 5322 valid but rejected here.
fn is_plain_address(value: &str) -> bool {
    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();

    let Ok(address) = EmailAddress::parse_with_options(value, options) else {
        return false;
    };
    address
        .local_part()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._'+-".contains(c))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
