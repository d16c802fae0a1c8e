//! Form input validation built from field definitions
//!
//! `FormValidator::build` compiles each field's rules once; `validate` then
//! checks a submission and reports every failing rule per field.

use crate::dates::{parse_date, parse_time};
use crate::field::FieldDefinition;
use indexmap::IndexMap;
use regex::Regex;
use schemadash_core::{DashError, DashResult, ErrorContext, ErrorReporter, FieldType, Rule};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Submitted form values keyed by field name
pub type FormInput = Map<String, Value>;

/// Errors keyed by field name, in field order
pub type FieldErrors = IndexMap<String, Vec<String>>;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub const MSG_INVALID_FORM: &str = "Please correct the errors below.";
pub const MSG_SUBMITTED: &str = "Form submitted successfully!";
pub const MSG_SUBMIT_FAILED: &str = "An error occurred while processing your form.";

// ============================================================================
// Compiled rules
// ============================================================================

#[derive(Debug, Clone)]
enum Check {
    MinLength(f64),
    MaxLength(f64),
    MinValue(f64),
    MaxValue(f64),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    check: Check,
    message: String,
}

#[derive(Debug, Clone)]
struct FieldValidator {
    name: String,
    label: String,
    field_type: FieldType,
    required: bool,
    options: Vec<String>,
    rules: Vec<CompiledRule>,
}

impl FieldValidator {
    fn compile(field: &FieldDefinition) -> (Self, Vec<DashError>) {
        let label = field.display_label();
        let numeric = field.field_type == FieldType::Number;
        let mut rules = Vec::new();
        let mut errors = Vec::new();

        for rule in &field.validations {
            let message = rule.message(&label, numeric);
            let check = match (rule, numeric) {
                (Rule::Min { value, .. }, false) if field.field_type.is_textual() => {
                    Check::MinLength(*value)
                }
                (Rule::Max { value, .. }, false) if field.field_type.is_textual() => {
                    Check::MaxLength(*value)
                }
                (Rule::Min { value, .. }, true) => Check::MinValue(*value),
                (Rule::Max { value, .. }, true) => Check::MaxValue(*value),
                (Rule::Pattern { regex, .. }, false) if field.field_type.is_textual() => {
                    match Regex::new(regex) {
                        Ok(re) => Check::Pattern(re),
                        Err(e) => {
                            errors.push(DashError::InvalidPattern {
                                field: field.name.clone(),
                                pattern: regex.clone(),
                                message: e.to_string(),
                            });
                            continue;
                        }
                    }
                }
                (rule, _) => {
                    tracing::debug!(
                        field = %field.name,
                        %rule,
                        field_type = %field.field_type,
                        "Rule does not apply to field type"
                    );
                    continue;
                }
            };
            rules.push(CompiledRule { check, message });
        }

        let validator = Self {
            name: field.name.clone(),
            label,
            field_type: field.field_type,
            required: field.required,
            options: field.options.clone(),
            rules,
        };
        (validator, errors)
    }

    /// Validate one raw value, returning the coerced value and the error list
    fn check(&self, raw: Option<&Value>) -> (Option<Value>, Vec<String>) {
        let Some(text) = raw.and_then(value_text) else {
            if self.required {
                return (None, vec![format!("{} is required", self.label)]);
            }
            return (None, Vec::new());
        };

        let mut errors = Vec::new();

        let coerced = match self.field_type {
            FieldType::Number => match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    for rule in &self.rules {
                        let failed = match &rule.check {
                            Check::MinValue(min) => n < *min,
                            Check::MaxValue(max) => n > *max,
                            _ => false,
                        };
                        if failed {
                            errors.push(rule.message.clone());
                        }
                    }
                    serde_json::Number::from_f64(n).map(Value::Number)
                }
                _ => return (None, vec![format!("{} must be a number", self.label)]),
            },
            FieldType::Boolean => match text.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Some(Value::Bool(true)),
                "false" | "off" | "no" | "0" => Some(Value::Bool(false)),
                _ => return (None, vec![format!("{} must be true or false", self.label)]),
            },
            ty => {
                match ty {
                    FieldType::Email if !EMAIL.is_match(&text) => {
                        errors.push("Please enter a valid email address".to_string());
                    }
                    FieldType::Date | FieldType::DateTime if parse_date(&text).is_none() => {
                        errors.push("Please enter a valid date".to_string());
                    }
                    FieldType::Time if parse_time(&text).is_none() => {
                        errors.push("Please enter a valid time".to_string());
                    }
                    _ => {}
                }

                let length = text.chars().count() as f64;
                for rule in &self.rules {
                    let failed = match &rule.check {
                        Check::MinLength(min) => length < *min,
                        Check::MaxLength(max) => length > *max,
                        Check::Pattern(re) => !re.is_match(&text),
                        _ => false,
                    };
                    if failed {
                        errors.push(rule.message.clone());
                    }
                }
                Some(Value::String(text.clone()))
            }
        };

        if !self.options.is_empty() && !self.options.iter().any(|o| *o == text) {
            errors.push(format!(
                "{} must be one of: {}",
                self.label,
                self.options.join(", ")
            ));
        }

        (coerced, errors)
    }
}

/// Text of a raw value; `None` when the value counts as empty
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// ============================================================================
// FormValidator
// ============================================================================

/// Outcome of validating one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors_by_field: FieldErrors,
    /// Coerced values of the non-empty fields
    pub data: FormInput,
}

impl ValidationOutcome {
    /// Errors of one field, empty when it passed
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors_by_field
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of error messages
    pub fn error_count(&self) -> usize {
        self.errors_by_field.values().map(Vec::len).sum()
    }
}

/// Validator for one form's fields
#[derive(Debug, Clone)]
pub struct FormValidator {
    fields: Vec<FieldValidator>,
}

impl FormValidator {
    /// Build a validator, reporting patterns that fail to compile and
    /// skipping their rules
    pub fn build(fields: &[FieldDefinition], reporter: &dyn ErrorReporter) -> Self {
        let (validator, errors) = Self::compile(fields);
        for error in &errors {
            reporter.report(
                error,
                &ErrorContext::new(
                    "form validation setup",
                    "A validation rule could not be compiled and was skipped.",
                ),
            );
        }
        validator
    }

    /// Build a validator, failing on the first pattern that does not compile
    pub fn try_build(fields: &[FieldDefinition]) -> DashResult<Self> {
        let (validator, errors) = Self::compile(fields);
        match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(validator),
        }
    }

    fn compile(fields: &[FieldDefinition]) -> (Self, Vec<DashError>) {
        let mut compiled = Vec::with_capacity(fields.len());
        let mut errors = Vec::new();
        for field in fields {
            let (validator, field_errors) = FieldValidator::compile(field);
            compiled.push(validator);
            errors.extend(field_errors);
        }
        (Self { fields: compiled }, errors)
    }

    /// Number of fields checked
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a submission. Values of unknown fields are ignored.
    pub fn validate(&self, input: &FormInput) -> ValidationOutcome {
        let mut errors_by_field = FieldErrors::new();
        let mut data = FormInput::new();

        for field in &self.fields {
            let (value, errors) = field.check(input.get(&field.name));
            if !errors.is_empty() {
                errors_by_field.insert(field.name.clone(), errors);
            } else if let Some(value) = value {
                data.insert(field.name.clone(), value);
            }
        }

        let valid = errors_by_field.is_empty();
        if !valid {
            tracing::debug!(
                invalid_fields = errors_by_field.len(),
                "Form submission failed validation"
            );
        }

        ValidationOutcome {
            valid,
            errors_by_field,
            data,
        }
    }
}

// ============================================================================
// FormValidationState
// ============================================================================

/// State shown to the user after one submission attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationState {
    pub errors_by_field: FieldErrors,
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FormInput>,
}

impl FormValidationState {
    /// Submission blocked by field errors
    pub fn invalid(errors_by_field: FieldErrors) -> Self {
        Self {
            errors_by_field,
            message: MSG_INVALID_FORM.to_string(),
            success: false,
            data: None,
        }
    }

    /// Submission stored
    pub fn submitted(data: FormInput) -> Self {
        Self {
            errors_by_field: FieldErrors::new(),
            message: MSG_SUBMITTED.to_string(),
            success: true,
            data: Some(data),
        }
    }

    /// Submission was valid but could not be stored
    pub fn failed() -> Self {
        Self {
            errors_by_field: FieldErrors::new(),
            message: MSG_SUBMIT_FAILED.to_string(),
            success: false,
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
