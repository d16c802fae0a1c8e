//! Core types used throughout SchemaDash
//!
//! This module contains the closed sets of kinds that tables and forms are
//! rendered from, plus the validation rule model attached to form fields.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// UI Kinds
// ============================================================================

/// Renderable column categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UiKind {
    /// Plain text cell
    #[default]
    Text,
    /// Numeric cell
    Number,
    /// Yes/No cell
    Boolean,
    /// Calendar date cell
    Date,
    /// JSON document cell
    Json,
    /// Enum value rendered as a badge
    Badge,
    /// Foreign key reference
    Relation,
    /// Value combined from several source fields
    Computed,
    /// Row actions menu
    Actions,
    /// Row selection checkbox
    Checkbox,
}

impl UiKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            UiKind::Text => "Text",
            UiKind::Number => "Number",
            UiKind::Boolean => "Boolean",
            UiKind::Date => "Date",
            UiKind::Json => "JSON",
            UiKind::Badge => "Badge",
            UiKind::Relation => "Relation",
            UiKind::Computed => "Computed",
            UiKind::Actions => "Actions",
            UiKind::Checkbox => "Checkbox",
        }
    }

    /// Whether this kind only exists as a synthesized column
    pub fn is_synthetic(&self) -> bool {
        matches!(self, UiKind::Actions | UiKind::Checkbox)
    }

    /// Get all kinds
    pub fn all() -> &'static [UiKind] {
        &[
            UiKind::Text,
            UiKind::Number,
            UiKind::Boolean,
            UiKind::Date,
            UiKind::Json,
            UiKind::Badge,
            UiKind::Relation,
            UiKind::Computed,
            UiKind::Actions,
            UiKind::Checkbox,
        ]
    }
}

impl std::fmt::Display for UiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Field Types
// ============================================================================

/// Semantic type of a form field.
///
/// Parsing is lossy: unknown names become [`FieldType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Password,
    Number,
    Tel,
    Url,
    Date,
    DateTime,
    Time,
    Boolean,
    Json,
}

impl FieldType {
    /// Name used in definitions
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Time => "time",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
        }
    }

    /// Parse a field type name, falling back to text
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "number" => FieldType::Number,
            "tel" | "phone" => FieldType::Tel,
            "url" => FieldType::Url,
            "date" => FieldType::Date,
            "datetime" | "datetime-local" => FieldType::DateTime,
            "time" => FieldType::Time,
            "boolean" | "checkbox" => FieldType::Boolean,
            "json" => FieldType::Json,
            _ => FieldType::Text,
        }
    }

    /// HTML input type for a single-line input of this field type
    pub fn html_input_type(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Json => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime-local",
            FieldType::Time => "time",
            FieldType::Boolean => "checkbox",
        }
    }

    /// Whether length and pattern rules apply to this type
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Email
                | FieldType::Password
                | FieldType::Tel
                | FieldType::Url
                | FieldType::Json
        )
    }

    /// Whether this type holds a calendar value
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime | FieldType::Time)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::parse_lossy(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Widget Types
// ============================================================================

/// Leaf widget declared in a UI schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Text,
    Email,
    Password,
    Number,
    Tel,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

impl WidgetType {
    /// Name used in UI schemas
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Text => "text",
            WidgetType::Email => "email",
            WidgetType::Password => "password",
            WidgetType::Number => "number",
            WidgetType::Tel => "tel",
            WidgetType::Date => "date",
            WidgetType::Textarea => "textarea",
            WidgetType::Select => "select",
            WidgetType::Radio => "radio",
            WidgetType::Checkbox => "checkbox",
        }
    }

    /// The input type for single-line widgets, `None` for composite widgets
    pub fn input_type(&self) -> Option<FieldType> {
        match self {
            WidgetType::Text => Some(FieldType::Text),
            WidgetType::Email => Some(FieldType::Email),
            WidgetType::Password => Some(FieldType::Password),
            WidgetType::Number => Some(FieldType::Number),
            WidgetType::Tel => Some(FieldType::Tel),
            WidgetType::Date => Some(FieldType::Date),
            WidgetType::Textarea
            | WidgetType::Select
            | WidgetType::Radio
            | WidgetType::Checkbox => None,
        }
    }

    /// Whether the widget offers a fixed set of choices
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            WidgetType::Select | WidgetType::Radio | WidgetType::Checkbox
        )
    }

    /// Get the default widget for a field type
    pub fn for_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Email => WidgetType::Email,
            FieldType::Password => WidgetType::Password,
            FieldType::Number => WidgetType::Number,
            FieldType::Tel => WidgetType::Tel,
            FieldType::Date | FieldType::DateTime => WidgetType::Date,
            FieldType::Boolean => WidgetType::Checkbox,
            FieldType::Json => WidgetType::Textarea,
            FieldType::Text | FieldType::Url | FieldType::Time => WidgetType::Text,
        }
    }
}

impl FromStr for WidgetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(WidgetType::Text),
            "email" => Ok(WidgetType::Email),
            "password" => Ok(WidgetType::Password),
            "number" => Ok(WidgetType::Number),
            "tel" => Ok(WidgetType::Tel),
            "date" => Ok(WidgetType::Date),
            "textarea" => Ok(WidgetType::Textarea),
            "select" => Ok(WidgetType::Select),
            "radio" => Ok(WidgetType::Radio),
            "checkbox" => Ok(WidgetType::Checkbox),
            other => Err(format!("unknown widget type '{}'", other)),
        }
    }
}

impl std::fmt::Display for WidgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Direction children of a group (or options of a radio/checkbox) flow in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Horizontal,
    #[default]
    Vertical,
}

// ============================================================================
// Options
// ============================================================================

/// One selectable value with its display label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option whose label is the value with its first letter capitalised
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: capitalize(&value),
            value,
        }
    }
}

/// Uppercase the first character, keep the rest as is
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Split on `_` and capitalise each word: `created_at` becomes `Created At`
pub fn to_title_case(s: &str) -> String {
    s.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Validation rule attached to a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Minimum length for text, minimum value for numbers
    Min {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Maximum length for text, maximum value for numbers
    Max {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Regex the text value must contain a match for
    Pattern {
        regex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Rule {
    pub fn min(value: f64) -> Self {
        Rule::Min {
            value,
            message: None,
        }
    }

    pub fn max(value: f64) -> Self {
        Rule::Max {
            value,
            message: None,
        }
    }

    pub fn pattern(regex: impl Into<String>) -> Self {
        Rule::Pattern {
            regex: regex.into(),
            message: None,
        }
    }

    /// Attach a custom message
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        match &mut self {
            Rule::Min { message, .. } | Rule::Max { message, .. } | Rule::Pattern { message, .. } => {
                *message = Some(msg.into());
            }
        }
        self
    }

    /// The configured message, if any
    pub fn custom_message(&self) -> Option<&str> {
        match self {
            Rule::Min { message, .. } | Rule::Max { message, .. } | Rule::Pattern { message, .. } => {
                message.as_deref()
            }
        }
    }

    /// Message used when the rule supplies none
    pub fn default_message(&self, label: &str, numeric: bool) -> String {
        match (self, numeric) {
            (Rule::Min { value, .. }, false) => {
                format!("{} must be at least {} characters", label, format_bound(*value))
            }
            (Rule::Min { value, .. }, true) => {
                format!("{} must be at least {}", label, format_bound(*value))
            }
            (Rule::Max { value, .. }, false) => {
                format!("{} must be at most {} characters", label, format_bound(*value))
            }
            (Rule::Max { value, .. }, true) => {
                format!("{} must be at most {}", label, format_bound(*value))
            }
            (Rule::Pattern { .. }, _) => format!("{} format is invalid", label),
        }
    }

    /// Configured message or the default one
    pub fn message(&self, label: &str, numeric: bool) -> String {
        self.custom_message()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_message(label, numeric))
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Min { value, .. } => write!(f, "min({})", format_bound(*value)),
            Rule::Max { value, .. } => write!(f, "max({})", format_bound(*value)),
            Rule::Pattern { regex, .. } => write!(f, "pattern({})", regex),
        }
    }
}

/// Render a bound without a trailing `.0` for whole numbers
pub fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
