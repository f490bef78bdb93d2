//! Input methods a handler can ask the remote caller for.
//!
//! The set is closed: [`IoMethod`] has one variant per input kind, each with
//! its own props and its own response validator. On the wire a request is
//! `{"methodName": "INPUT_TEXT", "props": {...}}`.
//!
//! Handlers normally go through the typed helpers:
//!
//! ```ignore
//! let name = io::input_text("What is your name?").await?;
//! let age = io::input_number(InputNumberProps::new("Age").min(0.0)).await?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context;
use crate::error::IoError;

// =============================================================================
// Props
// =============================================================================

/// Props for `INPUT_TEXT`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTextProps {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl InputTextProps {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Render as a text area with the given number of lines.
    pub fn multiline(mut self, lines: u32) -> Self {
        self.multiline = Some(true);
        self.lines = Some(lines);
        self
    }

    pub fn min_length(mut self, n: u32) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: u32) -> Self {
        self.max_length = Some(n);
        self
    }
}

impl From<&str> for InputTextProps {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for InputTextProps {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// Props for `INPUT_NUMBER`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNumberProps {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl InputNumberProps {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl From<&str> for InputNumberProps {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for InputNumberProps {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

// =============================================================================
// Method + Value
// =============================================================================

/// A request for input: the pending-request descriptor `{methodName, props}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "methodName", content = "props")]
pub enum IoMethod {
    #[serde(rename = "INPUT_TEXT")]
    InputText(InputTextProps),
    #[serde(rename = "INPUT_NUMBER")]
    InputNumber(InputNumberProps),
}

/// A validated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IoValue {
    Text(String),
    Number(f64),
}

impl IoMethod {
    pub const INPUT_TEXT: &'static str = "INPUT_TEXT";
    pub const INPUT_NUMBER: &'static str = "INPUT_NUMBER";

    /// Wire name of the method.
    pub fn method_name(&self) -> &'static str {
        match self {
            IoMethod::InputText(_) => Self::INPUT_TEXT,
            IoMethod::InputNumber(_) => Self::INPUT_NUMBER,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            IoMethod::InputText(props) => &props.label,
            IoMethod::InputNumber(props) => &props.label,
        }
    }

    /// Validate a raw response body against this method's return shape.
    pub fn parse_response(&self, body: &Value) -> Result<IoValue, ValidationFailure> {
        match self {
            IoMethod::InputText(props) => parse_text(props, body),
            IoMethod::InputNumber(props) => parse_number(props, body),
        }
        .map_err(|issues| ValidationFailure {
            method_name: self.method_name().to_string(),
            issues,
        })
    }
}

fn parse_text(props: &InputTextProps, body: &Value) -> Result<IoValue, Vec<ValidationIssue>> {
    let Some(text) = body.as_str() else {
        return Err(vec![ValidationIssue::invalid_type("string", body)]);
    };

    let length = text.chars().count();
    let mut issues = Vec::new();
    if let Some(min) = props.min_length {
        if length < min as usize {
            issues.push(ValidationIssue {
                code: IssueCode::TooSmall,
                message: format!("must be at least {} characters", min),
            });
        }
    }
    if let Some(max) = props.max_length {
        if length > max as usize {
            issues.push(ValidationIssue {
                code: IssueCode::TooBig,
                message: format!("must be at most {} characters", max),
            });
        }
    }

    if issues.is_empty() {
        Ok(IoValue::Text(text.to_string()))
    } else {
        Err(issues)
    }
}

fn parse_number(props: &InputNumberProps, body: &Value) -> Result<IoValue, Vec<ValidationIssue>> {
    let Some(number) = body.as_f64() else {
        return Err(vec![ValidationIssue::invalid_type("number", body)]);
    };

    let mut issues = Vec::new();
    if let Some(min) = props.min {
        if number < min {
            issues.push(ValidationIssue {
                code: IssueCode::TooSmall,
                message: format!("must be greater than or equal to {}", min),
            });
        }
    }
    if let Some(max) = props.max {
        if number > max {
            issues.push(ValidationIssue {
                code: IssueCode::TooBig,
                message: format!("must be less than or equal to {}", max),
            });
        }
    }

    if issues.is_empty() {
        Ok(IoValue::Number(number))
    } else {
        Err(issues)
    }
}

// =============================================================================
// Validation Failure
// =============================================================================

/// Why a response body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
}

/// One problem found in a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    fn invalid_type(expected: &str, received: &Value) -> Self {
        Self {
            code: IssueCode::InvalidType,
            message: format!("expected {}, received {}", expected, json_kind(received)),
        }
    }
}

/// Structured detail for a rejected response. The request stays pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub method_name: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid response for {}", self.method_name)?;
        for (i, issue) in self.issues.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, issue.message)?;
        }
        Ok(())
    }
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

// =============================================================================
// Typed helpers
// =============================================================================

/// Ask for a line (or block) of text. Suspends until a valid response.
pub async fn input_text(props: impl Into<InputTextProps>) -> Result<String, IoError> {
    match context::issue_io_request(IoMethod::InputText(props.into())).await? {
        IoValue::Text(text) => Ok(text),
        IoValue::Number(_) => Err(IoError::UnexpectedValue {
            method_name: IoMethod::INPUT_TEXT,
        }),
    }
}

/// Ask for a number. Suspends until a valid response.
pub async fn input_number(props: impl Into<InputNumberProps>) -> Result<f64, IoError> {
    match context::issue_io_request(IoMethod::InputNumber(props.into())).await? {
        IoValue::Number(number) => Ok(number),
        IoValue::Text(_) => Err(IoError::UnexpectedValue {
            method_name: IoMethod::INPUT_NUMBER,
        }),
    }
}
