//! Form fields and value cleaning

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extra datetime layouts accepted on input, e.g. from `datetime-local` inputs
const DATETIME_INPUT_FORMATS: &[&str] = &[DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

const FALSE_VALUES: &[&str] = &["", "false", "0", "off", "n", "no"];

/// Kind of a form field, which decides both cleaning and the rendered widget
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	/// Single-line text input
	TextLine,
	/// Multi-line text area
	TextArea,
	Integer,
	Float,
	/// Checkbox, cleaned to a boolean
	Checkbox,
	Date,
	DateTime,
	/// Drop-down of `(value, label)` pairs
	Select { choices: Vec<(String, String)> },
	Hidden,
}

/// Validator attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
	/// A value must be present; `"0"` counts as present
	Required,
	/// At most this many characters
	MaxLength(usize),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
	#[error("This field is required.")]
	Required,
	#[error("Field cannot be longer than {max} characters.")]
	MaxLength { max: usize },
	#[error("Not a valid integer value.")]
	InvalidInteger,
	#[error("Not a valid float value.")]
	InvalidFloat,
	#[error("Not a valid date value.")]
	InvalidDate,
	#[error("Not a valid datetime value.")]
	InvalidDateTime,
	#[error("Not a valid choice.")]
	InvalidChoice,
}

pub type FieldResult<T> = Result<T, FieldError>;

/// One field of a [`crate::Form`]
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
	pub name: String,
	pub label: String,
	pub kind: FieldKind,
	pub validators: Vec<Validator>,
	pub readonly: bool,
	pub help_text: Option<String>,
}

impl FormField {
	/// Create a field labelled with the humanized name
	///
	/// # Examples
	///
	/// ```
	/// use overseer_forms::{FieldKind, FormField};
	///
	/// let field = FormField::new("first_name", FieldKind::TextLine);
	/// assert_eq!(field.label, "First Name");
	/// assert!(!field.is_required());
	/// ```
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		let name = name.into();
		Self {
			label: humanize(&name),
			name,
			kind,
			validators: Vec::new(),
			readonly: false,
			help_text: None,
		}
	}

	pub fn required(mut self) -> Self {
		if !self.is_required() {
			self.validators.push(Validator::Required);
		}
		self
	}

	pub fn with_max_length(mut self, max: usize) -> Self {
		self.validators.push(Validator::MaxLength(max));
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn with_help_text(mut self, help: impl Into<String>) -> Self {
		self.help_text = Some(help.into());
		self
	}

	/// Rendered but never cleaned
	pub fn readonly(mut self) -> Self {
		self.readonly = true;
		self
	}

	pub fn is_required(&self) -> bool {
		self.validators.contains(&Validator::Required)
	}

	fn max_length(&self) -> Option<usize> {
		self.validators.iter().find_map(|v| match v {
			Validator::MaxLength(n) => Some(*n),
			_ => None,
		})
	}

	/// Clean a raw submitted value
	///
	/// `None` means the key was absent from the submission. Blank optional
	/// text cleans to `""`, every other blank optional kind to `null`.
	///
	/// # Examples
	///
	/// ```
	/// use overseer_forms::{FieldError, FieldKind, FormField};
	/// use serde_json::json;
	///
	/// let age = FormField::new("age", FieldKind::Integer).required();
	/// assert_eq!(age.clean(Some("0")), Ok(json!(0)));
	/// assert_eq!(age.clean(Some("  ")), Err(FieldError::Required));
	///
	/// let notes = FormField::new("notes", FieldKind::TextArea);
	/// assert_eq!(notes.clean(None), Ok(json!("")));
	/// ```
	pub fn clean(&self, raw: Option<&str>) -> FieldResult<Value> {
		if self.kind == FieldKind::Checkbox {
			let checked = raw.is_some_and(|v| !FALSE_VALUES.contains(&v.trim().to_lowercase().as_str()));
			return Ok(Value::Bool(checked));
		}

		let raw = raw.unwrap_or("");
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			if self.is_required() {
				return Err(FieldError::Required);
			}
			return Ok(match self.kind {
				FieldKind::TextLine | FieldKind::TextArea | FieldKind::Hidden => {
					Value::String(String::new())
				}
				_ => Value::Null,
			});
		}

		match &self.kind {
			FieldKind::TextLine | FieldKind::Hidden => self.check_length(trimmed),
			FieldKind::TextArea => self.check_length(raw),
			FieldKind::Integer => trimmed
				.parse::<i64>()
				.map(Value::from)
				.map_err(|_| FieldError::InvalidInteger),
			FieldKind::Float => trimmed
				.parse::<f64>()
				.ok()
				.filter(|f| f.is_finite())
				.map(Value::from)
				.ok_or(FieldError::InvalidFloat),
			FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
				.map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
				.map_err(|_| FieldError::InvalidDate),
			FieldKind::DateTime => DATETIME_INPUT_FORMATS
				.iter()
				.find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
				.map(|dt| Value::String(dt.format(DATETIME_FORMAT).to_string()))
				.ok_or(FieldError::InvalidDateTime),
			FieldKind::Select { choices } => {
				if choices.iter().any(|(value, _)| value == trimmed) {
					Ok(Value::String(trimmed.to_string()))
				} else {
					Err(FieldError::InvalidChoice)
				}
			}
			FieldKind::Checkbox => Ok(Value::Bool(true)),
		}
	}

	fn check_length(&self, value: &str) -> FieldResult<Value> {
		if let Some(max) = self.max_length()
			&& value.chars().count() > max
		{
			return Err(FieldError::MaxLength { max });
		}
		Ok(Value::String(value.to_string()))
	}
}

/// Humanize a field name: `"active_user"` becomes `"Active User"`
///
/// # Examples
///
/// ```
/// use overseer_forms::humanize;
///
/// assert_eq!(humanize("active_user"), "Active User");
/// assert_eq!(humanize("age"), "Age");
/// ```
pub fn humanize(name: &str) -> String {
	name.split('_')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(FieldKind::TextLine, json!(""))]
	#[case(FieldKind::TextArea, json!(""))]
	#[case(FieldKind::Integer, Value::Null)]
	#[case(FieldKind::Float, Value::Null)]
	#[case(FieldKind::Date, Value::Null)]
	#[case(FieldKind::Checkbox, json!(false))]
	fn test_absent_optional_value(#[case] kind: FieldKind, #[case] expected: Value) {
		// Arrange
		let field = FormField::new("f", kind);

		// Act & Assert
		assert_eq!(field.clean(None), Ok(expected));
	}

	#[rstest]
	#[case("y", true)]
	#[case("on", true)]
	#[case("True", true)]
	#[case("false", false)]
	#[case("0", false)]
	fn test_checkbox_values(#[case] raw: &str, #[case] expected: bool) {
		// Arrange
		let field = FormField::new("active", FieldKind::Checkbox);

		// Act & Assert
		assert_eq!(field.clean(Some(raw)), Ok(Value::Bool(expected)));
	}

	#[rstest]
	#[case(FieldKind::Integer, "eighteen", FieldError::InvalidInteger)]
	#[case(FieldKind::Float, "NaN", FieldError::InvalidFloat)]
	#[case(FieldKind::Date, "2024-13-01", FieldError::InvalidDate)]
	#[case(FieldKind::DateTime, "yesterday", FieldError::InvalidDateTime)]
	fn test_invalid_values(#[case] kind: FieldKind, #[case] raw: &str, #[case] expected: FieldError) {
		// Arrange
		let field = FormField::new("f", kind);

		// Act & Assert
		assert_eq!(field.clean(Some(raw)), Err(expected));
	}

	#[rstest]
	fn test_datetime_normalizes_input_layouts() {
		// Arrange
		let field = FormField::new("created", FieldKind::DateTime);

		// Act
		let cleaned = field.clean(Some("2024-05-01T10:30"));

		// Assert
		assert_eq!(cleaned, Ok(json!("2024-05-01 10:30:00")));
	}

	#[rstest]
	fn test_select_accepts_only_known_choices() {
		// Arrange
		let field = FormField::new(
			"pet",
			FieldKind::Select {
				choices: vec![("1".into(), "Sparky".into())],
			},
		);

		// Act & Assert
		assert_eq!(field.clean(Some("1")), Ok(json!("1")));
		assert_eq!(field.clean(Some("2")), Err(FieldError::InvalidChoice));
		assert_eq!(field.clean(Some("")), Ok(Value::Null));
	}

	#[rstest]
	fn test_text_line_is_stripped() {
		// Arrange
		let field = FormField::new("name", FieldKind::TextLine);

		// Act & Assert
		assert_eq!(field.clean(Some("  Stan ")), Ok(json!("Stan")));
	}

	proptest! {
		#[test]
		fn prop_max_length_counts_characters(s in "\\PC{0,30}") {
			let field = FormField::new("name", FieldKind::TextArea).with_max_length(20);
			let result = field.clean(Some(&s));
			if s.trim().is_empty() {
				prop_assert_eq!(result, Ok(json!("")));
			} else if s.chars().count() > 20 {
				prop_assert_eq!(result, Err(FieldError::MaxLength { max: 20 }));
			} else {
				prop_assert_eq!(result, Ok(json!(s)));
			}
		}
	}
}
