use crate::csrf::{CSRF_FIELD_NAME, CsrfTokens};
use crate::field::{FieldError, FormField};
use serde_json::Value;
use std::collections::HashMap;

/// Key for form-level (non-field-specific) errors
pub const ALL_FIELDS_KEY: &str = "_all";

struct CsrfCheck {
	tokens: CsrfTokens,
	scope: String,
}

/// A set of fields bound to submitted data
///
/// Initial values stand in for fields absent from the submission, so a
/// partial update keeps what it did not mention. Checkboxes are the exception:
/// browsers omit unchecked boxes, so an absent checkbox cleans to `false`.
pub struct Form {
	fields: Vec<FormField>,
	data: HashMap<String, String>,
	initial: HashMap<String, Value>,
	cleaned: HashMap<String, Value>,
	errors: HashMap<String, Vec<String>>,
	is_bound: bool,
	csrf: Option<CsrfCheck>,
}

impl Form {
	pub fn new(fields: Vec<FormField>) -> Self {
		Self {
			fields,
			data: HashMap::new(),
			initial: HashMap::new(),
			cleaned: HashMap::new(),
			errors: HashMap::new(),
			is_bound: false,
			csrf: None,
		}
	}

	/// Values shown when unbound and used for absent keys when bound
	pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
		self.initial = initial;
		self
	}

	/// Require a valid CSRF token for `scope` on validation
	pub fn with_csrf(mut self, tokens: CsrfTokens, scope: impl Into<String>) -> Self {
		self.csrf = Some(CsrfCheck {
			tokens,
			scope: scope.into(),
		});
		self
	}

	pub fn bind(&mut self, data: HashMap<String, String>) {
		self.data = data;
		self.is_bound = true;
	}

	pub fn is_bound(&self) -> bool {
		self.is_bound
	}

	pub fn fields(&self) -> &[FormField] {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&FormField> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Names of every field, in order
	pub fn field_names(&self) -> Vec<&str> {
		self.fields.iter().map(|f| f.name.as_str()).collect()
	}

	/// Validate the bound data, collecting cleaned values and errors
	///
	/// Read-only fields are skipped entirely.
	pub fn is_valid(&mut self) -> bool {
		if !self.is_bound {
			return false;
		}
		self.errors.clear();
		self.cleaned.clear();

		if let Some(check) = &self.csrf {
			let submitted = self.data.get(CSRF_FIELD_NAME).map(String::as_str).unwrap_or("");
			if !check.tokens.verify(&check.scope, submitted) {
				self.errors
					.entry(ALL_FIELDS_KEY.to_string())
					.or_default()
					.push("CSRF token missing or incorrect.".to_string());
				return false;
			}
		}

		for field in self.fields.iter().filter(|f| !f.readonly) {
			let result = match (self.data.get(&field.name), self.initial.get(&field.name)) {
				(Some(raw), _) => field.clean(Some(raw)),
				(None, Some(initial)) if field.kind != crate::FieldKind::Checkbox => {
					if initial.is_null() && field.is_required() {
						Err(FieldError::Required)
					} else {
						Ok(initial.clone())
					}
				}
				(None, _) => field.clean(None),
			};
			match result {
				Ok(value) => {
					self.cleaned.insert(field.name.clone(), value);
				}
				Err(e) => {
					self.errors
						.entry(field.name.clone())
						.or_default()
						.push(e.to_string());
				}
			}
		}

		self.errors.is_empty()
	}

	pub fn cleaned_data(&self) -> &HashMap<String, Value> {
		&self.cleaned
	}

	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}

	pub fn field_errors(&self, name: &str) -> &[String] {
		self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn non_field_errors(&self) -> &[String] {
		self.field_errors(ALL_FIELDS_KEY)
	}

	/// Record an error found outside field cleaning, e.g. by the backend
	pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
		self.errors
			.entry(field.unwrap_or(ALL_FIELDS_KEY).to_string())
			.or_default()
			.push(message.into());
	}

	/// Value to show in the widget of `name`
	///
	/// A bound form redisplays what was submitted; otherwise the initial value.
	pub fn display_value(&self, name: &str) -> Value {
		if self.is_bound
			&& let Some(raw) = self.data.get(name)
		{
			return Value::String(raw.clone());
		}
		self.initial.get(name).cloned().unwrap_or(Value::Null)
	}

	/// Hidden CSRF input, if protection is enabled
	pub fn csrf_input(&self) -> Option<String> {
		self.csrf.as_ref().map(|check| {
			format!(
				r#"<input id="{CSRF_FIELD_NAME}" name="{CSRF_FIELD_NAME}" type="hidden" value="{}">"#,
				check.tokens.token(&check.scope)
			)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::FieldKind;
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[fixture]
	fn person_form() -> Form {
		Form::new(vec![
			FormField::new("name", FieldKind::TextArea),
			FormField::new("age", FieldKind::Integer),
		])
	}

	#[rstest]
	fn test_unbound_form_is_invalid(mut person_form: Form) {
		// Act & Assert
		assert!(!person_form.is_valid());
	}

	#[rstest]
	fn test_absent_keys_keep_initial(person_form: Form) {
		// Arrange
		let mut form = person_form.with_initial(HashMap::from([
			("name".to_string(), json!("name")),
			("age".to_string(), json!(18)),
		]));
		form.bind(data(&[("name", "changed")]));

		// Act
		let valid = form.is_valid();

		// Assert
		assert!(valid);
		assert_eq!(form.cleaned_data()["name"], json!("changed"));
		assert_eq!(form.cleaned_data()["age"], json!(18));
	}

	#[rstest]
	fn test_errors_are_collected_per_field() {
		// Arrange
		let mut form = Form::new(vec![
			FormField::new("name", FieldKind::TextLine).required(),
			FormField::new("age", FieldKind::Integer),
		]);
		form.bind(data(&[("age", "old")]));

		// Act
		let valid = form.is_valid();

		// Assert
		assert!(!valid);
		assert_eq!(form.field_errors("name"), ["This field is required."]);
		assert_eq!(form.field_errors("age"), ["Not a valid integer value."]);
		assert_eq!(form.display_value("age"), json!("old"));
	}

	#[rstest]
	fn test_readonly_fields_are_not_cleaned() {
		// Arrange
		let mut form = Form::new(vec![
			FormField::new("name", FieldKind::TextLine),
			FormField::new("pet", FieldKind::TextLine).readonly(),
		]);
		form.bind(data(&[("name", "Stan"), ("pet", "tampered")]));

		// Act
		let valid = form.is_valid();

		// Assert
		assert!(valid);
		assert!(!form.cleaned_data().contains_key("pet"));
	}

	#[rstest]
	fn test_csrf_token_is_required(person_form: Form) {
		// Arrange
		let tokens = CsrfTokens::new("secret");
		let token = tokens.token("person");
		let mut rejected = Form::new(person_form.fields().to_vec()).with_csrf(tokens.clone(), "person");
		let mut accepted = person_form.with_csrf(tokens, "person");
		rejected.bind(data(&[("name", "x")]));
		accepted.bind(data(&[("name", "x"), ("csrf_token", token.as_str())]));

		// Act & Assert
		assert!(!rejected.is_valid());
		assert_eq!(rejected.non_field_errors(), ["CSRF token missing or incorrect."]);
		assert!(accepted.is_valid());
		assert!(accepted.csrf_input().unwrap().contains(&token));
	}
}
