//! HTML rendering of form fields

use crate::field::{FieldKind, FormField};
use serde_json::Value;

/// Escape HTML special characters
///
/// # Examples
///
/// ```
/// use overseer_forms::escape;
///
/// assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
pub fn escape(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	for ch in text.chars() {
		match ch {
			'&' => result.push_str("&amp;"),
			'<' => result.push_str("&lt;"),
			'>' => result.push_str("&gt;"),
			'"' => result.push_str("&quot;"),
			'\'' => result.push_str("&#x27;"),
			_ => result.push(ch),
		}
	}
	result
}

/// Plain-text form of a stored value (unescaped)
///
/// # Examples
///
/// ```
/// use overseer_forms::display_value;
/// use serde_json::json;
///
/// assert_eq!(display_value(&json!(10)), "10");
/// assert_eq!(display_value(&json!(null)), "");
/// assert_eq!(display_value(&json!("Stan")), "Stan");
/// ```
pub fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(b) => b.to_string(),
		other => other.to_string(),
	}
}

fn is_checked(value: &Value) -> bool {
	match value {
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
		Value::String(s) => !matches!(s.as_str(), "" | "0" | "false" | "off" | "no"),
		_ => false,
	}
}

impl FormField {
	/// Render the input widget for `value`
	///
	/// # Examples
	///
	/// ```
	/// use overseer_forms::{FieldKind, FormField};
	/// use serde_json::json;
	///
	/// let age = FormField::new("age", FieldKind::Integer);
	/// assert_eq!(
	///     age.render_widget(&json!(10)),
	///     r#"<input class="" id="age" name="age" type="text" value="10">"#
	/// );
	///
	/// let name = FormField::new("name", FieldKind::TextArea);
	/// assert_eq!(
	///     name.render_widget(&json!("Stan")),
	///     r#"<textarea class="" id="name" name="name">Stan</textarea>"#
	/// );
	/// ```
	pub fn render_widget(&self, value: &Value) -> String {
		let name = escape(&self.name);
		let text = escape(&display_value(value));
		match &self.kind {
			FieldKind::TextArea => format!(
				r#"<textarea class="" id="{name}" name="{name}">{text}</textarea>"#
			),
			FieldKind::Checkbox => {
				let checked = if is_checked(value) { " checked" } else { "" };
				format!(r#"<input class="" id="{name}" name="{name}" type="checkbox" value="y"{checked}>"#)
			}
			FieldKind::Select { choices } => {
				let current = display_value(value);
				let mut html = format!(r#"<select class="" id="{name}" name="{name}">"#);
				html.push_str(r#"<option value="">---</option>"#);
				for (choice, label) in choices {
					let selected = if *choice == current { " selected" } else { "" };
					html.push_str(&format!(
						r#"<option{selected} value="{}">{}</option>"#,
						escape(choice),
						escape(label)
					));
				}
				html.push_str("</select>");
				html
			}
			FieldKind::Hidden => {
				format!(r#"<input id="{name}" name="{name}" type="hidden" value="{text}">"#)
			}
			FieldKind::TextLine
			| FieldKind::Integer
			| FieldKind::Float
			| FieldKind::Date
			| FieldKind::DateTime => {
				format!(r#"<input class="" id="{name}" name="{name}" type="text" value="{text}">"#)
			}
		}
	}

	/// Render the `<label>` element
	pub fn render_label(&self) -> String {
		format!(
			r#"<label for="{}">{}</label>"#,
			escape(&self.name),
			escape(&self.label)
		)
	}
}
