//! Form synthesis from a model schema

use super::ModelAdmin;
use crate::error::AdminResult;
use crate::site::Admin;
use overseer_db::{FieldDescriptor, FieldKind, ListQuery, Record, pk_to_string};
use overseer_forms::{FieldKind as WidgetKind, Form, FormField, display_value, escape};
use serde_json::Value;
use std::collections::HashMap;

/// Form field for one schema field
///
/// References become a select over the target's records when `choices` is
/// given, and a text input holding the raw key otherwise.
pub(crate) fn form_field(
	descriptor: &FieldDescriptor,
	choices: Option<Vec<(String, String)>>,
	readonly: bool,
) -> FormField {
	let kind = match &descriptor.kind {
		FieldKind::String => WidgetKind::TextLine,
		FieldKind::Text => WidgetKind::TextArea,
		FieldKind::Integer => WidgetKind::Integer,
		FieldKind::Float => WidgetKind::Float,
		FieldKind::Boolean => WidgetKind::Checkbox,
		FieldKind::Date => WidgetKind::Date,
		FieldKind::DateTime => WidgetKind::DateTime,
		FieldKind::Reference { .. } => match choices {
			Some(choices) => WidgetKind::Select { choices },
			None => WidgetKind::TextLine,
		},
	};

	let is_checkbox = kind == WidgetKind::Checkbox;
	let mut field = FormField::new(&descriptor.name, kind);
	if descriptor.required && !is_checkbox {
		field = field.required();
	}
	if descriptor.kind == FieldKind::String
		&& let Some(max) = descriptor.max_length
	{
		field = field.with_max_length(max);
	}
	if readonly {
		field = field.readonly();
	}
	field
}

fn initial_values(record: &Record) -> HashMap<String, Value> {
	record.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// `(key, label)` pairs of every record of the model registered as `target`
///
/// `None` when no view for `target` is registered on `admin`.
async fn reference_choices(admin: Option<&Admin>, target: &str) -> AdminResult<Option<Vec<(String, String)>>> {
	let Some(view) = admin.and_then(|a| a.model_view(target)) else {
		return Ok(None);
	};
	let Some(target_admin) = view.as_model_admin() else {
		return Ok(None);
	};
	let backend = target_admin.backend();
	let page = backend.list(&ListQuery::new()).await?;
	let choices = page
		.records
		.iter()
		.filter_map(|record| backend.record_pk(record).map(|pk| (pk, backend.label(record))))
		.collect();
	Ok(Some(choices))
}

/// HTML for a reference value: a link to the target's edit screen when the
/// target is registered and the record exists, the escaped key otherwise
pub(crate) async fn reference_html(admin: Option<&Admin>, target: &str, value: &Value) -> AdminResult<String> {
	if value.is_null() {
		return Ok(String::new());
	}
	let pk = pk_to_string(value);
	let Some(view) = admin.and_then(|a| a.model_view(target)) else {
		return Ok(escape(&pk));
	};
	let (Some(target_admin), Some(url)) = (view.as_model_admin(), view.base().url()) else {
		return Ok(escape(&pk));
	};
	match target_admin.backend().get(&pk).await? {
		Some(record) => Ok(format!(
			r#"<a href="{}/{}/">{}</a>"#,
			escape(url),
			escape(&pk),
			escape(&target_admin.backend().label(&record))
		)),
		None => Ok(escape(&pk)),
	}
}

impl ModelAdmin {
	/// Form over the selected fields, seeded from `record` when editing
	pub(crate) async fn build_form(&self, record: Option<&Record>) -> AdminResult<Form> {
		let admin = self.base.admin();
		let schema = self.schema();

		let mut fields = Vec::with_capacity(self.form_fields.len());
		for name in &self.form_fields {
			let Some(descriptor) = schema.field(name) else {
				continue;
			};
			let readonly = self.is_readonly(name);
			let choices = match &descriptor.kind {
				FieldKind::Reference { target } if !readonly => reference_choices(admin.as_ref(), target).await?,
				_ => None,
			};
			fields.push(form_field(descriptor, choices, readonly));
		}

		let mut form = Form::new(fields);
		if let Some(record) = record {
			form = form.with_initial(initial_values(record));
		}
		if let Some(tokens) = self.csrf_tokens() {
			form = form.with_csrf(tokens, self.csrf_scope());
		}
		Ok(form)
	}

	/// Values of a valid form as a record for the backend
	///
	/// Read-only fields are left out; a blank reference is stored as null.
	pub(crate) fn cleaned_record(&self, form: &Form) -> Record {
		let schema = self.schema();
		let mut values = Record::new();
		for name in &self.form_fields {
			if self.is_readonly(name) {
				continue;
			}
			let Some(value) = form.cleaned_data().get(name) else {
				continue;
			};
			let is_reference = schema
				.field(name)
				.is_some_and(|f| matches!(f.kind, FieldKind::Reference { .. }));
			let value = match value {
				Value::String(s) if is_reference && s.trim().is_empty() => Value::Null,
				other => other.clone(),
			};
			values.insert(name.clone(), value);
		}
		values
	}

	/// Display HTML of a read-only field
	pub(crate) async fn readonly_html(&self, name: &str, value: &Value) -> AdminResult<String> {
		let inner = match self.schema().field(name).map(|f| &f.kind) {
			Some(FieldKind::Reference { target }) => {
				reference_html(self.base.admin().as_ref(), target, value).await?
			}
			_ => escape(&display_value(value)),
		};
		Ok(format!(r#"<div class="readonly" id="{}">{}</div>"#, escape(name), inner))
	}
}
