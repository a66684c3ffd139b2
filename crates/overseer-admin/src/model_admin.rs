//! Model-admin views
//!
//! A [`ModelAdmin`] puts list, add, edit and delete screens in front of any
//! [`ModelBackend`]. Its form is synthesized from the backend's schema and the
//! field selection in [`ModelAdminOptions`].

mod form;
mod list;

use crate::error::{AdminError, AdminResult};
use crate::options::ModelAdminOptions;
use crate::render::{DeleteContext, FieldContext, FormContext};
use crate::routing::Expose;
use crate::view::{AdminView, BaseView, ViewRequest};
use async_trait::async_trait;
use overseer_db::{DbError, ModelBackend, ModelSchema, Record};
use overseer_forms::{CSRF_FIELD_NAME, CsrfTokens, Form, escape};
use overseer_http::{Method, Request, Response};
use std::fmt;
use std::sync::Arc;

/// Page size used when neither the view nor the application sets one
pub const DEFAULT_LIST_PER_PAGE: usize = 20;

/// Values of `confirm_delete` that do not confirm a deletion
const FALSY: &[&str] = &["", "0", "false", "off", "no"];

/// CRUD screens for one model
///
/// The default name is the model name and the default endpoint its lowercase
/// form, so `Person` is served under `/admin/person`.
pub struct ModelAdmin {
	base: BaseView,
	backend: Arc<dyn ModelBackend>,
	options: ModelAdminOptions,
	pk: String,
	form_fields: Vec<String>,
}

impl ModelAdmin {
	/// Validate `options` against the backend's schema
	///
	/// Fails with [`AdminError::PrimaryKey`] unless the model has exactly one
	/// primary key, and with [`AdminError::UnknownField`] when an option names a
	/// field the model does not have.
	pub fn new(backend: Arc<dyn ModelBackend>, options: ModelAdminOptions) -> AdminResult<Self> {
		let schema = backend.schema();
		let pk = schema
			.primary_key()
			.map_err(|e| AdminError::PrimaryKey {
				model: schema.name.clone(),
				reason: e.to_string(),
			})?
			.name
			.clone();

		let ordering = options.ordering.iter().map(|key| key.field.clone()).collect::<Vec<_>>();
		let checks: [(&'static str, &[String]); 6] = [
			("fields", &options.fields),
			("exclude", &options.exclude),
			("list_display", &options.list_display),
			("search_fields", &options.search_fields),
			("readonly_fields", &options.readonly_fields),
			("ordering", &ordering),
		];
		for (option, names) in checks {
			if let Some(field) = names.iter().find(|name| schema.field(name).is_none()) {
				return Err(AdminError::UnknownField {
					model: schema.name.clone(),
					option,
					field: field.clone(),
				});
			}
		}

		let mut form_fields: Vec<String> = if options.fields.is_empty() {
			schema
				.fields
				.iter()
				.filter(|f| !f.primary_key)
				.map(|f| f.name.clone())
				.collect()
		} else {
			options.fields.clone()
		};
		form_fields.retain(|name| !options.exclude.contains(name));

		Ok(Self {
			base: BaseView::new(options.view.clone()),
			backend,
			options,
			pk,
			form_fields,
		})
	}

	pub fn backend(&self) -> &Arc<dyn ModelBackend> {
		&self.backend
	}

	pub fn schema(&self) -> &ModelSchema {
		self.backend.schema()
	}

	pub fn model_name(&self) -> &str {
		&self.schema().name
	}

	pub fn options(&self) -> &ModelAdminOptions {
		&self.options
	}

	pub fn primary_key(&self) -> &str {
		&self.pk
	}

	/// Names of the fields the add and edit forms show, in order
	pub fn form_fields(&self) -> &[String] {
		&self.form_fields
	}

	pub fn is_readonly(&self, field: &str) -> bool {
		self.options.readonly_fields.iter().any(|f| f == field)
	}

	/// Page size of the list screen
	pub fn list_per_page(&self) -> usize {
		self.options
			.list_per_page
			.or_else(|| self.base.admin().and_then(|a| a.app().map(|app| app.settings().list_per_page)))
			.filter(|n| *n > 0)
			.unwrap_or(DEFAULT_LIST_PER_PAGE)
	}

	/// Unbound add form
	pub async fn form(&self) -> AdminResult<Form> {
		self.build_form(None).await
	}

	fn url(&self) -> String {
		self.base
			.url()
			.map(str::to_string)
			.unwrap_or_else(|| format!("/{}", self.resolved_endpoint()))
	}

	fn list_url(&self) -> String {
		format!("{}/", self.url())
	}

	fn edit_url(&self, pk: &str) -> String {
		format!("{}/{}/", self.url(), pk)
	}

	fn csrf_scope(&self) -> String {
		self.resolved_endpoint()
	}

	/// Token source when the bound application enables CSRF protection
	fn csrf_tokens(&self) -> Option<CsrfTokens> {
		let admin = self.base.admin()?;
		let settings = admin.app()?.settings();
		settings
			.csrf_enabled
			.then(|| CsrfTokens::new(settings.secret_key.clone()))
	}

	async fn add_view(&self, request: ViewRequest) -> AdminResult<Response> {
		let mut form = self.build_form(None).await?;
		if request.request.method == Method::POST {
			form.bind(request.request.form()?);
			if let Some(response) = self.save(&mut form, None).await? {
				return Ok(response);
			}
		}
		let title = format!("Add {}", self.model_name());
		self.render_form(&request.request, &form, None, None, title).await
	}

	async fn edit_view(&self, request: ViewRequest) -> AdminResult<Response> {
		let pk = self.requested_pk(&request)?;
		let record = self.fetch(&pk).await?;

		let mut form = self.build_form(Some(&record)).await?;
		if request.request.method == Method::POST {
			form.bind(request.request.form()?);
			if let Some(response) = self.save(&mut form, Some(&pk)).await? {
				return Ok(response);
			}
		}
		let title = format!("Edit {}", self.backend.label(&record));
		self.render_form(&request.request, &form, Some(&record), Some(&pk), title)
			.await
	}

	async fn delete_view(&self, request: ViewRequest) -> AdminResult<Response> {
		let pk = self.requested_pk(&request)?;
		let record = self.fetch(&pk).await?;
		let tokens = self.csrf_tokens();
		let mut errors = Vec::new();

		if request.request.method == Method::POST {
			let data = request.request.form()?;
			if is_confirmed(data.get("confirm_delete").map(String::as_str)) {
				let token_ok = tokens.as_ref().is_none_or(|tokens| {
					tokens.verify(
						&self.csrf_scope(),
						data.get(CSRF_FIELD_NAME).map(String::as_str).unwrap_or(""),
					)
				});
				if token_ok {
					if !self.backend.delete(&pk).await? {
						return Err(AdminError::NotFound(format!("{} '{}'", self.model_name(), pk)));
					}
					tracing::info!(model = %self.model_name(), pk = %pk, "Deleted record");
					return Ok(Response::temporary_redirect(self.list_url()));
				}
				tracing::warn!(model = %self.model_name(), pk = %pk, "Rejected delete with bad CSRF token");
				errors.push("CSRF token missing or incorrect.".to_string());
			}
		}

		let context = DeleteContext {
			model_name: self.model_name().to_string(),
			object_label: self.backend.label(&record),
			action_url: escape(&format!("{}delete/", self.edit_url(&pk))),
			cancel_url: escape(&self.edit_url(&pk)),
			errors,
			csrf_input: tokens.and_then(|tokens| {
				Form::new(Vec::new())
					.with_csrf(tokens, self.csrf_scope())
					.csrf_input()
			}),
		};
		let html = self.base.render(
			&request.request,
			"admin/model/delete.html",
			tera::Context::from_serialize(&context)?,
		)?;
		Ok(Response::ok().with_html(html))
	}

	fn requested_pk(&self, request: &ViewRequest) -> AdminResult<String> {
		request
			.param("pk")
			.map(str::to_string)
			.ok_or_else(|| AdminError::BadRequest("missing primary key".to_string()))
	}

	async fn fetch(&self, pk: &str) -> AdminResult<Record> {
		self.backend
			.get(pk)
			.await?
			.ok_or_else(|| AdminError::NotFound(format!("{} '{}'", self.model_name(), pk)))
	}

	/// Validate a bound form and write it; `None` means the form is re-rendered
	async fn save(&self, form: &mut Form, pk: Option<&str>) -> AdminResult<Option<Response>> {
		if !form.is_valid() {
			return Ok(None);
		}
		let values = self.cleaned_record(form);

		let result = match pk {
			None => self.backend.insert(values).await.map(Some),
			Some(pk) => self
				.backend
				.update(pk, values)
				.await
				.map(|found| found.then(|| pk.to_string())),
		};
		match result {
			Ok(Some(saved)) => {
				tracing::info!(model = %self.model_name(), pk = %saved, created = pk.is_none(), "Saved record");
				Ok(Some(Response::temporary_redirect(self.list_url())))
			}
			Ok(None) => Err(AdminError::NotFound(format!(
				"{} '{}'",
				self.model_name(),
				pk.unwrap_or_default()
			))),
			Err(DbError::InvalidValue { field, message }) => {
				let target = form.field(&field).map(|f| f.name.clone());
				form.add_error(target.as_deref(), message);
				Ok(None)
			}
			Err(e) => Err(e.into()),
		}
	}

	async fn render_form(
		&self,
		request: &Request,
		form: &Form,
		record: Option<&Record>,
		pk: Option<&str>,
		title: String,
	) -> AdminResult<Response> {
		let mut fields = Vec::with_capacity(form.fields().len());
		for field in form.fields() {
			let html = if field.readonly {
				let value = record
					.and_then(|r| r.get(&field.name))
					.cloned()
					.unwrap_or_default();
				self.readonly_html(&field.name, &value).await?
			} else {
				field.render_widget(&form.display_value(&field.name))
			};
			fields.push(FieldContext {
				name: field.name.clone(),
				label_html: field.render_label(),
				html,
				errors: form.field_errors(&field.name).to_vec(),
				required: field.is_required(),
				readonly: field.readonly,
				help_text: field.help_text.clone(),
			});
		}

		let action_url = match pk {
			Some(pk) => self.edit_url(pk),
			None => format!("{}/add/", self.url()),
		};
		let context = FormContext {
			title,
			model_name: self.model_name().to_string(),
			action_url: escape(&action_url),
			list_url: escape(&self.list_url()),
			delete_url: pk.map(|pk| escape(&format!("{}delete/", self.edit_url(pk)))),
			fields,
			errors: form.non_field_errors().to_vec(),
			csrf_input: form.csrf_input(),
		};
		let html = self.base.render(
			request,
			"admin/model/edit.html",
			tera::Context::from_serialize(&context)?,
		)?;
		Ok(Response::ok().with_html(html))
	}
}

/// Whether a submitted `confirm_delete` value asks for the deletion
fn is_confirmed(value: Option<&str>) -> bool {
	value.is_some_and(|v| !FALSY.contains(&v.trim().to_lowercase().as_str()))
}

#[async_trait]
impl AdminView for ModelAdmin {
	fn base(&self) -> &BaseView {
		&self.base
	}

	fn routes(&self) -> Vec<Expose> {
		let get_post = [Method::GET, Method::POST];
		vec![
			Expose::get("/", "list"),
			Expose::new("/add/", "add", &get_post),
			Expose::new("/{pk}/", "edit", &get_post),
			Expose::new("/{pk}/delete/", "delete", &get_post),
		]
	}

	fn class_name(&self) -> &'static str {
		"ModelAdmin"
	}

	fn default_name(&self) -> String {
		self.model_name().to_string()
	}

	fn default_endpoint(&self) -> String {
		self.model_name().to_lowercase()
	}

	fn is_accessible(&self, request: &Request) -> bool {
		self.options.is_accessible(request)
	}

	async fn call(&self, route: &str, request: ViewRequest) -> AdminResult<Response> {
		match route {
			"list" => self.list_view(request).await,
			"add" => self.add_view(request).await,
			"edit" => self.edit_view(request).await,
			"delete" => self.delete_view(request).await,
			other => Err(AdminError::NotFound(format!("route '{}'", other))),
		}
	}

	fn as_model_admin(&self) -> Option<&ModelAdmin> {
		Some(self)
	}
}

impl fmt::Debug for ModelAdmin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelAdmin")
			.field("model", &self.model_name())
			.field("pk", &self.pk)
			.field("form_fields", &self.form_fields)
			.field("options", &self.options)
			.finish()
	}
}
