//! Serves an admin over a small library database
//!
//! Settings come from `OVERSEER_*` environment variables and the optional TOML
//! file named by `OVERSEER_CONFIG`; `OVERSEER_ADDR` picks the listen address.
//! A secret key is required while CSRF protection is on:
//!
//! ```text
//! OVERSEER_SECRET_KEY=change-me cargo run --bin overseer-demo
//! ```

use anyhow::Context;
use overseer::db::document::{DocField, DocumentBackend, DocumentSchema, DocumentStore};
use overseer::db::sql::{self, SqlTable};
use overseer::db::typed::{Model, TypedBackend, TypedField};
use overseer::prelude::*;
use overseer::server::{init_logging, serve};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const SCHEMA: &str = "
	CREATE TABLE author (
		id INTEGER PRIMARY KEY,
		name VARCHAR(100) NOT NULL,
		email VARCHAR(255)
	);
	CREATE TABLE book (
		id INTEGER PRIMARY KEY,
		title VARCHAR(200) NOT NULL,
		summary TEXT,
		published DATE,
		author_id INTEGER REFERENCES author(id)
	);
";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Publisher {
	#[serde(default)]
	id: i64,
	name: String,
	#[serde(default)]
	active: bool,
}

impl Model for Publisher {
	const MODEL_NAME: &'static str = "Publisher";

	fn fields() -> Vec<TypedField> {
		vec![
			TypedField::auto("id"),
			TypedField::char("name", 120).required(),
			TypedField::boolean("active"),
		]
	}

	fn label(&self) -> Option<String> {
		Some(self.name.clone())
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_logging("info");

	let config = std::env::var_os("OVERSEER_CONFIG").map(PathBuf::from);
	let settings = Settings::load(config.as_deref()).context("failed to load settings")?;
	settings.validate().context("set OVERSEER_SECRET_KEY or disable csrf_enabled")?;

	let pool = sql::connect_memory().await.context("failed to open database")?;
	sqlx::raw_sql(SCHEMA).execute(&pool).await?;

	let app = Application::new(settings);
	let admin = Admin::builder().app(&app).build()?;

	let authors = SqlTable::reflect(pool.clone(), "author").await?.with_display_field("name");
	admin.register(
		Arc::new(authors),
		ModelAdminOptions::new()
			.list_display(["name", "email"])
			.search_fields(["name", "email"])
			.view(ViewOptions::new().category("Library")),
	)?;
	let books = SqlTable::reflect(pool.clone(), "book").await?.with_display_field("title");
	admin.register(
		Arc::new(books),
		ModelAdminOptions::new()
			.list_display(["title", "published", "author_id"])
			.search_fields(["title"])
			.ordering(SortKey::desc("published"))
			.view(ViewOptions::new().category("Library")),
	)?;

	let notes = DocumentSchema::new("Note")
		.field("title", DocField::string().required().max_length(80))
		.field("body", DocField::string())
		.display_field("title");
	admin.register(
		Arc::new(DocumentBackend::new(DocumentStore::new(), notes)),
		ModelAdminOptions::new().list_display(["title"]),
	)?;

	let publishers = TypedBackend::<Publisher>::new();
	publishers.create(Publisher {
		id: 0,
		name: "Acme Press".to_string(),
		active: true,
	})?;
	admin.register(Arc::new(publishers), ModelAdminOptions::new())?;

	let addr: SocketAddr = std::env::var("OVERSEER_ADDR")
		.unwrap_or_else(|_| "127.0.0.1:8000".to_string())
		.parse()
		.context("OVERSEER_ADDR is not a socket address")?;
	tracing::info!(admin = %admin.url(), "Admin ready");
	serve(addr, Arc::new(app)).await
}
