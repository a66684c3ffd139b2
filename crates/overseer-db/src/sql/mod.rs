//! Relational backend over SQLite
//!
//! The schema is reflected from the live table, so the admin always matches
//! what the database holds. Statements are built with sea-query and run
//! through the sqlx pool.

mod convert;
mod reflect;

use crate::backend::{ModelBackend, Record, pk_to_string};
use crate::error::{DbError, DbResult};
use crate::query::{ListQuery, Page, Search};
use crate::schema::{FieldKind, ModelSchema};
use async_trait::async_trait;
use convert::{case_insensitive_glob, decode_row, to_sea_value};
use reflect::{SqlColumn, reflect_table};
use sea_query::{
	Alias, Asterisk, Condition, Expr, ExprTrait, Order, Query as SeaQuery, SqliteQueryBuilder,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Largest LIMIT or OFFSET SQLite accepts
const MAX_ROWS: u64 = i64::MAX as u64;

/// Open a private in-memory database with foreign keys enforced
///
/// The pool keeps its single connection for its whole lifetime, since every
/// new connection to `sqlite::memory:` opens an empty database.
pub async fn connect_memory() -> DbResult<SqlitePool> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;
	Ok(pool)
}

/// A SQLite table exposed as a model
///
/// # Examples
///
/// ```no_run
/// # async fn example(pool: sqlx::SqlitePool) -> overseer_db::DbResult<()> {
/// use overseer_db::ModelBackend;
/// use overseer_db::sql::SqlTable;
///
/// let people = SqlTable::reflect(pool, "person").await?.with_display_field("name");
/// assert_eq!(people.schema().name, "Person");
/// # Ok(())
/// # }
/// ```
pub struct SqlTable {
	pool: SqlitePool,
	table: String,
	schema: ModelSchema,
	columns: Vec<SqlColumn>,
}

impl SqlTable {
	/// Reflect `table` from the database behind `pool`
	pub async fn reflect(pool: SqlitePool, table: impl Into<String>) -> DbResult<Self> {
		let table = table.into();
		let (schema, columns) = reflect_table(&pool, &table).await?;
		tracing::info!(table = %table, model = %schema.name, fields = schema.fields.len(), "Reflected table");
		Ok(Self {
			pool,
			table,
			schema,
			columns,
		})
	}

	/// Override the model name derived from the table name
	pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
		self.schema.name = name.into();
		self
	}

	/// Column whose value labels a record
	pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
		self.schema.display_field = Some(field.into());
		self
	}

	pub fn table_name(&self) -> &str {
		&self.table
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	fn column(&self, name: &str) -> Option<&SqlColumn> {
		self.columns.iter().find(|c| c.name == name)
	}

	fn pk_column(&self) -> DbResult<&SqlColumn> {
		let pk = self.schema.primary_key()?;
		self.column(&pk.name)
			.ok_or_else(|| DbError::Schema(format!("Primary key column '{}' missing", pk.name)))
	}

	fn pk_condition(&self, pk: &str) -> DbResult<sea_query::SimpleExpr> {
		let column = self.pk_column()?;
		let value = to_sea_value(column, Value::String(pk.to_string()));
		Ok(Expr::col(Alias::new(&column.name)).eq(value))
	}

	fn search_condition(&self, search: &Search) -> Condition {
		let pattern = case_insensitive_glob(&search.term);
		search
			.fields
			.iter()
			.filter(|f| self.column(f).is_some())
			.fold(Condition::any(), |cond, field| {
				let column = format!("\"{}\"", field.replace('"', "\"\""));
				cond.add(Expr::cust_with_values(
					format!("{} GLOB ?", column),
					[pattern.clone()],
				))
			})
	}

	/// Columns of `values` that exist in the table, converted for storage
	fn assignments(&self, values: Record, skip_pk: bool) -> DbResult<Vec<(Alias, sea_query::Value)>> {
		let pk_name = self.schema.primary_key().ok().map(|pk| pk.name.clone());
		let mut assignments = Vec::with_capacity(values.len());
		for (key, value) in values {
			if skip_pk && pk_name.as_deref() == Some(key.as_str()) {
				continue;
			}
			let column = self
				.column(&key)
				.ok_or_else(|| DbError::invalid_value(&key, format!("no such column in '{}'", self.table)))?;
			assignments.push((Alias::new(&key), to_sea_value(column, value)));
		}
		Ok(assignments)
	}

	async fn fetch_records(&self, sql: &str) -> DbResult<Vec<Record>> {
		tracing::debug!(sql, "Fetching records");
		let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
		let kinds: Vec<&FieldKind> = self.schema.fields.iter().map(|f| &f.kind).collect();
		Ok(rows
			.iter()
			.map(|row| decode_row(row, &self.columns, &kinds))
			.collect())
	}

	async fn fetch_count(&self, sql: &str) -> DbResult<u64> {
		let total: i64 = sqlx::query(sql).fetch_one(&self.pool).await?.try_get(0)?;
		Ok(Ord::max(total, 0) as u64)
	}

	// Statements are rendered to strings before any `.await`, so no sea-query
	// value is held across a suspension point.

	fn list_sql(&self, query: &ListQuery) -> (String, String) {
		let mut select = SeaQuery::select()
			.from(Alias::new(&self.table))
			.column(Asterisk)
			.to_owned();
		let mut count = SeaQuery::select()
			.from(Alias::new(&self.table))
			.expr(Expr::cust("COUNT(*)"))
			.to_owned();

		if let Some(search) = &query.search
			&& search.fields.iter().any(|f| self.column(f).is_some())
		{
			let condition = self.search_condition(search);
			select.cond_where(condition.clone());
			count.cond_where(condition);
		}

		let pk = self.schema.primary_key().ok().map(|f| f.name.clone());
		if let Some(sort) = &query.sort {
			let order = if sort.descending { Order::Desc } else { Order::Asc };
			select.order_by(Alias::new(&sort.field), order);
		}
		if let Some(pk) = &pk
			&& query.sort.as_ref().is_none_or(|s| &s.field != pk)
		{
			select.order_by(Alias::new(pk), Order::Asc);
		}

		if query.limit.is_some() || query.offset > 0 {
			// SQLite rejects LIMIT and OFFSET values beyond i64
			let limit = query.limit.map_or(MAX_ROWS, |l| Ord::min(l as u64, MAX_ROWS));
			let offset = Ord::min(query.offset as u64, MAX_ROWS);
			select.limit(limit).offset(offset);
		}

		(
			select.to_string(SqliteQueryBuilder),
			count.to_string(SqliteQueryBuilder),
		)
	}

	fn get_sql(&self, pk: &str) -> DbResult<String> {
		Ok(SeaQuery::select()
			.from(Alias::new(&self.table))
			.column(Asterisk)
			.and_where(self.pk_condition(pk)?)
			.limit(1)
			.to_string(SqliteQueryBuilder))
	}

	fn insert_sql(&self, assignments: Vec<(Alias, sea_query::Value)>) -> DbResult<String> {
		let mut insert = SeaQuery::insert()
			.into_table(Alias::new(&self.table))
			.to_owned();
		if assignments.is_empty() {
			insert.or_default_values();
		} else {
			let (columns, values): (Vec<Alias>, Vec<sea_query::Value>) = assignments.into_iter().unzip();
			let exprs: Vec<sea_query::SimpleExpr> = values.into_iter().map(Into::into).collect();
			insert
				.columns(columns)
				.values(exprs)
				.map_err(|e| DbError::Database(e.to_string()))?;
		}
		Ok(insert.to_string(SqliteQueryBuilder))
	}

	fn update_sql(&self, pk: &str, assignments: Vec<(Alias, sea_query::Value)>) -> DbResult<String> {
		let mut update = SeaQuery::update().table(Alias::new(&self.table)).to_owned();
		for (column, value) in assignments {
			update.value(column, value);
		}
		update.and_where(self.pk_condition(pk)?);
		Ok(update.to_string(SqliteQueryBuilder))
	}

	fn delete_sql(&self, pk: &str) -> DbResult<String> {
		Ok(SeaQuery::delete()
			.from_table(Alias::new(&self.table))
			.and_where(self.pk_condition(pk)?)
			.to_string(SqliteQueryBuilder))
	}

	fn count_sql(&self) -> String {
		SeaQuery::select()
			.from(Alias::new(&self.table))
			.expr(Expr::cust("COUNT(*)"))
			.to_string(SqliteQueryBuilder)
	}
}

#[async_trait]
impl ModelBackend for SqlTable {
	fn schema(&self) -> &ModelSchema {
		&self.schema
	}

	async fn list(&self, query: &ListQuery) -> DbResult<Page> {
		let (select_sql, count_sql) = self.list_sql(query);
		let records = self.fetch_records(&select_sql).await?;
		let total = self.fetch_count(&count_sql).await?;
		Ok(Page { records, total })
	}

	async fn get(&self, pk: &str) -> DbResult<Option<Record>> {
		let sql = self.get_sql(pk)?;
		Ok(self.fetch_records(&sql).await?.into_iter().next())
	}

	async fn insert(&self, values: Record) -> DbResult<String> {
		let pk_name = self.schema.primary_key()?.name.clone();
		let explicit_pk = values
			.get(&pk_name)
			.filter(|v| !v.is_null())
			.map(pk_to_string);
		let sql = {
			let assignments = self.assignments(values, explicit_pk.is_none())?;
			self.insert_sql(assignments)?
		};

		tracing::debug!(sql = %sql, "Inserting record");
		let result = sqlx::query(&sql).execute(&self.pool).await?;
		Ok(explicit_pk.unwrap_or_else(|| result.last_insert_rowid().to_string()))
	}

	async fn update(&self, pk: &str, values: Record) -> DbResult<bool> {
		let sql = {
			let assignments = self.assignments(values, true)?;
			if assignments.is_empty() {
				None
			} else {
				Some(self.update_sql(pk, assignments)?)
			}
		};
		let Some(sql) = sql else {
			return Ok(self.get(pk).await?.is_some());
		};

		tracing::debug!(sql = %sql, "Updating record");
		let result = sqlx::query(&sql).execute(&self.pool).await?;
		Ok(result.rows_affected() > 0)
	}

	async fn delete(&self, pk: &str) -> DbResult<bool> {
		let sql = self.delete_sql(pk)?;
		tracing::debug!(sql = %sql, "Deleting record");
		let result = sqlx::query(&sql).execute(&self.pool).await?;
		Ok(result.rows_affected() > 0)
	}

	async fn count(&self) -> DbResult<u64> {
		let sql = self.count_sql();
		self.fetch_count(&sql).await
	}
}
