//! rstest fixtures for backend tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use overseer_test::sqlite_pool;
//! use rstest::*;
//! use sqlx::SqlitePool;
//!
//! #[rstest]
//! #[tokio::test]
//! async fn test_tables(#[future] sqlite_pool: SqlitePool) {
//!     let pool = sqlite_pool.await;
//!     sqlx::query("CREATE TABLE tag (id INTEGER PRIMARY KEY)").execute(&pool).await.unwrap();
//! }
//! ```

use overseer_db::document::DocumentStore;
use overseer_db::sql;
use rstest::fixture;
use sqlx::SqlitePool;

/// Private in-memory SQLite database with foreign keys enforced
#[fixture]
pub async fn sqlite_pool() -> SqlitePool {
	sql::connect_memory()
		.await
		.expect("Failed to open in-memory SQLite database")
}

/// Empty document store
#[fixture]
pub fn document_store() -> DocumentStore {
	DocumentStore::new()
}
