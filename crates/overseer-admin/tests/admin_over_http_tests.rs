//! The admin served over a real socket

use overseer_admin::{Admin, ModelAdminOptions, ViewOptions};
use overseer_apps::{Application, Settings};
use overseer_db::document::{DocField, DocumentBackend, DocumentSchema, DocumentStore};
use overseer_server::HttpServer;
use rstest::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Application whose only handle on the admin is through its mounts
#[fixture]
fn app() -> Application {
	let app = Application::new(Settings::default().without_csrf());
	let admin = Admin::builder().app(&app).build().unwrap();
	let schema = DocumentSchema::new("Note")
		.field("title", DocField::string().required())
		.display_field("title");
	admin
		.register(
			Arc::new(DocumentBackend::new(DocumentStore::new(), schema)),
			ModelAdminOptions::new().view(ViewOptions::new().category("Content")),
		)
		.unwrap();
	app
}

async fn start(app: Application) -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(HttpServer::new(Arc::new(app)).serve(listener));
	addr
}

async fn send(addr: SocketAddr, raw: String) -> String {
	let mut stream = TcpStream::connect(addr).await.unwrap();
	stream.write_all(raw.as_bytes()).await.unwrap();
	let mut buf = Vec::new();
	stream.read_to_end(&mut buf).await.unwrap();
	String::from_utf8_lossy(&buf).into_owned()
}

fn get(path: &str) -> String {
	format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path)
}

fn post(path: &str, body: &str) -> String {
	format!(
		"POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
		path,
		body.len(),
		body
	)
}

#[rstest]
#[tokio::test]
async fn test_index_lists_menu(app: Application) {
	// Arrange
	let addr = start(app).await;

	// Act
	let response = send(addr, get("/admin/")).await;

	// Assert
	assert!(response.starts_with("HTTP/1.1 200 OK"));
	assert!(response.contains("Content"));
	assert!(response.contains(r#"<a href="/admin/note/">Note</a>"#));
}

#[rstest]
#[tokio::test]
async fn test_create_then_list(app: Application) {
	// Arrange
	let addr = start(app).await;

	// Act
	let created = send(addr, post("/admin/note/add/", "title=Groceries")).await;
	let list = send(addr, get("/admin/note/")).await;

	// Assert
	assert!(created.starts_with("HTTP/1.1 302"));
	assert!(created.to_ascii_lowercase().contains("location: /admin/note/"));
	assert!(list.contains("<td>Groceries</td>"));
}

#[rstest]
#[tokio::test]
async fn test_invalid_submission_rerenders(app: Application) {
	// Arrange
	let addr = start(app).await;

	// Act
	let response = send(addr, post("/admin/note/add/", "title=")).await;

	// Assert
	assert!(response.starts_with("HTTP/1.1 200 OK"));
	assert!(response.contains("This field is required."));
}

#[rstest]
#[tokio::test]
async fn test_unknown_path_is_not_found(app: Application) {
	// Arrange
	let addr = start(app).await;

	// Act
	let response = send(addr, get("/nowhere/")).await;

	// Assert
	assert!(response.starts_with("HTTP/1.1 404"));
}
