//! Model-admin screens over typed Rust models

use overseer_admin::{Admin, AdminView, ModelAdminOptions};
use overseer_apps::{Application, Settings};
use overseer_db::typed::{Model, TypedBackend, TypedField};
use overseer_db::{ModelBackend, SortKey};
use overseer_forms::FieldKind;
use overseer_test::TestClient;
use rstest::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Person {
	#[serde(default)]
	id: i64,
	name: String,
	age: i64,
}

impl Model for Person {
	const MODEL_NAME: &'static str = "Person";

	fn fields() -> Vec<TypedField> {
		vec![
			TypedField::auto("id"),
			TypedField::char("name", 255).required(),
			TypedField::integer("age").required(),
		]
	}

	fn label(&self) -> Option<String> {
		Some(self.name.clone())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pet {
	#[serde(default)]
	id: i64,
	name: String,
	#[serde(default)]
	owner: Option<i64>,
}

impl Model for Pet {
	const MODEL_NAME: &'static str = "Pet";

	fn fields() -> Vec<TypedField> {
		vec![
			TypedField::auto("id"),
			TypedField::char("name", 50).required(),
			TypedField::foreign_key("owner", "Person"),
		]
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Shipment {
	#[serde(default)]
	id: i64,
	weight: i64,
}

impl Model for Shipment {
	const MODEL_NAME: &'static str = "Shipment";

	fn fields() -> Vec<TypedField> {
		vec![TypedField::auto("id"), TypedField::integer("weight")]
	}
}

#[fixture]
fn app() -> Application {
	Application::new(Settings::default().without_csrf())
}

fn person(name: &str, age: i64) -> Person {
	Person {
		id: 0,
		name: name.to_string(),
		age,
	}
}

#[rstest]
#[tokio::test]
async fn test_model_crud(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let people = Arc::new(TypedBackend::<Person>::new());
	let view = admin
		.register(people.clone(), ModelAdminOptions::new())
		.unwrap();
	let client = TestClient::new(app);
	let form = view.form().await.unwrap();
	assert_eq!(form.field("name").unwrap().kind, FieldKind::TextLine);
	assert_eq!(form.field("age").unwrap().kind, FieldKind::Integer);
	assert_eq!(view.base().endpoint(), Some("person"));

	// Act & Assert: create
	let response = client
		.post_form("/admin/person/add/", &[("name", "test1large"), ("age", "0")])
		.await;
	assert_eq!(response.status_code(), 302);
	let created = people.find(1).unwrap();
	assert_eq!((created.name.as_str(), created.age), ("test1large", 0));

	// Act & Assert: list shows the label, edit shows the values
	let list = client.get("/admin/person/").await;
	assert!(list.contains("<td>test1large</td>"));
	assert!(list.contains(r#"href="/admin/person/1/""#));
	let edit = client.get("/admin/person/1/").await;
	assert!(edit.contains(r#"<input class="" id="name" name="name" type="text" value="test1large">"#));

	// Act & Assert: update
	let response = client
		.post_form("/admin/person/1/", &[("name", "test1small"), ("age", "40")])
		.await;
	assert_eq!(response.status_code(), 302);
	assert_eq!(people.find(1).unwrap().age, 40);

	// Act & Assert: delete
	let response = client.post_form("/admin/person/1/delete/", &[("confirm_delete", "")]).await;
	assert_eq!(response.status_code(), 200);
	assert_eq!(people.count().await.unwrap(), 1);
	let response = client
		.post_form("/admin/person/1/delete/", &[("confirm_delete", "on")])
		.await;
	assert_eq!(response.status_code(), 302);
	assert!(people.all().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_ordering_option_applies_without_sort(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let people = Arc::new(TypedBackend::<Person>::new());
	for (name, age) in [("John", 18), ("Michael", 21), ("Steve", 15), ("Ron", 59)] {
		people.create(person(name, age)).unwrap();
	}
	admin
		.register(
			people,
			ModelAdminOptions::new()
				.list_display(["name", "age"])
				.ordering(SortKey::desc("age"))
				.list_per_page(2),
		)
		.unwrap();
	let client = TestClient::new(app);

	// Act
	let default_sort = client.get("/admin/person/").await;
	let explicit_sort = client.get("/admin/person/?sort=name").await;

	// Assert
	let ron = default_sort.text().find("<td>Ron</td>").unwrap();
	let michael = default_sort.text().find("<td>Michael</td>").unwrap();
	assert!(ron < michael);
	assert!(!default_sort.contains("<td>John</td>"));
	assert!(default_sort.contains(r#"<th class="desc">"#));
	assert!(explicit_sort.contains("<td>John</td>"));
	assert!(explicit_sort.contains("<td>Michael</td>"));
	assert!(!explicit_sort.contains("<td>Ron</td>"));
}

#[rstest]
#[tokio::test]
async fn test_foreign_key_select_and_link(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let people = Arc::new(TypedBackend::<Person>::new());
	let pets = Arc::new(TypedBackend::<Pet>::new());
	let owner = people.create(person("Stan", 10)).unwrap();
	admin.register(people, ModelAdminOptions::new()).unwrap();
	admin
		.register(pets.clone(), ModelAdminOptions::new().list_display(["name", "owner"]))
		.unwrap();
	let client = TestClient::new(app);

	// Act
	let add = client.get("/admin/pet/add/").await;
	let created = client
		.post_form("/admin/pet/add/", &[("name", "Sparky"), ("owner", owner.to_string().as_str())])
		.await;
	let orphan = client
		.post_form("/admin/pet/add/", &[("name", "Stray"), ("owner", "")])
		.await;
	let list = client.get("/admin/pet/").await;

	// Assert
	assert!(add.contains(&format!(r#"<option value="{}">Stan</option>"#, owner)));
	assert_eq!(created.status_code(), 302);
	assert_eq!(orphan.status_code(), 302);
	assert_eq!(pets.find(1).unwrap().owner, Some(owner));
	assert_eq!(pets.find(2).unwrap().owner, None);
	assert!(list.contains(&format!(r#"<a href="/admin/person/{}/">Stan</a>"#, owner)));
}

#[rstest]
#[tokio::test]
async fn test_blank_optional_field_on_plain_member_redisplays_form(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let shipments = Arc::new(TypedBackend::<Shipment>::new());
	shipments.create(Shipment { id: 0, weight: 7 }).unwrap();
	admin.register(shipments.clone(), ModelAdminOptions::new()).unwrap();
	let client = TestClient::new(app);

	// Act
	let created = client.post_form("/admin/shipment/add/", &[("weight", "")]).await;
	let edited = client.post_form("/admin/shipment/1/", &[("weight", "")]).await;

	// Assert
	assert_eq!(created.status_code(), 200);
	assert!(created.contains("This field is required."));
	assert_eq!(edited.status_code(), 200);
	assert!(edited.contains("This field is required."));
	assert_eq!(shipments.count().await.unwrap(), 1);
	assert_eq!(shipments.find(1).unwrap().weight, 7);
}

#[rstest]
fn test_model_without_primary_key_rejected() {
	// Arrange
	#[derive(Debug, Clone, Serialize, Deserialize)]
	struct Tag {
		label: String,
	}

	impl Model for Tag {
		const MODEL_NAME: &'static str = "Tag";

		fn fields() -> Vec<TypedField> {
			vec![TypedField::char("label", 20)]
		}
	}

	let admin = Admin::new().unwrap();

	// Act
	let result = admin.register(Arc::new(TypedBackend::<Tag>::new()), ModelAdminOptions::new());

	// Assert
	assert!(result.is_err());
	assert_eq!(admin.views().len(), 1);
}
