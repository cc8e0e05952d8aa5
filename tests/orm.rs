//! End-to-end exercise of the wrapper, query builder, and model trait
//! against a file-backed database.

use bmdb::{Bmdb, DataType, Field, Model, Order, Result, Row, Value};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Default, PartialEq)]
struct User {
    id: Option<i64>,
    name: Option<String>,
    email: Option<String>,
    age: Option<i64>,
}

impl Model for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn fields() -> Vec<Field> {
        vec![
            Field::new("id", DataType::Integer)
                .primary_key()
                .auto_increment(),
            Field::new("name", DataType::Text).not_null(),
            Field::new("email", DataType::Text).unique(),
            Field::new("age", DataType::Integer),
        ]
    }

    fn values(&self) -> Vec<(String, Value)> {
        vec![
            ("id".to_string(), Value::from(self.id)),
            ("name".to_string(), Value::from(self.name.clone())),
            ("email".to_string(), Value::from(self.email.clone())),
            ("age".to_string(), Value::from(self.age)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_i64("id")?,
            name: row.get_text("name")?,
            email: row.get_text("email")?,
            age: row.get_i64("age")?,
        })
    }

    fn primary_key_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn set_rowid(&mut self, id: i64) {
        self.id = Some(id);
    }
}

fn user(name: &str, email: &str, age: i64) -> User {
    User {
        id: None,
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        age: Some(age),
    }
}

// Keeps the temp file alive alongside the connection.
fn create_temp_db() -> (Bmdb, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Bmdb::open(temp_file.path().to_str().unwrap()).unwrap();
    User::create_table(&db).unwrap();
    (db, temp_file)
}

#[test]
fn model_lifecycle_on_file_backed_db() {
    let (db, _file) = create_temp_db();

    let mut alice = user("Alice", "alice@example.com", 28);
    alice.save(&db).unwrap();
    assert_eq!(alice.id, Some(1));

    let mut bob = user("Bob", "bob@example.com", 35);
    bob.save(&db).unwrap();
    assert_eq!(bob.id, Some(2));

    // Fetch by a non-key column.
    let found = User::get(&db, "email", Value::from("alice@example.com"))
        .unwrap()
        .expect("alice should exist");
    assert_eq!(found.name.as_deref(), Some("Alice"));
    assert_eq!(found.age, Some(28));

    // Saving again with the key set updates in place.
    let mut found = found;
    found.age = Some(29);
    found.save(&db).unwrap();
    let reloaded = User::get(&db, "id", Value::Integer(1)).unwrap().unwrap();
    assert_eq!(reloaded.age, Some(29));
    assert_eq!(User::all(&db).unwrap().len(), 2);

    // Delete through the model.
    bob.delete(&db).unwrap();
    let remaining = User::all(&db).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name.as_deref(), Some("Alice"));
}

#[test]
fn unsaved_model_cannot_be_deleted() {
    let (db, _file) = create_temp_db();
    let draft = user("Draft", "draft@example.com", 1);
    assert!(draft.delete(&db).is_err());
}

#[test]
fn builder_and_model_share_one_table() {
    let (db, _file) = create_temp_db();
    for (name, email, age) in [
        ("Alice", "alice@example.com", 28i64),
        ("Bob", "bob@example.com", 35),
        ("Carol", "carol@other.org", 17),
    ] {
        user(name, email, age).save(&db).unwrap();
    }

    let example_com = db
        .table("users")
        .filter("email LIKE ?", vec![Value::from("%@example.com")])
        .count()
        .unwrap();
    assert_eq!(example_com, 2);

    let oldest = db
        .table("users")
        .order_by("age", Order::Desc)
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(oldest.get_text("name").unwrap(), Some("Bob".into()));

    let minors = User::find(&db, "age < ?", vec![Value::Integer(18)]).unwrap();
    assert_eq!(minors.len(), 1);
    assert_eq!(minors[0].name.as_deref(), Some("Carol"));
}

#[test]
fn data_survives_reopening_the_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();

    {
        let db = Bmdb::open(&path).unwrap();
        User::create_table(&db).unwrap();
        user("Alice", "alice@example.com", 28).save(&db).unwrap();
        db.close().unwrap();
    }

    let db = Bmdb::open(&path).unwrap();
    let users = User::all(&db).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email.as_deref(), Some("alice@example.com"));
}
