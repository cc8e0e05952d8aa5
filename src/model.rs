//! Active-record style model trait.
//!
//! Implementations supply table metadata and row conversions; the provided
//! methods cover the CRUD lifecycle. `save` dispatches on the primary key:
//! a set key issues an UPDATE, an unset key an INSERT (writing the new
//! rowid back for auto-increment keys). Implementations are usually emitted
//! by [`crate::codegen`], but writing one by hand is equally supported.

use crate::db::{Bmdb, Select};
use crate::error::{Error, Result};
use crate::schema::{Field, TableSpec};
use crate::value::{Row, Value};

pub trait Model: Sized {
    /// Table backing this model.
    fn table_name() -> &'static str;

    /// Column definitions, in declaration order.
    fn fields() -> Vec<Field>;

    /// Current field values, in declaration order.
    fn values(&self) -> Vec<(String, Value)>;

    /// Rebuild a model from a marshalled row.
    fn from_row(row: &Row) -> Result<Self>;

    /// The primary key value, if the field is set.
    fn primary_key_value(&self) -> Option<Value>;

    /// Called after an auto-increment insert with the new rowid.
    fn set_rowid(&mut self, _id: i64) {}

    /// The declared primary key field, if any.
    fn primary_key_field() -> Option<Field> {
        Self::fields().into_iter().find(|f| f.primary_key)
    }

    /// Create the backing table if it does not exist.
    fn create_table(db: &Bmdb) -> Result<()> {
        let spec = TableSpec::new(Self::table_name(), Self::fields());
        db.execute(&spec.create_sql()?, &[])?;
        Ok(())
    }

    /// Persist this record: UPDATE when the primary key is set, INSERT
    /// otherwise. Null fields are skipped so column defaults apply.
    fn save(&mut self, db: &Bmdb) -> Result<()> {
        let data: Vec<(String, Value)> = self
            .values()
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect();

        let pk = Self::primary_key_field();
        if let (Some(pk), Some(pk_value)) = (&pk, self.primary_key_value()) {
            db.update(
                Self::table_name(),
                &data,
                &format!("{} = ?", pk.name),
                &[pk_value],
            )?;
            return Ok(());
        }

        let rowid = db.insert(Self::table_name(), &data)?;
        if pk.map(|f| f.auto_increment).unwrap_or(false) {
            self.set_rowid(rowid);
        }
        Ok(())
    }

    /// Fetch a single record matching `column = value`.
    fn get(db: &Bmdb, column: &str, value: Value) -> Result<Option<Self>> {
        let rows = db.select(
            Self::table_name(),
            &Select {
                filter: Some(format!("{column} = ?")),
                params: vec![value],
                limit: Some(1),
                ..Default::default()
            },
        )?;
        rows.first().map(Self::from_row).transpose()
    }

    /// Fetch all records.
    fn all(db: &Bmdb) -> Result<Vec<Self>> {
        let rows = db.select(Self::table_name(), &Select::default())?;
        rows.iter().map(Self::from_row).collect()
    }

    /// Fetch records matching an arbitrary condition.
    fn find(db: &Bmdb, condition: &str, params: Vec<Value>) -> Result<Vec<Self>> {
        let rows = db.select(
            Self::table_name(),
            &Select {
                filter: Some(condition.to_string()),
                params,
                ..Default::default()
            },
        )?;
        rows.iter().map(Self::from_row).collect()
    }

    /// Delete this record. Requires a primary key field with a set value.
    fn delete(&self, db: &Bmdb) -> Result<()> {
        let pk = Self::primary_key_field().ok_or(Error::NoPrimaryKey(Self::table_name()))?;
        let pk_value = self
            .primary_key_value()
            .ok_or(Error::MissingPrimaryKey(Self::table_name()))?;
        db.delete(Self::table_name(), &format!("{} = ?", pk.name), &[pk_value])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Note {
        id: Option<i64>,
        body: Option<String>,
    }

    impl Model for Note {
        fn table_name() -> &'static str {
            "notes"
        }

        fn fields() -> Vec<Field> {
            vec![
                Field::new("id", DataType::Integer)
                    .primary_key()
                    .auto_increment(),
                Field::new("body", DataType::Text).not_null(),
            ]
        }

        fn values(&self) -> Vec<(String, Value)> {
            vec![
                ("id".to_string(), Value::from(self.id)),
                ("body".to_string(), Value::from(self.body.clone())),
            ]
        }

        fn from_row(row: &Row) -> Result<Self> {
            Ok(Self {
                id: row.get_i64("id")?,
                body: row.get_text("body")?,
            })
        }

        fn primary_key_value(&self) -> Option<Value> {
            self.id.map(Value::Integer)
        }

        fn set_rowid(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    fn note_db() -> Bmdb {
        let db = Bmdb::open_in_memory().unwrap();
        Note::create_table(&db).unwrap();
        db
    }

    #[test]
    fn save_assigns_rowid_on_insert() {
        let db = note_db();
        let mut note = Note {
            id: None,
            body: Some("first".to_string()),
        };
        note.save(&db).unwrap();
        assert_eq!(note.id, Some(1));
    }

    #[test]
    fn save_updates_when_key_is_set() {
        let db = note_db();
        let mut note = Note {
            id: None,
            body: Some("first".to_string()),
        };
        note.save(&db).unwrap();

        note.body = Some("edited".to_string());
        note.save(&db).unwrap();

        let all = Note::all(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].body.as_deref(), Some("edited"));
    }

    #[test]
    fn save_with_stale_key_updates_nothing() {
        let db = note_db();
        let mut ghost = Note {
            id: Some(999),
            body: Some("never inserted".to_string()),
        };
        // The key is set, so this issues an UPDATE matching no rows.
        ghost.save(&db).unwrap();
        assert!(Note::all(&db).unwrap().is_empty());
        assert_eq!(ghost.id, Some(999));
    }

    #[test]
    fn get_and_find() {
        let db = note_db();
        for body in ["alpha", "beta", "beta"] {
            let mut note = Note {
                id: None,
                body: Some(body.to_string()),
            };
            note.save(&db).unwrap();
        }

        let one = Note::get(&db, "body", Value::from("alpha")).unwrap();
        assert!(one.is_some());

        let none = Note::get(&db, "body", Value::from("gamma")).unwrap();
        assert!(none.is_none());

        let betas = Note::find(&db, "body = ?", vec![Value::from("beta")]).unwrap();
        assert_eq!(betas.len(), 2);
    }

    #[test]
    fn delete_requires_saved_key() {
        let db = note_db();
        let unsaved = Note {
            id: None,
            body: Some("draft".to_string()),
        };
        let err = unsaved.delete(&db).unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey("notes")));

        let mut saved = Note {
            id: None,
            body: Some("kept".to_string()),
        };
        saved.save(&db).unwrap();
        saved.delete(&db).unwrap();
        assert!(Note::all(&db).unwrap().is_empty());
    }
}
