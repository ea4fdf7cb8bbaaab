//! Field model shared by the in-memory processor and the SQL pipeline.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Natural order between two non-null values. `None` when the values are
    /// of unrelated kinds, or a float comparison involves NaN.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Text(a), Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Bind value for the SQL pipeline. Nulls are never bound; predicates on
    /// null render as `IS NULL` / `IS NOT NULL`.
    pub fn to_sql_value(&self) -> Option<sea_orm::Value> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone().into()),
            FieldValue::Integer(i) => Some((*i).into()),
            FieldValue::Float(f) => Some((*f).into()),
            FieldValue::Boolean(b) => Some((*b).into()),
            FieldValue::Timestamp(t) => Some((*t).into()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// One listable field of an entity and what callers may do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Name used in requests.
    pub name: &'static str,
    /// Column in the entity's table.
    pub column: &'static str,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
    pub searchable: bool,
}

impl FieldDef {
    /// Filterable and sortable, not searchable.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: name,
            kind,
            filterable: true,
            sortable: true,
            searchable: false,
        }
    }

    pub const fn searchable(self) -> Self {
        Self {
            searchable: true,
            ..self
        }
    }

    pub const fn unsortable(self) -> Self {
        Self {
            sortable: false,
            ..self
        }
    }
}

/// How soft-deleted rows are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDelete {
    /// Visible while the timestamp field is null.
    DeletedAt(&'static str),
    /// Visible while the boolean field is true.
    ActiveFlag(&'static str),
}

#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub id_field: &'static str,
    pub created_field: &'static str,
    pub fields: &'static [FieldDef],
    pub soft_delete: Option<SoftDelete>,
}

impl EntitySchema {
    pub fn field(&'static self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field definition by name. Schemas are static, so a missing id or
    /// created field is a programming error caught by the schema tests.
    pub(crate) fn required_field(&'static self, name: &str) -> &'static FieldDef {
        match self.field(name) {
            Some(f) => f,
            None => panic!("schema {} has no field {}", self.entity, name),
        }
    }

    pub fn id(&'static self) -> &'static FieldDef {
        self.required_field(self.id_field)
    }

    pub fn created(&'static self) -> &'static FieldDef {
        self.required_field(self.created_field)
    }

    pub fn searchable_fields(&'static self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.searchable)
    }
}

/// An entity exposed through a list endpoint.
pub trait ListEntity: Clone + Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    fn id(&self) -> &str;

    /// Value of the named field; unknown names yield `Null`.
    fn field_value(&self, field: &str) -> FieldValue;

    /// Hidden items (soft-deleted or inactive) never appear in a list.
    fn is_visible(&self) -> bool {
        match Self::schema().soft_delete {
            None => true,
            Some(SoftDelete::DeletedAt(field)) => self.field_value(field).is_null(),
            Some(SoftDelete::ActiveFlag(field)) => {
                matches!(self.field_value(field), FieldValue::Boolean(true))
            }
        }
    }
}
