//! User domain entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::query::{EntitySchema, FieldDef, FieldKind, FieldValue, ListEntity, SoftDelete};

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operator,
    #[default]
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    /// Inactive users are hidden from lists.
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role: UserRole::default(),
            is_active: true,
            date_created: Utc::now(),
            last_login_at: None,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.date_created = at;
        self
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

static USER_FIELDS: [FieldDef; 7] = [
    FieldDef::new("id", FieldKind::Text),
    FieldDef::new("username", FieldKind::Text).searchable(),
    FieldDef::new("email", FieldKind::Text).searchable(),
    FieldDef::new("role", FieldKind::Text),
    FieldDef::new("is_active", FieldKind::Boolean).unsortable(),
    FieldDef::new("date_created", FieldKind::Timestamp),
    FieldDef::new("last_login_at", FieldKind::Timestamp),
];

static USER_SCHEMA: EntitySchema = EntitySchema {
    entity: "users",
    table: "users",
    id_field: "id",
    created_field: "date_created",
    fields: &USER_FIELDS,
    soft_delete: Some(SoftDelete::ActiveFlag("is_active")),
};

impl ListEntity for User {
    fn schema() -> &'static EntitySchema {
        &USER_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field_value(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.as_str().into(),
            "username" => self.username.as_str().into(),
            "email" => self.email.as_str().into(),
            "role" => self.role.as_str().into(),
            "is_active" => self.is_active.into(),
            "date_created" => self.date_created.into(),
            "last_login_at" => self.last_login_at.into(),
            _ => FieldValue::Null,
        }
    }
}
