//! Product domain entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::query::{EntitySchema, FieldDef, FieldKind, FieldValue, ListEntity, SoftDelete};

/// Catalog product
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub date_created: DateTime<Utc>,
    /// Set when the product is soft-deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        price: f64,
        stock: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sku: sku.into(),
            category: None,
            price,
            stock,
            date_created: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.date_created = at;
        self
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

// Searchable fields are scored in declaration order.
static PRODUCT_FIELDS: [FieldDef; 8] = [
    FieldDef::new("id", FieldKind::Text),
    FieldDef::new("name", FieldKind::Text).searchable(),
    FieldDef::new("sku", FieldKind::Text).searchable(),
    FieldDef::new("category", FieldKind::Text).searchable(),
    FieldDef::new("price", FieldKind::Float),
    FieldDef::new("stock", FieldKind::Integer),
    FieldDef::new("date_created", FieldKind::Timestamp),
    FieldDef::new("deleted_at", FieldKind::Timestamp).unsortable(),
];

static PRODUCT_SCHEMA: EntitySchema = EntitySchema {
    entity: "products",
    table: "products",
    id_field: "id",
    created_field: "date_created",
    fields: &PRODUCT_FIELDS,
    soft_delete: Some(SoftDelete::DeletedAt("deleted_at")),
};

impl ListEntity for Product {
    fn schema() -> &'static EntitySchema {
        &PRODUCT_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field_value(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "sku" => self.sku.as_str().into(),
            "category" => self.category.clone().into(),
            "price" => self.price.into(),
            "stock" => self.stock.into(),
            "date_created" => self.date_created.into(),
            "deleted_at" => self.deleted_at.into(),
            _ => FieldValue::Null,
        }
    }
}
