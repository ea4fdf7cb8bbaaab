//! Conjunctive field predicates.
//!
//! Clauses are resolved against the entity schema once, up front. Unknown
//! fields, operators that do not fit the field kind and values that cannot
//! be coerced are rejected there, so neither backend ever sees them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::field::{EntitySchema, FieldDef, FieldKind, FieldValue, ListEntity};
use super::request::FilterClause;
use crate::shared::{ListResult, QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring, text fields only.
    Contains,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(FieldValue),
    List(Vec<FieldValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub field: &'static FieldDef,
    pub op: FilterOperator,
    pub operand: Operand,
}

impl FilterPredicate {
    pub fn matches(&self, value: &FieldValue) -> bool {
        match (&self.op, &self.operand) {
            (FilterOperator::Eq, Operand::Value(FieldValue::Null)) => value.is_null(),
            (FilterOperator::Ne, Operand::Value(FieldValue::Null)) => !value.is_null(),
            _ if value.is_null() => false,
            (FilterOperator::Contains, Operand::Value(FieldValue::Text(needle))) => value
                .as_text()
                .map(|hay| {
                    hay.to_ascii_lowercase()
                        .contains(&needle.to_ascii_lowercase())
                })
                .unwrap_or(false),
            (FilterOperator::In, Operand::List(values)) => values
                .iter()
                .any(|v| value.compare(v) == Some(Ordering::Equal)),
            (op, Operand::Value(expected)) => match value.compare(expected) {
                Some(ord) => match op {
                    FilterOperator::Eq => ord == Ordering::Equal,
                    FilterOperator::Ne => ord != Ordering::Equal,
                    FilterOperator::Gt => ord == Ordering::Greater,
                    FilterOperator::Gte => ord != Ordering::Less,
                    FilterOperator::Lt => ord == Ordering::Less,
                    FilterOperator::Lte => ord != Ordering::Greater,
                    FilterOperator::Contains | FilterOperator::In => false,
                },
                None => false,
            },
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<FilterPredicate>,
}

impl FilterSet {
    pub fn resolve(schema: &'static EntitySchema, clauses: &[FilterClause]) -> ListResult<Self> {
        let predicates = clauses
            .iter()
            .map(|clause| resolve_clause(schema, clause))
            .collect::<ListResult<Vec<_>>>()?;
        Ok(Self { predicates })
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True iff every predicate matches. An empty set matches everything.
    pub fn matches<T: ListEntity>(&self, item: &T) -> bool {
        self.predicates
            .iter()
            .all(|p| p.matches(&item.field_value(p.field.name)))
    }
}

fn resolve_clause(schema: &'static EntitySchema, clause: &FilterClause) -> ListResult<FilterPredicate> {
    let field = schema
        .field(&clause.field)
        .filter(|f| f.filterable)
        .ok_or_else(|| {
            QueryError::validation(format!(
                "filters: unknown field '{}' for {}",
                clause.field, schema.entity
            ))
        })?;

    let operand = match clause.op {
        FilterOperator::In => {
            let Json::Array(items) = &clause.value else {
                return Err(invalid_value(field, "expected an array"));
            };
            let values = items
                .iter()
                .map(|v| match coerce(field, v)? {
                    FieldValue::Null => Err(invalid_value(field, "null is not allowed in 'in'")),
                    other => Ok(other),
                })
                .collect::<ListResult<Vec<_>>>()?;
            Operand::List(values)
        }
        FilterOperator::Contains => {
            if field.kind != FieldKind::Text {
                return Err(QueryError::validation(format!(
                    "filters: 'contains' is only supported on text fields, '{}' is not text",
                    field.name
                )));
            }
            match coerce(field, &clause.value)? {
                FieldValue::Null => return Err(invalid_value(field, "expected a string")),
                v => Operand::Value(v),
            }
        }
        FilterOperator::Eq | FilterOperator::Ne => Operand::Value(coerce(field, &clause.value)?),
        FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
            match coerce(field, &clause.value)? {
                FieldValue::Null => {
                    return Err(invalid_value(field, "null cannot be ordered"));
                }
                v => Operand::Value(v),
            }
        }
    };

    Ok(FilterPredicate {
        field,
        op: clause.op,
        operand,
    })
}

fn coerce(field: &FieldDef, value: &Json) -> ListResult<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }
    let coerced = match field.kind {
        FieldKind::Text => value.as_str().map(|s| FieldValue::Text(s.to_string())),
        FieldKind::Integer => value.as_i64().map(FieldValue::Integer),
        FieldKind::Float => value.as_f64().map(FieldValue::Float),
        FieldKind::Boolean => value.as_bool().map(FieldValue::Boolean),
        FieldKind::Timestamp => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc))),
    };
    coerced.ok_or_else(|| invalid_value(field, format!("cannot use {} as {:?}", value, field.kind)))
}

fn invalid_value(field: &FieldDef, reason: impl std::fmt::Display) -> QueryError {
    QueryError::validation(format!("filters: invalid value for '{}': {}", field.name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Product;
    use serde_json::json;

    fn clause(field: &str, op: FilterOperator, value: Json) -> FilterClause {
        FilterClause {
            field: field.to_string(),
            op,
            value,
        }
    }

    fn resolve(clauses: &[FilterClause]) -> ListResult<FilterSet> {
        FilterSet::resolve(<Product as ListEntity>::schema(), clauses)
    }

    fn lamp() -> Product {
        Product::new("p-1", "Desk Lamp", "LMP-01", 24.5, 7).with_category("Lighting")
    }

    #[test]
    fn empty_set_matches_everything() {
        assert!(resolve(&[]).unwrap().matches(&lamp()));
    }

    #[test]
    fn all_predicates_must_match() {
        let set = resolve(&[
            clause("stock", FilterOperator::Gte, json!(5)),
            clause("price", FilterOperator::Lt, json!(30)),
        ])
        .unwrap();
        assert!(set.matches(&lamp()));

        let set = resolve(&[
            clause("stock", FilterOperator::Gte, json!(5)),
            clause("price", FilterOperator::Gt, json!(30)),
        ])
        .unwrap();
        assert!(!set.matches(&lamp()));
    }

    #[test]
    fn contains_ignores_ascii_case() {
        let set = resolve(&[clause("name", FilterOperator::Contains, json!("LAMP"))]).unwrap();
        assert!(set.matches(&lamp()));
    }

    #[test]
    fn in_list_and_empty_in_list() {
        let set = resolve(&[clause("sku", FilterOperator::In, json!(["X", "LMP-01"]))]).unwrap();
        assert!(set.matches(&lamp()));

        let set = resolve(&[clause("sku", FilterOperator::In, json!([]))]).unwrap();
        assert!(!set.matches(&lamp()));
    }

    #[test]
    fn null_semantics() {
        let mut uncategorized = lamp();
        uncategorized.category = None;

        let is_null = resolve(&[clause("category", FilterOperator::Eq, Json::Null)]).unwrap();
        assert!(is_null.matches(&uncategorized));
        assert!(!is_null.matches(&lamp()));

        // `ne` never matches a missing value.
        let ne = resolve(&[clause("category", FilterOperator::Ne, json!("Garden"))]).unwrap();
        assert!(ne.matches(&lamp()));
        assert!(!ne.matches(&uncategorized));
    }

    #[test]
    fn integer_value_on_float_field_is_coerced() {
        let set = resolve(&[clause("price", FilterOperator::Eq, json!(24.5))]).unwrap();
        assert!(set.matches(&lamp()));
        let set = resolve(&[clause("price", FilterOperator::Gt, json!(24))]).unwrap();
        assert!(set.matches(&lamp()));
    }

    #[test]
    fn timestamp_filters_parse_rfc3339() {
        let set = resolve(&[clause(
            "date_created",
            FilterOperator::Gte,
            json!("2000-01-01T00:00:00Z"),
        )])
        .unwrap();
        assert!(set.matches(&lamp()));
    }

    #[test]
    fn unknown_field_is_rejected_at_construction() {
        let err = resolve(&[clause("colour", FilterOperator::Eq, json!("red"))]).unwrap_err();
        assert!(matches!(err, QueryError::Validation(msg) if msg.contains("colour")));
    }

    #[test]
    fn mismatched_operator_or_value_is_rejected() {
        assert!(resolve(&[clause("stock", FilterOperator::Contains, json!("1"))]).is_err());
        assert!(resolve(&[clause("stock", FilterOperator::Eq, json!("seven"))]).is_err());
        assert!(resolve(&[clause("stock", FilterOperator::In, json!(3))]).is_err());
        assert!(resolve(&[clause("stock", FilterOperator::Gt, Json::Null)]).is_err());
        assert!(resolve(&[clause("date_created", FilterOperator::Lt, json!("yesterday"))]).is_err());
    }
}
