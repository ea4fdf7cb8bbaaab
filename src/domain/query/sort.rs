use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::field::{EntitySchema, FieldDef, FieldValue, ListEntity};
use super::request::SortSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC", alias = "Asc")]
    Asc,
    #[serde(alias = "DESC", alias = "Desc")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortTarget {
    Field(&'static FieldDef),
    /// Search score; only present when a query is active.
    Relevance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortTerm {
    pub target: SortTarget,
    pub direction: SortDirection,
}

/// Resolved ordering. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    terms: Vec<SortTerm>,
}

impl SortOrder {
    /// Unknown and non-sortable fields are dropped. With nothing left the
    /// order is `date_created DESC`, preceded by relevance when searching.
    pub fn resolve(schema: &'static EntitySchema, spec: Option<&SortSpec>, searching: bool) -> Self {
        let mut terms: Vec<SortTerm> = spec
            .map(|s| s.fields.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|sf| {
                schema.field(&sf.field).filter(|f| f.sortable).map(|f| SortTerm {
                    target: SortTarget::Field(f),
                    direction: sf.direction,
                })
            })
            .collect();

        if terms.is_empty() {
            if searching {
                terms.push(SortTerm {
                    target: SortTarget::Relevance,
                    direction: SortDirection::Desc,
                });
            }
            terms.push(SortTerm {
                target: SortTarget::Field(schema.created()),
                direction: SortDirection::Desc,
            });
        }

        Self { terms }
    }

    pub fn terms(&self) -> &[SortTerm] {
        &self.terms
    }

    /// Compares two items (with their search scores) term by term, then by
    /// id ascending. Only items with the same id compare `Equal`.
    pub fn compare<T: ListEntity>(&self, a: &T, a_score: f64, b: &T, b_score: f64) -> Ordering {
        for term in &self.terms {
            let ord = match term.target {
                SortTarget::Relevance => term
                    .direction
                    .apply(a_score.partial_cmp(&b_score).unwrap_or(Ordering::Equal)),
                SortTarget::Field(f) => {
                    compare_values(&a.field_value(f.name), &b.field_value(f.name), term.direction)
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id().cmp(b.id())
    }
}

/// Nulls sort last in either direction.
fn compare_values(a: &FieldValue, b: &FieldValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => direction.apply(a.compare(b).unwrap_or(Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Product;
    use crate::domain::query::request::SortField;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn schema() -> &'static EntitySchema {
        <Product as ListEntity>::schema()
    }

    fn spec(fields: &[(&str, SortDirection)]) -> SortSpec {
        SortSpec {
            fields: fields
                .iter()
                .map(|(f, d)| SortField {
                    field: f.to_string(),
                    direction: *d,
                })
                .collect(),
        }
    }

    fn product(id: &str, name: &str, price: f64, day: u32) -> Product {
        Product::new(id, name, id, price, 1)
            .created_at(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
    }

    fn sorted(order: &SortOrder, mut items: Vec<Product>) -> Vec<String> {
        items.sort_by(|a, b| order.compare(a, 0.0, b, 0.0));
        items.into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn default_is_date_created_desc() {
        let order = SortOrder::resolve(schema(), None, false);
        assert_eq!(order.terms().len(), 1);
        let items = vec![product("a", "x", 1.0, 1), product("b", "x", 1.0, 3), product("c", "x", 1.0, 2)];
        assert_eq!(sorted(&order, items), ["b", "c", "a"]);
    }

    #[test]
    fn unknown_fields_fall_back_to_default() {
        let order = SortOrder::resolve(schema(), Some(&spec(&[("colour", SortDirection::Asc)])), false);
        assert_eq!(order, SortOrder::resolve(schema(), None, false));
    }

    #[test]
    fn searching_without_sort_ranks_by_relevance_first() {
        let order = SortOrder::resolve(schema(), None, true);
        assert_eq!(order.terms()[0].target, SortTarget::Relevance);

        let a = product("a", "x", 1.0, 5);
        let b = product("b", "x", 1.0, 1);
        assert_eq!(order.compare(&a, 1.0, &b, 3.0), Ordering::Greater);
        assert_eq!(order.compare(&a, 3.0, &b, 3.0), Ordering::Less);
    }

    #[test]
    fn later_fields_break_ties() {
        let order = SortOrder::resolve(
            schema(),
            Some(&spec(&[("price", SortDirection::Asc), ("name", SortDirection::Desc)])),
            false,
        );
        let items = vec![
            product("a", "apple", 2.0, 1),
            product("b", "pear", 1.0, 1),
            product("c", "zucchini", 2.0, 1),
        ];
        assert_eq!(sorted(&order, items), ["b", "c", "a"]);
    }

    #[test]
    fn equal_items_fall_back_to_id() {
        let order = SortOrder::resolve(schema(), Some(&spec(&[("price", SortDirection::Asc)])), false);
        let items = vec![
            product("d", "x", 1.0, 1),
            product("a", "x", 1.0, 1),
            product("c", "x", 0.5, 1),
            product("b", "x", 1.0, 1),
        ];
        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(sorted(&order, items), ["c", "a", "b", "d"]);
        assert_eq!(sorted(&order, reversed), ["c", "a", "b", "d"]);
    }

    fn arb_products() -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec((0u8..4, prop::option::of(0u8..3), 1u32..4), 0..24).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (price, category, day))| {
                    let p = product(&format!("p-{:02}", i), "x", price as f64, day);
                    match category {
                        Some(c) => p.with_category(format!("c{}", c)),
                        None => p,
                    }
                })
                .collect()
        })
    }

    fn arb_direction() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
    }

    proptest! {
        #[test]
        fn order_does_not_depend_on_input_order(
            items in arb_products(),
            seed in any::<u64>(),
            field in prop_oneof![Just("price"), Just("category"), Just("date_created")],
            direction in arb_direction(),
        ) {
            let order = SortOrder::resolve(schema(), Some(&spec(&[(field, direction)])), false);
            let mut shuffled = items.clone();
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left((seed % len as u64) as usize);
            }
            shuffled.reverse();

            prop_assert_eq!(sorted(&order, items), sorted(&order, shuffled));
        }

        #[test]
        fn equal_keys_stay_in_id_order(items in arb_products(), direction in arb_direction()) {
            let order = SortOrder::resolve(schema(), Some(&spec(&[("price", direction)])), false);
            let mut sorted_items = items;
            sorted_items.sort_by(|a, b| order.compare(a, 0.0, b, 0.0));

            for pair in sorted_items.windows(2) {
                let by_price = pair[0].price.partial_cmp(&pair[1].price).unwrap();
                match direction {
                    SortDirection::Asc => {
                        prop_assert_ne!(by_price, Ordering::Greater);
                    }
                    SortDirection::Desc => {
                        prop_assert_ne!(by_price, Ordering::Less);
                    }
                }
                if by_price == Ordering::Equal {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
        }
    }

    #[test]
    fn nulls_sort_last_both_ways() {
        let with = |id: &str, cat: Option<&str>| {
            let p = product(id, "x", 1.0, 1);
            match cat {
                Some(c) => p.with_category(c),
                None => p,
            }
        };
        let items = vec![with("n", None), with("b", Some("b")), with("a", Some("a"))];

        let asc = SortOrder::resolve(schema(), Some(&spec(&[("category", SortDirection::Asc)])), false);
        assert_eq!(sorted(&asc, items.clone()), ["a", "b", "n"]);

        let desc = SortOrder::resolve(schema(), Some(&spec(&[("category", SortDirection::Desc)])), false);
        assert_eq!(sorted(&desc, items), ["b", "a", "n"]);
    }

    #[test]
    fn direction_accepts_upper_case() {
        let d: SortDirection = serde_json::from_str("\"DESC\"").unwrap();
        assert_eq!(d, SortDirection::Desc);
        assert_eq!(d.as_sql(), "DESC");
    }
}
