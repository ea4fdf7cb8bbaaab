//! SQL builder for list queries.
//!
//! A prepared [`ListQuery`] becomes one statement made of chained CTEs:
//!
//! - `scored`: WHERE predicates plus a `_score` column (search only)
//! - `filtered`: soft-delete flag, predicates and the `_score > 0` gate
//! - `sorted`: `ROW_NUMBER()` over the requested order, `id` last
//! - `total_count`: `COUNT(*)` over `sorted`
//! - `paged`: the `LIMIT`/`OFFSET` window
//!
//! The final select left-joins `paged` onto `total_count` so a window past
//! the end still reports the count; such a row has a null `_row_num`.
//!
//! Values are always bound. Placeholders are `$n` on Postgres and `?` on
//! SQLite, one bound value per occurrence, so the text is written strictly
//! left to right.

use std::fmt::Write as _;

use sea_orm::{DbBackend, Statement, Value};

use crate::domain::query::search::{CONTAINS_WEIGHT, EXACT_WEIGHT, PREFIX_WEIGHT, TOKEN_WEIGHT};
use crate::domain::query::{
    FieldDef, FieldKind, FieldValue, FilterOperator, FilterPredicate, ListQuery, Operand,
    SearchQuery, SoftDelete, SortTarget,
};
use crate::shared::StoreError;

pub const TOTAL_COUNT_COLUMN: &str = "_total_count";
pub const ROW_NUM_COLUMN: &str = "_row_num";
pub const SCORE_COLUMN: &str = "_score";

/// A rendered list statement with its bind values.
#[derive(Debug, Clone)]
pub struct SqlPipeline {
    backend: DbBackend,
    sql: String,
    values: Vec<Value>,
}

impl SqlPipeline {
    pub fn build(query: &ListQuery, backend: DbBackend) -> Result<Self, StoreError> {
        match backend {
            DbBackend::Postgres | DbBackend::Sqlite => {}
            other => return Err(StoreError::UnsupportedBackend(other)),
        }
        let mut w = SqlWriter::new(backend);
        w.pipeline(query);
        Ok(Self {
            backend,
            sql: w.sql,
            values: w.values,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn statement(&self) -> Statement {
        Statement::from_sql_and_values(self.backend, self.sql.clone(), self.values.clone())
    }
}

struct SqlWriter {
    backend: DbBackend,
    sql: String,
    values: Vec<Value>,
}

impl SqlWriter {
    fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            sql: String::with_capacity(1024),
            values: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn bind(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
        match self.backend {
            DbBackend::Postgres => {
                let _ = write!(self.sql, "${}", self.values.len());
            }
            _ => self.sql.push('?'),
        }
    }

    fn ident(&mut self, name: &str) {
        self.sql.push('"');
        self.sql.push_str(&name.replace('"', "\"\""));
        self.sql.push('"');
    }

    /// Column reference that orders like the in-memory comparator. Postgres
    /// text needs the byte-order collation.
    fn ordered_column(&mut self, field: &FieldDef) {
        self.ident(field.column);
        if self.backend == DbBackend::Postgres && field.kind == FieldKind::Text {
            self.push(" COLLATE \"C\"");
        }
    }

    fn lowered_column(&mut self, field: &FieldDef) {
        self.push("COALESCE(LOWER(");
        self.ident(field.column);
        self.push("), '')");
    }

    fn pipeline(&mut self, query: &ListQuery) {
        self.push("WITH ");
        match &query.search {
            Some(search) => {
                self.push("scored AS (SELECT t.*, CAST(");
                self.score_expr(query, search);
                self.push(" AS DOUBLE PRECISION) AS ");
                self.push(SCORE_COLUMN);
                self.push(" FROM ");
                self.ident(query.schema.table);
                self.push(" t WHERE ");
                self.where_clause(query);
                self.push("), filtered AS (SELECT * FROM scored WHERE ");
                self.push(SCORE_COLUMN);
                self.push(" > 0)");
            }
            None => {
                self.push("filtered AS (SELECT t.* FROM ");
                self.ident(query.schema.table);
                self.push(" t WHERE ");
                self.where_clause(query);
                self.push(")");
            }
        }

        self.push(", sorted AS (SELECT filtered.*, ROW_NUMBER() OVER (ORDER BY ");
        self.order_by(query);
        let _ = write!(self.sql, ") AS {} FROM filtered)", ROW_NUM_COLUMN);

        let _ = write!(
            self.sql,
            ", total_count AS (SELECT COUNT(*) AS {} FROM sorted)",
            TOTAL_COUNT_COLUMN
        );

        let _ = write!(self.sql, ", paged AS (SELECT * FROM sorted ORDER BY {} LIMIT ", ROW_NUM_COLUMN);
        self.bind(i64::try_from(query.pagination.limit()).unwrap_or(i64::MAX));
        self.push(" OFFSET ");
        self.bind(i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX));
        self.push(")");

        let _ = write!(
            self.sql,
            " SELECT paged.*, total_count.{tc} FROM total_count LEFT JOIN paged ON 1 = 1 ORDER BY paged.{rn}",
            tc = TOTAL_COUNT_COLUMN,
            rn = ROW_NUM_COLUMN
        );
    }

    fn where_clause(&mut self, query: &ListQuery) {
        let mut first = true;

        if let Some(soft_delete) = query.schema.soft_delete {
            self.and(&mut first);
            match soft_delete {
                SoftDelete::DeletedAt(column) => {
                    self.ident(column);
                    self.push(" IS NULL");
                }
                SoftDelete::ActiveFlag(column) => {
                    self.ident(column);
                    self.push(" = TRUE");
                }
            }
        }

        for predicate in query.filters.predicates() {
            self.and(&mut first);
            self.predicate(predicate);
        }

        if first {
            self.push("1 = 1");
        }
    }

    fn and(&mut self, first: &mut bool) {
        if !*first {
            self.push(" AND ");
        }
        *first = false;
    }

    fn predicate(&mut self, p: &FilterPredicate) {
        match (&p.op, &p.operand) {
            (FilterOperator::Eq, Operand::Value(FieldValue::Null)) => {
                self.ident(p.field.column);
                self.push(" IS NULL");
            }
            (FilterOperator::Ne, Operand::Value(FieldValue::Null)) => {
                self.ident(p.field.column);
                self.push(" IS NOT NULL");
            }
            (FilterOperator::Contains, Operand::Value(FieldValue::Text(needle))) => {
                self.push("LOWER(");
                self.ident(p.field.column);
                self.push(") LIKE ");
                self.bind(contains_pattern(&needle.to_ascii_lowercase()));
                self.push(" ESCAPE '\\'");
            }
            (FilterOperator::In, Operand::List(values)) => {
                let values: Vec<Value> = values.iter().filter_map(FieldValue::to_sql_value).collect();
                if values.is_empty() {
                    self.push("1 = 0");
                    return;
                }
                self.ident(p.field.column);
                self.push(" IN (");
                for (i, v) in values.into_iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.bind(v);
                }
                self.push(")");
            }
            (op, Operand::Value(value)) => {
                let sql_op = match op {
                    FilterOperator::Eq => "=",
                    FilterOperator::Ne => "<>",
                    FilterOperator::Gt => ">",
                    FilterOperator::Gte => ">=",
                    FilterOperator::Lt => "<",
                    FilterOperator::Lte => "<=",
                    FilterOperator::Contains | FilterOperator::In => {
                        self.push("1 = 0");
                        return;
                    }
                };
                let Some(bound) = value.to_sql_value() else {
                    self.push("1 = 0");
                    return;
                };
                self.ordered_column(p.field);
                let _ = write!(self.sql, " {} ", sql_op);
                self.bind(bound);
            }
            // Resolution never pairs a list with a scalar operator.
            (_, Operand::List(_)) => self.push("1 = 0"),
        }
    }

    fn score_expr(&mut self, query: &ListQuery, search: &SearchQuery) {
        let fields: Vec<&FieldDef> = query.schema.searchable_fields().collect();
        if fields.is_empty() {
            self.push("0");
            return;
        }

        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.push(" + ");
            }
            self.push("(CASE WHEN ");
            self.lowered_column(field);
            self.push(" = ");
            self.bind(search.text().to_string());
            let _ = write!(self.sql, " THEN {:?} WHEN ", EXACT_WEIGHT);
            self.lowered_column(field);
            self.push(" LIKE ");
            self.bind(format!("{}%", escape_like(search.text())));
            let _ = write!(self.sql, " ESCAPE '\\' THEN {:?} WHEN ", PREFIX_WEIGHT);
            self.lowered_column(field);
            self.push(" LIKE ");
            self.bind(contains_pattern(search.text()));
            let _ = write!(self.sql, " ESCAPE '\\' THEN {:?} ELSE 0 END)", CONTAINS_WEIGHT);

            for token in search.tokens() {
                self.push(" + (CASE WHEN ");
                self.lowered_column(field);
                self.push(" LIKE ");
                self.bind(contains_pattern(token));
                let _ = write!(self.sql, " ESCAPE '\\' THEN {:?} ELSE 0 END)", TOKEN_WEIGHT);
            }
        }
    }

    /// One pair of `CASE WHEN` branches per sortable field and requested
    /// term; the requested name and direction are bound, so only the
    /// matching branch yields values and the rest sort as constants.
    fn order_by(&mut self, query: &ListQuery) {
        let sortable: Vec<&FieldDef> = query.schema.fields.iter().filter(|f| f.sortable).collect();

        for term in query.sort.terms() {
            match term.target {
                SortTarget::Relevance => {
                    let _ = write!(self.sql, "{} {}, ", SCORE_COLUMN, term.direction.as_sql());
                }
                SortTarget::Field(requested) => {
                    for field in &sortable {
                        for dir in ["ASC", "DESC"] {
                            self.push("CASE WHEN ");
                            self.bind(requested.name.to_string());
                            let _ = write!(self.sql, " = '{}' AND ", field.name.replace('\'', "''"));
                            self.bind(term.direction.as_sql().to_string());
                            let _ = write!(self.sql, " = '{}' THEN ", dir);
                            self.ordered_column(field);
                            let _ = write!(self.sql, " END {} NULLS LAST, ", dir);
                        }
                    }
                }
            }
        }

        let id = query.schema.id();
        self.ordered_column(id);
        self.push(" ASC");
    }
}

/// Escapes LIKE wildcards and the escape character itself.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like(s))
}
