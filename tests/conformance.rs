//! Every list request must produce the same page from the in-memory store
//! and from SQLite.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, TransactionTrait};
use sea_orm_migration::MigratorTrait;
use serde_json::json;

use list_engine::domain::query::{FilterOperator, ListEntity, ListPage, ListQuery, SortDirection};
use list_engine::domain::{Product, User, UserRole};
use list_engine::infrastructure::database::migrator::Migrator;
use list_engine::infrastructure::database::repositories::save_product;
use list_engine::infrastructure::database::{
    fetch_page_with, ProductRepository, SqlListEntity, UserRepository,
};
use list_engine::{
    init_database, DatabaseConfig, InMemoryStore, ListOptions, ListRequest, ListService, ListSource,
    SqlListSource,
};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

async fn database() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn products(items: Vec<Product>) -> (InMemoryStore<Product>, SqlListSource<Product>, DatabaseConnection) {
    let db = database().await;
    let repo = ProductRepository::new(db.clone());
    for item in &items {
        repo.save(item).await.unwrap();
    }
    (InMemoryStore::with_items(items), repo.list_source(), db)
}

async fn users(items: Vec<User>) -> (InMemoryStore<User>, SqlListSource<User>, DatabaseConnection) {
    let db = database().await;
    let repo = UserRepository::new(db.clone());
    for item in &items {
        repo.save(item).await.unwrap();
    }
    (InMemoryStore::with_items(items), repo.list_source(), db)
}

/// `count` products, one per hour, none deleted.
fn plain_catalog(count: usize) -> Vec<Product> {
    (0..count)
        .map(|i| {
            Product::new(format!("p-{:03}", i), format!("Item {}", i), format!("SKU-{:03}", i), 10.0, 1)
                .created_at(base_time() + Duration::hours(i as i64))
        })
        .collect()
}

/// Mixed catalog: shared creation times, missing categories, deleted rows.
fn rich_catalog() -> Vec<Product> {
    const NAMES: [&str; 8] = [
        "Desk Lamp",
        "Floor lamp",
        "Lamp",
        "Lampshade",
        "Oak Desk",
        "Chair",
        "Table 50%_off",
        "Bookshelf",
    ];
    (0..40)
        .map(|i| {
            let mut p = Product::new(
                format!("p-{:03}", i),
                NAMES[i % NAMES.len()],
                format!("SKU-{:03}", i),
                (i % 5) as f64 * 10.0 + 0.5,
                (i % 9) as i32,
            )
            // groups of three share a timestamp
            .created_at(base_time() + Duration::hours((i / 3) as i64));
            if i % 7 != 3 {
                p = p.with_category(if i % 2 == 0 { "Lighting" } else { "Furniture" });
            }
            if i % 11 == 10 {
                p.mark_deleted(base_time());
            }
            p
        })
        .collect()
}

fn people() -> Vec<User> {
    let roles = [UserRole::Admin, UserRole::Operator, UserRole::Viewer];
    (0..12)
        .map(|i| {
            let mut u = User::new(
                format!("u-{:02}", i),
                format!("{}{}", ["alice", "bob", "carol", "alina"][i % 4], i),
                format!("user{}@example.com", i),
            )
            .with_role(roles[i % 3])
            .created_at(base_time() + Duration::minutes((i / 2) as i64));
            if i % 5 == 4 {
                u.deactivate();
            }
            u
        })
        .collect()
}

async fn run<T: ListEntity>(source: &dyn ListSource<T>, request: &ListRequest) -> ListPage<T> {
    ListService::default()
        .get_list_page_data(source, request)
        .await
        .unwrap()
}

async fn assert_parity<T: SqlListEntity>(
    label: &str,
    memory: &InMemoryStore<T>,
    sql: &SqlListSource<T>,
    request: &ListRequest,
) -> ListPage<T> {
    let a = run(memory, request).await;
    let b = run(sql, request).await;
    assert_eq!(a.ids(), b.ids(), "{}: ids", label);
    assert_eq!(a.pagination, b.pagination, "{}: pagination", label);
    assert_eq!(a.search_results, b.search_results, "{}: search results", label);
    assert_eq!(b.skipped_items, 0, "{}: skipped", label);
    b
}

#[tokio::test]
async fn thirty_seven_items_page_one_and_four() {
    let (memory, sql, _db) = products(plain_catalog(37)).await;

    let first = assert_parity("page 1", &memory, &sql, &ListRequest::default().with_page(10, 1)).await;
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.pagination.total_items, 37);
    assert_eq!(first.pagination.total_pages, Some(4));
    assert!(first.pagination.has_next);
    assert!(!first.pagination.has_prev);

    let last = assert_parity("page 4", &memory, &sql, &ListRequest::default().with_page(10, 4)).await;
    assert_eq!(last.data.len(), 7);
    assert!(!last.pagination.has_next);
    assert!(last.pagination.has_prev);
}

#[tokio::test]
async fn limits_are_clamped_not_rejected() {
    let (memory, sql, _db) = products(plain_catalog(37)).await;

    let page = assert_parity("limit -5", &memory, &sql, &ListRequest::default().with_page(-5, 1)).await;
    assert_eq!(page.data.len(), 20);

    let page = assert_parity("limit 0", &memory, &sql, &ListRequest::default().with_page(0, 0)).await;
    assert_eq!(page.data.len(), 20);
    assert_eq!(page.pagination.current_page, Some(1));

    let page = assert_parity("limit 5000", &memory, &sql, &ListRequest::default().with_page(5000, 1)).await;
    assert_eq!(page.data.len(), 37);
    assert_eq!(page.pagination.total_pages, Some(1));
}

#[tokio::test]
async fn cursor_windows() {
    let (memory, sql, _db) = products(plain_catalog(60)).await;

    let page = assert_parity("cursor 40", &memory, &sql, &ListRequest::default().with_cursor(10, "offset:40")).await;
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.pagination.next_cursor.as_deref(), Some("offset:50"));
    assert!(!page.pagination.has_prev);

    let page = assert_parity("cursor garbage", &memory, &sql, &ListRequest::default().with_cursor(10, "???")).await;
    assert_eq!(page.data[0].id, "p-059");

    let page = assert_parity("cursor end", &memory, &sql, &ListRequest::default().with_cursor(10, "offset:55")).await;
    assert_eq!(page.data.len(), 5);
    assert!(!page.pagination.has_next);
    assert_eq!(page.pagination.next_cursor, None);
}

#[tokio::test]
async fn window_past_the_end_still_counts() {
    let (memory, sql, _db) = products(plain_catalog(5)).await;
    let page = assert_parity("past end", &memory, &sql, &ListRequest::default().with_page(10, 9)).await;
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total_items, 5);
}

#[tokio::test]
async fn empty_table() {
    let (memory, sql, _db) = products(Vec::new()).await;
    let page = assert_parity("empty", &memory, &sql, &ListRequest::default()).await;
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total_items, 0);
    assert_eq!(page.pagination.total_pages, Some(1));
    assert!(!page.pagination.has_next);
}

#[tokio::test]
async fn sorting_matches() {
    let (memory, sql, _db) = products(rich_catalog()).await;

    let cases = [
        ("default", ListRequest::default()),
        ("price desc, name asc", ListRequest::default()
            .with_sort("price", SortDirection::Desc)
            .with_sort("name", SortDirection::Asc)),
        ("category nulls", ListRequest::default().with_sort("category", SortDirection::Asc)),
        ("category desc nulls", ListRequest::default().with_sort("category", SortDirection::Desc)),
        ("stock ties", ListRequest::default().with_sort("stock", SortDirection::Asc).with_page(7, 2)),
        ("unknown field", ListRequest::default().with_sort("colour", SortDirection::Asc)),
        ("unsortable field", ListRequest::default().with_sort("deleted_at", SortDirection::Asc)),
        ("name byte order", ListRequest::default().with_sort("name", SortDirection::Desc).with_page(100, 1)),
    ];
    for (label, request) in &cases {
        assert_parity(label, &memory, &sql, request).await;
    }
}

#[tokio::test]
async fn filtering_matches() {
    let (memory, sql, _db) = products(rich_catalog()).await;

    let cases = [
        ("stock and price", ListRequest::default()
            .with_filter("stock", FilterOperator::Gte, json!(4))
            .with_filter("price", FilterOperator::Lt, json!(30))),
        ("category is null", ListRequest::default().with_filter("category", FilterOperator::Eq, json!(null))),
        ("category not null", ListRequest::default().with_filter("category", FilterOperator::Ne, json!(null))),
        ("category ne", ListRequest::default().with_filter("category", FilterOperator::Ne, json!("Lighting"))),
        ("contains", ListRequest::default().with_filter("name", FilterOperator::Contains, json!("LAMP"))),
        ("contains wildcard", ListRequest::default().with_filter("name", FilterOperator::Contains, json!("50%_"))),
        ("contains literal percent", ListRequest::default().with_filter("name", FilterOperator::Contains, json!("%"))),
        ("in", ListRequest::default().with_filter("sku", FilterOperator::In, json!(["SKU-001", "SKU-010", "SKU-999"]))),
        ("empty in", ListRequest::default().with_filter("sku", FilterOperator::In, json!([]))),
        ("created since", ListRequest::default().with_filter(
            "date_created",
            FilterOperator::Gte,
            json!("2024-01-01T05:00:00Z"),
        )),
        ("name range", ListRequest::default()
            .with_filter("name", FilterOperator::Gt, json!("Floor"))
            .with_filter("name", FilterOperator::Lte, json!("Oak Desk"))),
    ];
    for (label, request) in &cases {
        assert_parity(label, &memory, &sql, request).await;
    }

    let page = assert_parity("deleted hidden", &memory, &sql, &ListRequest::default().with_page(100, 1)).await;
    assert_eq!(page.pagination.total_items, 37);
}

#[tokio::test]
async fn filter_runs_before_count() {
    let (memory, sql, _db) = products(rich_catalog()).await;
    let request = ListRequest::default()
        .with_filter("category", FilterOperator::Eq, json!("Lighting"))
        .with_page(3, 1);
    let page = assert_parity("filter count", &memory, &sql, &request).await;
    let all = run(&memory, &ListRequest::default().with_page(100, 1)).await;
    let expected = all
        .data
        .iter()
        .filter(|p| p.category.as_deref() == Some("Lighting"))
        .count() as u64;
    assert_eq!(page.pagination.total_items, expected);
    assert_eq!(page.data.len(), 3);
}

#[tokio::test]
async fn search_matches() {
    let (memory, sql, _db) = products(rich_catalog()).await;

    let cases = [
        ("lamp", ListRequest::default().with_search("lamp").with_page(100, 1)),
        ("desk lamp", ListRequest::default().with_search("desk lamp")),
        ("padded query", ListRequest::default().with_search("  LAMP  ").with_page(5, 2)),
        ("sorted search", ListRequest::default().with_search("lamp").with_sort("name", SortDirection::Asc)),
        ("filtered search", ListRequest::default()
            .with_search("desk")
            .with_filter("stock", FilterOperator::Lt, json!(5))),
        ("sku search", ListRequest::default().with_search("sku-01")),
        ("wildcard search", ListRequest::default().with_search("%_")),
        ("no hits", ListRequest::default().with_search("sofa")),
    ];
    for (label, request) in &cases {
        assert_parity(label, &memory, &sql, request).await;
    }

    let page = run(&sql, &ListRequest::default().with_search("lamp").with_page(100, 1)).await;
    let results = page.search_results.unwrap();
    assert_eq!(results.len(), page.data.len());
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(page.data.iter().all(|p| !p.name.contains("Chair")));
}

#[tokio::test]
async fn short_search_is_rejected_by_both() {
    let (memory, sql, _db) = products(plain_catalog(3)).await;
    let request = ListRequest::default().with_search("a");
    assert!(ListService::default().get_list_page_data(&memory, &request).await.is_err());
    assert!(ListService::default().get_list_page_data(&sql, &request).await.is_err());

    let request = ListRequest::default().with_search("ab");
    assert_parity("two chars", &memory, &sql, &request).await;
}

#[tokio::test]
async fn unknown_filter_field_is_rejected_by_both() {
    let (memory, sql, _db) = products(plain_catalog(3)).await;
    let request = ListRequest::default().with_filter("colour", FilterOperator::Eq, json!("red"));
    assert!(ListService::default().get_list_page_data(&memory, &request).await.is_err());
    assert!(ListService::default().get_list_page_data(&sql, &request).await.is_err());
}

#[tokio::test]
async fn users_match() {
    let (memory, sql, _db) = users(people()).await;

    let cases = [
        ("default", ListRequest::default()),
        ("admins", ListRequest::default().with_filter("role", FilterOperator::Eq, json!("admin"))),
        ("search ali", ListRequest::default().with_search("ali")),
        ("search email", ListRequest::default().with_search("user1")),
        ("by username", ListRequest::default().with_sort("username", SortDirection::Asc).with_page(4, 2)),
    ];
    for (label, request) in &cases {
        assert_parity(label, &memory, &sql, request).await;
    }

    let page = run(&sql, &ListRequest::default()).await;
    assert_eq!(page.pagination.total_items, 10);
    assert!(page.data.iter().all(|u| u.is_active));
}

#[tokio::test]
async fn unconvertible_rows_are_skipped_and_counted() {
    let (_memory, sql, db) = users(people()).await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO users (id, username, email, role, is_active, date_created) \
         VALUES ('u-99', 'mallory', 'mallory@example.com', 'superuser', 1, '2030-01-01T00:00:00+00:00')",
    ))
    .await
    .unwrap();

    let page = run(&sql, &ListRequest::default()).await;
    assert_eq!(page.skipped_items, 1);
    assert_eq!(page.pagination.total_items, 11);
    assert_eq!(page.data.len(), 10);
    assert!(page.data.iter().all(|u| u.id != "u-99"));

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["skippedItems"], 1);
}

#[tokio::test]
async fn runs_inside_a_caller_transaction() {
    let (_memory, _sql, db) = products(plain_catalog(2)).await;
    let query = ListQuery::prepare::<Product>(&ListRequest::default(), &ListOptions::default()).unwrap();

    let txn = db.begin().await.unwrap();
    save_product(&txn, &Product::new("p-new", "Fresh", "SKU-NEW", 1.0, 1)).await.unwrap();
    let page = fetch_page_with::<Product, _>(&txn, &query).await.unwrap();
    assert_eq!(page.pagination.total_items, 3);
    txn.rollback().await.unwrap();

    let page = fetch_page_with::<Product, _>(&db, &query).await.unwrap();
    assert_eq!(page.pagination.total_items, 2);
}
