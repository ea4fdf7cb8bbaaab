use sea_orm::{
    sea_query::OnConflict, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryResult, Set,
};

use crate::domain::Product;
use crate::infrastructure::database::entities::product;
use crate::infrastructure::database::list_source::{SqlListEntity, SqlListSource};
use crate::shared::{ConversionError, ListResult, QueryError};

const ENTITY: &str = "products";

pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn list_source(&self) -> SqlListSource<Product> {
        SqlListSource::new(self.db.clone())
    }

    /// Inserts the product or overwrites the row with the same id.
    pub async fn save(&self, product: &Product) -> ListResult<()> {
        save_product(&self.db, product).await
    }

    pub async fn find_by_id(&self, id: &str) -> ListResult<Option<Product>> {
        let model = product::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| QueryError::store(ENTITY, e))?;
        Ok(model.map(product_model_to_domain))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn product_model_to_domain(model: product::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        sku: model.sku,
        category: model.category,
        price: model.price,
        stock: model.stock,
        date_created: model.date_created,
        deleted_at: model.deleted_at,
    }
}

fn product_to_active_model(product: &Product) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(product.id.clone()),
        name: Set(product.name.clone()),
        sku: Set(product.sku.clone()),
        category: Set(product.category.clone()),
        price: Set(product.price),
        stock: Set(product.stock),
        date_created: Set(product.date_created),
        deleted_at: Set(product.deleted_at),
    }
}

pub async fn save_product<C: ConnectionTrait>(conn: &C, product: &Product) -> ListResult<()> {
    product::Entity::insert(product_to_active_model(product))
        .on_conflict(
            OnConflict::column(product::Column::Id)
                .update_columns([
                    product::Column::Name,
                    product::Column::Sku,
                    product::Column::Category,
                    product::Column::Price,
                    product::Column::Stock,
                    product::Column::DateCreated,
                    product::Column::DeletedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| QueryError::store(ENTITY, e))?;
    Ok(())
}

impl SqlListEntity for Product {
    fn from_row(row: &QueryResult) -> Result<Self, ConversionError> {
        product::Model::from_query_result(row, "")
            .map(product_model_to_domain)
            .map_err(|e| ConversionError::new(ENTITY, e))
    }
}
