//! Catalog repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbHotel, DbRestaurant, DbResult};

pub struct CatalogRepo {
    pool: PgPool,
}

impl CatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_hotel(&self, id: Uuid) -> DbResult<Option<DbHotel>> {
        let row = sqlx::query_as::<_, DbHotel>("SELECT * FROM wf_hotels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_restaurant(&self, id: Uuid) -> DbResult<Option<DbRestaurant>> {
        let row = sqlx::query_as::<_, DbRestaurant>("SELECT * FROM wf_restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
