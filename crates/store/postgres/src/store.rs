use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use printdesk_core::{
    ColorMode, Order, OrderStatus, PrintSides, PushSubscription, SubscriptionKeys, ValidOrderDraft,
};
use printdesk_store::subscription::check_subscription_input;
use printdesk_store::{OrderStore, StoreError, SubscriptionStore};

use crate::config::PostgresConfig;
use crate::migrations;

/// PostgreSQL implementation of [`OrderStore`] and [`SubscriptionStore`].
///
/// Every operation is a single statement, so each write is one atomic row
/// mutation. `update_status` stamps `updated_at` with the database clock
/// in the same write.
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresStore {
    /// Connect, build the pool, and run migrations.
    pub async fn connect(config: PostgresConfig) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::from_pool(pool, config).await
    }

    /// Build a store over an existing pool. Runs migrations. Useful for
    /// sharing one pool between the store and the feed listener.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config).await?;
        Ok(Self { pool, config })
    }

    /// The underlying pool, for constructing a [`crate::PostgresOrderFeed`].
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    fn backend_err(e: sqlx::Error) -> StoreError {
        StoreError::Backend(e.to_string())
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let status: String = row.try_get("status").map_err(PostgresStore::backend_err)?;
    let color_mode: String = row
        .try_get("color_mode")
        .map_err(PostgresStore::backend_err)?;
    let print_sides: String = row
        .try_get("print_sides")
        .map_err(PostgresStore::backend_err)?;

    Ok(Order {
        id: row.try_get("id").map_err(PostgresStore::backend_err)?,
        user_id: row.try_get("user_id").map_err(PostgresStore::backend_err)?,
        user_email: row
            .try_get("user_email")
            .map_err(PostgresStore::backend_err)?,
        is_guest: row.try_get("is_guest").map_err(PostgresStore::backend_err)?,
        file_url: row.try_get("file_url").map_err(PostgresStore::backend_err)?,
        file_name: row
            .try_get("file_name")
            .map_err(PostgresStore::backend_err)?,
        file_type: row
            .try_get("file_type")
            .map_err(PostgresStore::backend_err)?,
        file_size: row
            .try_get("file_size")
            .map_err(PostgresStore::backend_err)?,
        quantity: row.try_get("quantity").map_err(PostgresStore::backend_err)?,
        color_mode: ColorMode::from_str(&color_mode)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        print_sides: PrintSides::from_str(&print_sides)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        notes: row.try_get("notes").map_err(PostgresStore::backend_err)?,
        status: OrderStatus::from_str(&status)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        cancellation_reason: row
            .try_get("cancellation_reason")
            .map_err(PostgresStore::backend_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(PostgresStore::backend_err)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(PostgresStore::backend_err)?,
    })
}

fn subscription_from_row(row: &PgRow) -> Result<PushSubscription, StoreError> {
    Ok(PushSubscription {
        id: row.try_get("id").map_err(PostgresStore::backend_err)?,
        user_id: row.try_get("user_id").map_err(PostgresStore::backend_err)?,
        endpoint: row.try_get("endpoint").map_err(PostgresStore::backend_err)?,
        keys: SubscriptionKeys {
            p256dh: row.try_get("p256dh").map_err(PostgresStore::backend_err)?,
            auth: row.try_get("auth").map_err(PostgresStore::backend_err)?,
        },
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(PostgresStore::backend_err)?,
    })
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert(&self, draft: ValidOrderDraft) -> Result<Order, StoreError> {
        let order = draft.into_order(Utc::now());
        let table = &self.config.orders_table;
        // Timestamps come from the database clock, the same clock
        // update_status stamps with, so updated_at >= created_at holds
        // regardless of skew between the application and the database.
        let query = format!(
            "INSERT INTO {table} (id, user_id, user_email, is_guest, file_url, file_name, \
             file_type, file_size, quantity, color_mode, print_sides, notes, status, \
             cancellation_reason, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW()) \
             RETURNING *"
        );

        let row = sqlx::query(&query)
            .bind(order.id)
            .bind(&order.user_id)
            .bind(&order.user_email)
            .bind(order.is_guest)
            .bind(&order.file_url)
            .bind(&order.file_name)
            .bind(&order.file_type)
            .bind(order.file_size)
            .bind(order.quantity)
            .bind(order.color_mode.as_str())
            .bind(order.print_sides.as_str())
            .bind(&order.notes)
            .bind(order.status.as_str())
            .bind(&order.cancellation_reason)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::backend_err)?;

        order_from_row(&row)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Order, StoreError> {
        // The reason column only carries a value on cancelled rows.
        let reason = if status == OrderStatus::Cancelled {
            cancellation_reason
        } else {
            None
        };

        let table = &self.config.orders_table;
        let query = format!(
            "UPDATE {table} SET status = $2, cancellation_reason = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(&reason)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::backend_err)?
            .ok_or(StoreError::NotFound(id))?;

        order_from_row(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Order, StoreError> {
        let table = &self.config.orders_table;
        let query = format!("SELECT * FROM {table} WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::backend_err)?
            .ok_or(StoreError::NotFound(id))?;

        order_from_row(&row)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let table = &self.config.orders_table;
        let query =
            format!("SELECT * FROM {table} WHERE user_id = $1 ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::backend_err)?;

        rows.iter().map(order_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let table = &self.config.orders_table;
        let query = format!("SELECT * FROM {table} ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::backend_err)?;

        rows.iter().map(order_from_row).collect()
    }
}

#[async_trait]
impl SubscriptionStore for PostgresStore {
    async fn upsert(
        &self,
        user_id: &str,
        endpoint: &str,
        keys: SubscriptionKeys,
    ) -> Result<PushSubscription, StoreError> {
        check_subscription_input(endpoint, &keys)?;

        let table = &self.config.subscriptions_table;
        let query = format!(
            "INSERT INTO {table} (id, user_id, endpoint, p256dh, auth, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (endpoint) DO UPDATE SET \
                user_id = EXCLUDED.user_id, \
                p256dh = EXCLUDED.p256dh, \
                auth = EXCLUDED.auth \
             RETURNING *"
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(endpoint)
            .bind(&keys.p256dh)
            .bind(&keys.auth)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(Self::backend_err)?;

        subscription_from_row(&row)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, StoreError> {
        let table = &self.config.subscriptions_table;
        let query = format!("SELECT * FROM {table} WHERE user_id = $1");

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::backend_err)?;

        rows.iter().map(subscription_from_row).collect()
    }

    async fn remove(&self, endpoint: &str) -> Result<(), StoreError> {
        let table = &self.config.subscriptions_table;
        let query = format!("DELETE FROM {table} WHERE endpoint = $1");

        // Deleting zero rows is success: removal is idempotent.
        sqlx::query(&query)
            .bind(endpoint)
            .execute(&self.pool)
            .await
            .map_err(Self::backend_err)?;
        Ok(())
    }
}
