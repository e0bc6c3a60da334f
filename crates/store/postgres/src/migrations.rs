use sqlx::PgPool;

use printdesk_store::StoreError;

use crate::config::PostgresConfig;

/// Create the tables, indexes, and the change-feed trigger.
///
/// Every statement is idempotent, so migrations run unconditionally at
/// startup.
pub(crate) async fn run_migrations(
    pool: &PgPool,
    config: &PostgresConfig,
) -> Result<(), StoreError> {
    let orders = &config.orders_table;
    let subscriptions = &config.subscriptions_table;
    let channel = &config.feed_channel;

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS {orders} (
                id UUID PRIMARY KEY,
                user_id TEXT NOT NULL,
                user_email TEXT,
                is_guest BOOLEAN NOT NULL DEFAULT FALSE,
                file_url TEXT NOT NULL,
                file_name TEXT NOT NULL,
                file_type TEXT NOT NULL,
                file_size BIGINT,
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                color_mode TEXT NOT NULL,
                print_sides TEXT NOT NULL,
                notes TEXT,
                status TEXT NOT NULL,
                cancellation_reason TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {orders}_user_created_idx \
             ON {orders} (user_id, created_at DESC)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {orders}_created_idx \
             ON {orders} (created_at DESC)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {subscriptions} (
                id UUID PRIMARY KEY,
                user_id TEXT NOT NULL,
                endpoint TEXT NOT NULL UNIQUE,
                p256dh TEXT NOT NULL,
                auth TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {subscriptions}_user_idx \
             ON {subscriptions} (user_id)"
        ),
        // Row-to-JSON trigger feeding LISTEN/NOTIFY. The payload shape
        // matches printdesk_core::OrderEvent exactly.
        format!(
            "CREATE OR REPLACE FUNCTION {orders}_notify_change() RETURNS trigger AS $$
            DECLARE
                payload JSON;
            BEGIN
                IF TG_OP = 'INSERT' THEN
                    payload := json_build_object(
                        'kind', 'inserted', 'order', row_to_json(NEW));
                ELSIF TG_OP = 'UPDATE' THEN
                    payload := json_build_object(
                        'kind', 'updated', 'order', row_to_json(NEW),
                        'previous', row_to_json(OLD));
                ELSE
                    payload := json_build_object(
                        'kind', 'deleted', 'order', row_to_json(OLD));
                END IF;
                PERFORM pg_notify('{channel}', payload::text);
                RETURN NULL;
            END;
            $$ LANGUAGE plpgsql"
        ),
        format!("DROP TRIGGER IF EXISTS {orders}_change_feed ON {orders}"),
        format!(
            "CREATE TRIGGER {orders}_change_feed
             AFTER INSERT OR UPDATE OR DELETE ON {orders}
             FOR EACH ROW EXECUTE FUNCTION {orders}_notify_change()"
        ),
    ];

    for statement in &statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
    }
    Ok(())
}
