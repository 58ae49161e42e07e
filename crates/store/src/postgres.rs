//! PostgreSQL-backed store implementation.
//!
//! A transition commit runs inside one transaction: the order row is taken
//! `FOR UPDATE`, stock moves through conditional `stock >= qty` updates,
//! and the version-guarded order write goes last. Any failure rolls the
//! whole unit back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, PartyId, ProductId};
use domain::{Order, OrderItem, OrderStatus, OriginClass, Party, Product};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::inventory::{InventoryLedger, StockLine};
use crate::orders::{OrderStore, StockBatch, StockDirection, StoredOrder, TransitionCommit};
use crate::parties::PartyStore;

/// PostgreSQL store implementing all three contracts.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status: OrderStatus = status
            .parse()
            .map_err(|e: domain::OrderError| StoreError::Decode(e.to_string()))?;
        let origin: String = row.try_get("origin")?;
        let origin = match origin.as_str() {
            "checkout" => OriginClass::Checkout,
            "staff_sale" => OriginClass::StaffSale,
            other => return Err(StoreError::Decode(format!("unknown origin class: {other}"))),
        };

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_number: row.try_get("order_number")?,
            origin,
            status,
            party_id: row
                .try_get::<Option<Uuid>, _>("party_id")?
                .map(PartyId::from_uuid),
            subtotal: row.try_get("subtotal")?,
            tax: row.try_get("tax")?,
            shipping: row.try_get("shipping")?,
            discount: row.try_get("discount")?,
            total: row.try_get("total")?,
            tracking_number: row.try_get("tracking_number")?,
            shipped_at: row.try_get::<Option<DateTime<Utc>>, _>("shipped_at")?,
            delivered_at: row.try_get::<Option<DateTime<Utc>>, _>("delivered_at")?,
            delivery_recorded: row.try_get("delivery_recorded")?,
            stock_committed: row.try_get("stock_committed")?,
            shipping_address: row.try_get("shipping_address")?,
            billing_address: row.try_get("billing_address")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            sku: row.try_get("sku")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            total: row.try_get("total")?,
        })
    }

    fn row_to_party(row: &PgRow) -> Result<Party> {
        Ok(Party {
            id: PartyId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
        })
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, sku, quantity, price, total
            FROM order_items
            WHERE order_id = $1
            ORDER BY sku ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    /// Applies one conditional decrement inside the current transaction.
    async fn decrement_line(conn: &mut PgConnection, line: &StockLine) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND track_stock AND stock >= $2
            "#,
        )
        .bind(line.product_id.as_uuid())
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }

        // No row matched: the product is missing, untracked, or short.
        let row = sqlx::query("SELECT stock, track_stock FROM products WHERE id = $1 FOR UPDATE")
            .bind(line.product_id.as_uuid())
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(StoreError::ProductNotFound(line.product_id))?;

        let track_stock: bool = row.try_get("track_stock")?;
        if !track_stock {
            return Ok(());
        }

        Err(StoreError::InsufficientStock {
            product_id: line.product_id,
            available: row.try_get::<Decimal, _>("stock")?,
            requested: line.quantity,
        })
    }

    async fn increment_line(conn: &mut PgConnection, line: &StockLine) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + $2
            WHERE id = $1 AND track_stock
            "#,
        )
        .bind(line.product_id.as_uuid())
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }

        let exists = sqlx::query("SELECT 1 FROM products WHERE id = $1")
            .bind(line.product_id.as_uuid())
            .fetch_optional(&mut *conn)
            .await?
            .is_some();
        if exists {
            // Untracked product: skip silently.
            Ok(())
        } else {
            Err(StoreError::ProductNotFound(line.product_id))
        }
    }

    async fn apply_stock(conn: &mut PgConnection, batch: &StockBatch) -> Result<()> {
        for line in &batch.lines {
            match batch.direction {
                StockDirection::Decrement => Self::decrement_line(conn, line).await?,
                StockDirection::Increment => Self::increment_line(conn, line).await?,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order, items), fields(order_id = %order.id))]
    async fn create_with_items(&self, order: Order, items: Vec<OrderItem>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, origin, status, party_id,
                subtotal, tax, shipping, discount, total,
                tracking_number, shipped_at, delivered_at,
                delivery_recorded, stock_committed,
                shipping_address, billing_address, created_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, 1)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.origin.as_str())
        .bind(order.status.as_str())
        .bind(order.party_id.map(|p| p.as_uuid()))
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.shipping)
        .bind(order.discount)
        .bind(order.total)
        .bind(&order.tracking_number)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.delivery_recorded)
        .bind(order.stock_committed)
        .bind(&order.shipping_address)
        .bind(&order.billing_address)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, sku, quantity, price, total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(&item.sku)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load(&self, order_id: OrderId) -> Result<Option<StoredOrder>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = Self::row_to_order(&row)?;
        let version: i64 = row.try_get("version")?;
        let items = self.load_items(order_id).await?;

        Ok(Some(StoredOrder {
            order,
            items,
            version,
        }))
    }

    #[tracing::instrument(skip(self, commit), fields(order_id = %commit.order_id))]
    async fn commit_transition(&self, commit: TransitionCommit) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(commit.order_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::OrderNotFound(commit.order_id))?;

        let actual: i64 = row.try_get("version")?;
        if actual != commit.expected_version {
            return Err(StoreError::VersionConflict {
                order_id: commit.order_id,
                expected: commit.expected_version,
                actual,
            });
        }

        if let Some(ref batch) = commit.stock {
            Self::apply_stock(&mut tx, batch).await?;
        }

        let mut order = Self::row_to_order(&row)?;
        commit.patch.apply_to(&mut order);

        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, party_id = $3, tracking_number = $4,
                shipped_at = $5, delivered_at = $6,
                delivery_recorded = $7, stock_committed = $8,
                version = version + 1
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.party_id.map(|p| p.as_uuid()))
        .bind(&order.tracking_number)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.delivery_recorded)
        .bind(order.stock_committed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }
}

#[async_trait]
impl InventoryLedger for PostgresStore {
    async fn decrement_many(&self, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for line in lines {
            Self::decrement_line(&mut tx, line).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn increment_many(&self, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for line in lines {
            Self::increment_line(&mut tx, line).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, sku, name, price, stock, track_stock, is_active FROM products WHERE id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Product {
                id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
                sku: row.try_get("sku")?,
                name: row.try_get("name")?,
                price: row.try_get("price")?,
                stock: row.try_get("stock")?,
                track_stock: row.try_get("track_stock")?,
                is_active: row.try_get("is_active")?,
            })),
            None => Ok(None),
        }
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, price, stock, track_stock, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.track_stock)
        .bind(product.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PartyStore for PostgresStore {
    async fn find_party_by_name(&self, name: &str) -> Result<Option<Party>> {
        let row = sqlx::query("SELECT id, name, is_active FROM parties WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_party).transpose()
    }

    async fn create_party_with_account(&self, name: &str, email: &str) -> Result<Party> {
        let party_id = PartyId::new();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO parties (id, name, is_active) VALUES ($1, $2, TRUE)")
            .bind(party_id.as_uuid())
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        sqlx::query("INSERT INTO accounts (id, email, party_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(party_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        tx.commit().await?;
        Ok(Party {
            id: party_id,
            name: name.to_string(),
            is_active: true,
        })
    }

    async fn get_party(&self, party_id: PartyId) -> Result<Option<Party>> {
        let row = sqlx::query("SELECT id, name, is_active FROM parties WHERE id = $1")
            .bind(party_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_party).transpose()
    }
}

fn map_unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::UniqueViolation {
            constraint: db_err.constraint().unwrap_or("unknown").to_string(),
        };
    }
    StoreError::Database(e)
}
