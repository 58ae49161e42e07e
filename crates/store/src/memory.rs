//! In-memory store implementation for testing and development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PartyId, ProductId};
use domain::{Order, OrderItem, Party, Product};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::inventory::{InventoryLedger, StockLine};
use crate::orders::{OrderStore, StockDirection, StoredOrder, TransitionCommit};
use crate::parties::PartyStore;

#[derive(Debug, Clone)]
struct OrderRow {
    order: Order,
    items: Vec<OrderItem>,
    version: i64,
}

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, OrderRow>,
    products: HashMap<ProductId, Product>,
    parties: HashMap<PartyId, Party>,
    account_emails: Vec<String>,
}

/// In-memory backend implementing all three store contracts.
///
/// A single `RwLock` over the whole state makes every commit a critical
/// section, which gives the same atomicity the PostgreSQL backend gets
/// from transactions and row locks.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock of a product, for test assertions.
    pub async fn stock_of(&self, product_id: ProductId) -> Option<Decimal> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    /// Returns the number of party records.
    pub async fn party_count(&self) -> usize {
        self.state.read().await.parties.len()
    }

    /// Validates then applies a stock movement against the product map.
    ///
    /// Decrements simulate every line before writing any, so a failure on
    /// the last line leaves the earlier ones untouched.
    fn apply_stock(
        products: &mut HashMap<ProductId, Product>,
        direction: StockDirection,
        lines: &[StockLine],
    ) -> Result<()> {
        if direction == StockDirection::Decrement {
            for line in lines {
                let product = products
                    .get(&line.product_id)
                    .ok_or(StoreError::ProductNotFound(line.product_id))?;
                if product.track_stock && product.stock < line.quantity {
                    return Err(StoreError::InsufficientStock {
                        product_id: line.product_id,
                        available: product.stock,
                        requested: line.quantity,
                    });
                }
            }
        }

        for line in lines {
            let product = products
                .get_mut(&line.product_id)
                .ok_or(StoreError::ProductNotFound(line.product_id))?;
            if !product.track_stock {
                continue;
            }
            match direction {
                StockDirection::Decrement => product.stock -= line.quantity,
                StockDirection::Increment => product.stock += line.quantity,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_with_items(&self, order: Order, items: Vec<OrderItem>) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.insert(
            order.id,
            OrderRow {
                order,
                items,
                version: 1,
            },
        );
        Ok(())
    }

    async fn load(&self, order_id: OrderId) -> Result<Option<StoredOrder>> {
        let state = self.state.read().await;
        Ok(state.orders.get(&order_id).map(|row| StoredOrder {
            order: row.order.clone(),
            items: row.items.clone(),
            version: row.version,
        }))
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> Result<Order> {
        let mut state = self.state.write().await;

        let actual = state
            .orders
            .get(&commit.order_id)
            .ok_or(StoreError::OrderNotFound(commit.order_id))?
            .version;
        if actual != commit.expected_version {
            return Err(StoreError::VersionConflict {
                order_id: commit.order_id,
                expected: commit.expected_version,
                actual,
            });
        }

        // Stock first: a failed decrement must leave the order untouched.
        if let Some(ref batch) = commit.stock {
            Self::apply_stock(&mut state.products, batch.direction, &batch.lines)?;
        }

        let row = state
            .orders
            .get_mut(&commit.order_id)
            .expect("order checked above");
        commit.patch.apply_to(&mut row.order);
        row.version += 1;
        Ok(row.order.clone())
    }
}

#[async_trait]
impl InventoryLedger for InMemoryStore {
    async fn decrement_many(&self, lines: &[StockLine]) -> Result<()> {
        let mut state = self.state.write().await;
        Self::apply_stock(&mut state.products, StockDirection::Decrement, lines)
    }

    async fn increment_many(&self, lines: &[StockLine]) -> Result<()> {
        let mut state = self.state.write().await;
        Self::apply_stock(&mut state.products, StockDirection::Increment, lines)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(&product_id).cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.insert(product.id, product);
        Ok(())
    }
}

#[async_trait]
impl PartyStore for InMemoryStore {
    async fn find_party_by_name(&self, name: &str) -> Result<Option<Party>> {
        let state = self.state.read().await;
        Ok(state.parties.values().find(|p| p.name == name).cloned())
    }

    async fn create_party_with_account(&self, name: &str, email: &str) -> Result<Party> {
        let mut state = self.state.write().await;

        if state.parties.values().any(|p| p.name == name) {
            return Err(StoreError::UniqueViolation {
                constraint: "parties_name_key".to_string(),
            });
        }
        if state.account_emails.iter().any(|e| e == email) {
            return Err(StoreError::UniqueViolation {
                constraint: "accounts_email_key".to_string(),
            });
        }

        let party = Party {
            id: PartyId::new(),
            name: name.to_string(),
            is_active: true,
        };
        state.account_emails.push(email.to_string());
        state.parties.insert(party.id, party.clone());
        Ok(party)
    }

    async fn get_party(&self, party_id: PartyId) -> Result<Option<Party>> {
        let state = self.state.read().await;
        Ok(state.parties.get(&party_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{OrderPatch, StockBatch};
    use domain::{OrderStatus, OrderTotals};
    use rust_decimal_macros::dec;

    fn product(stock: Decimal, track_stock: bool) -> Product {
        Product {
            id: ProductId::new(),
            sku: "SKU-001".to_string(),
            name: "Widget".to_string(),
            price: dec!(10.00),
            stock,
            track_stock,
            is_active: true,
        }
    }

    fn pending_order() -> Order {
        Order::new("ORD-1", OrderTotals::default(), "a", "b")
    }

    #[tokio::test]
    async fn create_and_load_round_trips() {
        let store = InMemoryStore::new();
        let order = pending_order();
        let order_id = order.id;

        store.create_with_items(order, vec![]).await.unwrap();

        let stored = store.load(order_id).await.unwrap().unwrap();
        assert_eq!(stored.order.id, order_id);
        assert_eq!(stored.version, 1);
        assert!(stored.items.is_empty());
    }

    #[tokio::test]
    async fn load_missing_order_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.load(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn decrement_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let ok = product(dec!(10), true);
        let short = product(dec!(1), true);
        store.insert_product(ok.clone()).await.unwrap();
        store.insert_product(short.clone()).await.unwrap();

        let lines = vec![
            StockLine::new(ok.id, dec!(3)),
            StockLine::new(short.id, dec!(2)),
        ];
        let result = store.decrement_many(&lines).await;

        assert!(matches!(
            result,
            Err(StoreError::InsufficientStock { available, requested, .. })
                if available == dec!(1) && requested == dec!(2)
        ));
        // The passing line must not have been applied.
        assert_eq!(store.stock_of(ok.id).await, Some(dec!(10)));
        assert_eq!(store.stock_of(short.id).await, Some(dec!(1)));
    }

    #[tokio::test]
    async fn untracked_products_are_skipped() {
        let store = InMemoryStore::new();
        let untracked = product(dec!(0), false);
        store.insert_product(untracked.clone()).await.unwrap();

        store
            .decrement_many(&[StockLine::new(untracked.id, dec!(100))])
            .await
            .unwrap();
        store
            .increment_many(&[StockLine::new(untracked.id, dec!(100))])
            .await
            .unwrap();
        assert_eq!(store.stock_of(untracked.id).await, Some(dec!(0)));
    }

    #[tokio::test]
    async fn increment_has_no_upper_bound() {
        let store = InMemoryStore::new();
        let p = product(dec!(1), true);
        store.insert_product(p.clone()).await.unwrap();

        store
            .increment_many(&[StockLine::new(p.id, dec!(999.5))])
            .await
            .unwrap();
        assert_eq!(store.stock_of(p.id).await, Some(dec!(1000.5)));
    }

    #[tokio::test]
    async fn commit_rejects_stale_version() {
        let store = InMemoryStore::new();
        let order = pending_order();
        let order_id = order.id;
        store.create_with_items(order, vec![]).await.unwrap();

        let commit = TransitionCommit {
            order_id,
            expected_version: 1,
            patch: OrderPatch {
                status: Some(OrderStatus::Confirmed),
                ..Default::default()
            },
            stock: None,
        };
        store.commit_transition(commit.clone()).await.unwrap();

        // Same expected version again: someone else committed first.
        let result = store.commit_transition(commit).await;
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn failed_stock_leaves_order_unchanged() {
        let store = InMemoryStore::new();
        let p = product(dec!(1), true);
        store.insert_product(p.clone()).await.unwrap();

        let order = pending_order();
        let order_id = order.id;
        store.create_with_items(order, vec![]).await.unwrap();

        let commit = TransitionCommit {
            order_id,
            expected_version: 1,
            patch: OrderPatch {
                status: Some(OrderStatus::Confirmed),
                ..Default::default()
            },
            stock: Some(StockBatch::decrement(vec![StockLine::new(p.id, dec!(5))])),
        };
        let result = store.commit_transition(commit).await;
        assert!(matches!(result, Err(StoreError::InsufficientStock { .. })));

        let stored = store.load(order_id).await.unwrap().unwrap();
        assert_eq!(stored.order.status, OrderStatus::Pending);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn party_names_are_unique() {
        let store = InMemoryStore::new();
        store
            .create_party_with_account("Order", "order@storefront.local")
            .await
            .unwrap();

        let result = store
            .create_party_with_account("Order", "order2@storefront.local")
            .await;
        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
        assert_eq!(store.party_count().await, 1);
    }

    #[tokio::test]
    async fn find_party_by_name_matches_exactly() {
        let store = InMemoryStore::new();
        let created = store
            .create_party_with_account("Order", "order@storefront.local")
            .await
            .unwrap();

        let found = store.find_party_by_name("Order").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(store.find_party_by_name("order").await.unwrap().is_none());
    }
}
