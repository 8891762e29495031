//! Order persistence
//!
//! One record per `orderId`; a second write with the same id replaces the
//! first.

mod dynamo;

pub use dynamo::{DynamoStore, order_to_item};

use async_trait::async_trait;
use dashmap::DashMap;
use shared::Order;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DynamoDB put_item failed: {0}")]
    Dynamo(String),
}

/// Single-record upsert keyed by order id
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn put_order(&self, order: &Order) -> Result<(), StoreError>;
}

/// In-process store for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: DashMap<String, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.get(order_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn put_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.insert(order.order_id.clone(), order.clone());
        tracing::debug!(order_id = %order.order_id, "Order kept in memory");
        Ok(())
    }
}
