use serde::{Deserialize, Serialize};

use crate::action_framework::{Operation, Resource, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// A payment attempt for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resource for Transaction {
    type Id = i64;

    const KIND: ResourceKind = ResourceKind::Transaction;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn supports(operation: Operation) -> bool {
        matches!(operation, Operation::Read)
    }
}
