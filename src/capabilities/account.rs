//! Bank account and transaction capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// A bank account as listed on a banking portal's overview page.
#[derive(Debug, Clone, Default)]
pub struct Account {
    /// Identifier unique within the producing backend.
    pub id: String,

    /// Name of the backend that produced this object.
    pub backend: String,

    /// Account label as shown by the bank.
    pub label: Field<String>,

    /// Current balance.
    pub balance: Field<f64>,

    /// ISO currency code.
    pub currency: Field<String>,

    /// Sum of known upcoming operations, when the bank exposes it.
    pub coming: Field<f64>,
}

impl Account {
    pub fn new(id: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend: backend.into(),
            ..Self::default()
        }
    }

    pub fn full_id(&self) -> String {
        super::full_id(&self.id, &self.backend)
    }
}

/// One operation from an account history page.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub id: String,
    pub backend: String,

    /// Operation date as printed by the bank.
    pub date: Field<String>,

    /// Operation label.
    pub label: Field<String>,

    /// Signed amount.
    pub amount: Field<f64>,

    /// Bank-supplied category, when present.
    pub category: Field<String>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend: backend.into(),
            ..Self::default()
        }
    }
}

/// Capability trait for banking backends.
#[async_trait]
pub trait BankProvider: Send + Sync {
    /// Lists all accounts visible to the logged-in user.
    async fn iter_accounts(&self) -> Result<Vec<Account>, AdapterError>;

    /// Looks up one account by id.
    async fn get_account(&self, id: &str) -> Result<Option<Account>, AdapterError>;

    /// Lists the operation history of an account, following pagination
    /// until the site reports no further page.
    async fn iter_history(&self, account_id: &str) -> Result<Vec<Transaction>, AdapterError>;
}
