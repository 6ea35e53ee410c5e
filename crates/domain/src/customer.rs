//! Customer administration: disabling accounts and removing customers.

use common::{AccountStatus, CustomerId};
use serde::Deserialize;
use store::{Account, Store};

use crate::error::DomainError;

/// Command to enable or disable a customer account.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAccountStatus {
    pub status: AccountStatus,
}

/// Service for administering registered customers.
#[derive(Clone)]
pub struct CustomerService<S: Store> {
    store: S,
}

impl<S: Store> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Sets the status of a customer's account.
    ///
    /// A disabled account can no longer sign in, and tokens already issued
    /// for it stop resolving.
    #[tracing::instrument(skip(self, cmd), fields(status = %cmd.status))]
    pub async fn set_status(
        &self,
        id: &CustomerId,
        cmd: SetAccountStatus,
    ) -> Result<Account, DomainError> {
        if self.store.find_customer(id).await?.is_none() {
            return Err(DomainError::NotFound(format!("Customer {id} not found")));
        }

        let account = self.store.set_account_status(id, cmd.status).await?;
        tracing::info!(customer_id = %id, status = %account.status, "Account status changed");
        Ok(account)
    }

    /// Deletes a customer together with its account and orders.
    ///
    /// Fails with `Conflict` while any of its orders has payment attempts.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &CustomerId) -> Result<(), DomainError> {
        self.store.delete_customer(id).await?;
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}
