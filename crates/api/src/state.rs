//! Shared application state.

use domain::{
    AccessPolicy, AuthService, CatalogService, CustomerService, OrderService, PaymentService,
    StaffService, TokenIssuer,
};
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub auth: AuthService<S>,
    pub policy: AccessPolicy,
    pub orders: OrderService<S>,
    pub payments: PaymentService<S>,
    pub catalog: CatalogService<S>,
    pub staff: StaffService<S>,
    pub customers: CustomerService<S>,
}

impl<S: Store> AppState<S> {
    /// Wires every service to `store` under the default access policy.
    pub fn new(store: S, tokens: TokenIssuer) -> Self {
        Self::with_policy(store, tokens, AccessPolicy::default())
    }

    pub fn with_policy(store: S, tokens: TokenIssuer, policy: AccessPolicy) -> Self {
        Self {
            auth: AuthService::new(store.clone(), tokens),
            policy,
            orders: OrderService::new(store.clone()),
            payments: PaymentService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            staff: StaffService::new(store.clone()),
            customers: CustomerService::new(store),
        }
    }
}
