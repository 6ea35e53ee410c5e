use async_trait::async_trait;
use common::{AccountStatus, CategoryId, CustomerId, DishId, OrderId, OrderStatus, PayCode, StaffId};

use crate::Result;
use crate::records::{
    Account, Category, Customer, Dish, NewDish, NewOrder, NewPayment, NewRegistration,
    NewStaffUser, Order, Payment, Registration, StaffUser,
};

/// Staff users, customers and customer accounts.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates a staff user. Fails with `Conflict` on a taken username.
    async fn create_staff(&self, user: NewStaffUser) -> Result<StaffUser>;

    async fn find_staff(&self, id: StaffId) -> Result<Option<StaffUser>>;

    async fn find_staff_by_username(&self, username: &str) -> Result<Option<StaffUser>>;

    async fn list_staff(&self) -> Result<Vec<StaffUser>>;

    /// Replaces a staff user's mutable fields.
    async fn save_staff(&self, user: &StaffUser) -> Result<StaffUser>;

    async fn delete_staff(&self, id: StaffId) -> Result<()>;

    /// Creates a customer and its account atomically.
    ///
    /// Allocates the next `CUS` code. Either both records are written or
    /// neither is. Fails with `Conflict` if the email or the username is
    /// already taken.
    async fn register_customer(&self, registration: NewRegistration) -> Result<Registration>;

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>>;

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    async fn find_account_by_customer(&self, id: &CustomerId) -> Result<Option<Account>>;

    /// Enables or disables the account of a customer.
    async fn set_account_status(&self, id: &CustomerId, status: AccountStatus) -> Result<Account>;

    /// Deletes a customer, cascading to its account and orders.
    async fn delete_customer(&self, id: &CustomerId) -> Result<()>;
}

/// Dishes and categories.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish>;

    async fn find_dish(&self, id: DishId) -> Result<Option<Dish>>;

    async fn list_dishes(&self) -> Result<Vec<Dish>>;

    async fn save_dish(&self, dish: &Dish) -> Result<Dish>;

    /// Deletes a dish, cascading to the orders placed for it.
    async fn delete_dish(&self, id: DishId) -> Result<()>;

    /// Creates a category. Fails with `Conflict` on a taken name.
    async fn create_category(&self, name: &str) -> Result<Category>;

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>>;

    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn delete_category(&self, id: CategoryId) -> Result<()>;
}

/// Orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Allocates the next `ORD` code and persists the order as `Unpaid`.
    async fn insert_order(&self, order: NewOrder) -> Result<Order>;

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Returns all orders in code order.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Replaces an order's mutable fields and status if the stored order is
    /// still in `expected`.
    ///
    /// Returns `None` without writing anything when the status has moved
    /// since `expected` was read. The check and the write happen atomically.
    async fn save_order(&self, order: &Order, expected: OrderStatus) -> Result<Option<Order>>;

    /// Moves an order from `from` to `to` if it is currently in `from`.
    ///
    /// Returns `false` without writing when the order is in any other
    /// status. The check and the write happen atomically.
    async fn transition_order_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool>;

    /// Deletes an order. Fails with `Conflict` while payments reference it.
    async fn delete_order(&self, id: &OrderId) -> Result<()>;
}

/// Payment attempts.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Allocates the next `PAY` code and persists the attempt as `Waiting`.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment>;

    async fn find_payment(&self, code: &PayCode) -> Result<Option<Payment>>;

    async fn list_payments(&self) -> Result<Vec<Payment>>;

    async fn list_payments_for_order(&self, id: &OrderId) -> Result<Vec<Payment>>;

    /// Replaces a payment's mutable fields.
    async fn save_payment(&self, payment: &Payment) -> Result<Payment>;
}

/// Everything the services need from persistence.
pub trait Store:
    IdentityStore + CatalogStore + OrderStore + PaymentStore + Clone + 'static
{
}

// Blanket implementation for every type providing all four stores
impl<T> Store for T where
    T: IdentityStore + CatalogStore + OrderStore + PaymentStore + Clone + 'static
{
}
