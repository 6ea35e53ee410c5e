use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    AccountStatus, CategoryId, CodePrefix, CustomerId, DishId, OrderId, OrderStatus, PayCode,
    PaymentStatus, StaffId, next_code,
};
use tokio::sync::RwLock;

use crate::records::{
    Account, Category, Customer, Dish, NewDish, NewOrder, NewPayment, NewRegistration,
    NewStaffUser, Order, Payment, Registration, StaffUser,
};
use crate::store::{CatalogStore, IdentityStore, OrderStore, PaymentStore};
use crate::{Result, StoreError};

#[derive(Default)]
struct State {
    staff: BTreeMap<StaffId, StaffUser>,
    customers: BTreeMap<CustomerId, Customer>,
    accounts: BTreeMap<i64, Account>,
    dishes: BTreeMap<DishId, Dish>,
    categories: BTreeMap<CategoryId, Category>,
    orders: BTreeMap<OrderId, Order>,
    payments: BTreeMap<PayCode, Payment>,
    last_staff_id: i64,
    last_account_id: i64,
    last_dish_id: i64,
    last_category_id: i64,
}

impl State {
    fn has_payments(&self, order: &OrderId) -> bool {
        self.payments.values().any(|p| &p.order_id == order)
    }

    /// Removes every order matching `pred`, refusing if any has payments.
    fn cascade_orders(&mut self, pred: impl Fn(&Order) -> bool) -> Result<()> {
        let doomed: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| pred(o))
            .map(|o| o.id.clone())
            .collect();

        if let Some(blocked) = doomed.iter().find(|id| self.has_payments(id)) {
            return Err(StoreError::Conflict(format!(
                "order {blocked} has payments"
            )));
        }

        for id in doomed {
            self.orders.remove(&id);
        }
        Ok(())
    }
}

/// Orders codes numerically: shorter codes first, then lexicographically.
fn code_order(a: &str, b: &str) -> std::cmp::Ordering {
    (a.len(), a).cmp(&(b.len(), b))
}

/// In-memory store implementation.
///
/// All records live behind a single lock, so every write (including code
/// allocation) is serialized. Used by tests and when no database is
/// configured.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the total number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn create_staff(&self, user: NewStaffUser) -> Result<StaffUser> {
        let mut state = self.state.write().await;

        if state.staff.values().any(|s| s.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username {} is taken",
                user.username
            )));
        }

        state.last_staff_id += 1;
        let now = Utc::now();
        let record = StaffUser {
            id: StaffId::new(state.last_staff_id),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.staff.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_staff(&self, id: StaffId) -> Result<Option<StaffUser>> {
        Ok(self.state.read().await.staff.get(&id).cloned())
    }

    async fn find_staff_by_username(&self, username: &str) -> Result<Option<StaffUser>> {
        let state = self.state.read().await;
        Ok(state
            .staff
            .values()
            .find(|s| s.username == username)
            .cloned())
    }

    async fn list_staff(&self) -> Result<Vec<StaffUser>> {
        Ok(self.state.read().await.staff.values().cloned().collect())
    }

    async fn save_staff(&self, user: &StaffUser) -> Result<StaffUser> {
        let mut state = self.state.write().await;

        if state
            .staff
            .values()
            .any(|s| s.id != user.id && s.username == user.username)
        {
            return Err(StoreError::Conflict(format!(
                "username {} is taken",
                user.username
            )));
        }

        let existing = state
            .staff
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::not_found("staff user", user.id))?;
        existing.username = user.username.clone();
        existing.password_hash = user.password_hash.clone();
        existing.role = user.role;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_staff(&self, id: StaffId) -> Result<()> {
        self.state
            .write()
            .await
            .staff
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("staff user", id))
    }

    async fn register_customer(&self, registration: NewRegistration) -> Result<Registration> {
        let mut state = self.state.write().await;

        if state
            .customers
            .values()
            .any(|c| c.email == registration.email)
        {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                registration.email
            )));
        }
        if state
            .accounts
            .values()
            .any(|a| a.username == registration.username)
        {
            return Err(StoreError::Conflict(format!(
                "username {} is taken",
                registration.username
            )));
        }

        let code = next_code(
            CodePrefix::Customer,
            state.customers.keys().map(CustomerId::as_str),
        );
        let id = CustomerId::new(code);
        let now = Utc::now();

        let customer = Customer {
            id: id.clone(),
            lastname: registration.lastname,
            firstname: registration.firstname,
            phone: registration.phone,
            email: registration.email,
            created_at: now,
        };

        state.last_account_id += 1;
        let account = Account {
            id: state.last_account_id,
            customer_id: id.clone(),
            username: registration.username,
            password_hash: registration.password_hash,
            role: registration.role,
            status: AccountStatus::Enabled,
            created_at: now,
        };

        state.customers.insert(id, customer.clone());
        state.accounts.insert(account.id, account.clone());

        Ok(Registration { customer, account })
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>> {
        Ok(self.state.read().await.customers.get(id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_account_by_customer(&self, id: &CustomerId) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| &a.customer_id == id)
            .cloned())
    }

    async fn set_account_status(&self, id: &CustomerId, status: AccountStatus) -> Result<Account> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .values_mut()
            .find(|a| &a.customer_id == id)
            .ok_or_else(|| StoreError::not_found("account", id))?;
        account.status = status;
        Ok(account.clone())
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.customers.contains_key(id) {
            return Err(StoreError::not_found("customer", id));
        }

        state.cascade_orders(|o| &o.customer_id == id)?;
        state.accounts.retain(|_, a| &a.customer_id != id);
        state.customers.remove(id);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish> {
        let mut state = self.state.write().await;
        state.last_dish_id += 1;
        let record = Dish {
            id: DishId::new(state.last_dish_id),
            name: dish.name,
            description: dish.description,
            price: dish.price,
            available: dish.available,
            image_path: dish.image_path,
        };
        state.dishes.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_dish(&self, id: DishId) -> Result<Option<Dish>> {
        Ok(self.state.read().await.dishes.get(&id).cloned())
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>> {
        Ok(self.state.read().await.dishes.values().cloned().collect())
    }

    async fn save_dish(&self, dish: &Dish) -> Result<Dish> {
        let mut state = self.state.write().await;
        let existing = state
            .dishes
            .get_mut(&dish.id)
            .ok_or_else(|| StoreError::not_found("dish", dish.id))?;
        *existing = dish.clone();
        Ok(existing.clone())
    }

    async fn delete_dish(&self, id: DishId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.dishes.contains_key(&id) {
            return Err(StoreError::not_found("dish", id));
        }

        state.cascade_orders(|o| o.dish_id == id)?;
        state.dishes.remove(&id);
        Ok(())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let mut state = self.state.write().await;

        if state.categories.values().any(|c| c.name == name) {
            return Err(StoreError::Conflict(format!(
                "category {name} already exists"
            )));
        }

        state.last_category_id += 1;
        let record = Category {
            id: CategoryId::new(state.last_category_id),
            name: name.to_string(),
        };
        state.categories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.categories.contains_key(&id) {
            return Err(StoreError::not_found("category", id));
        }

        state.cascade_orders(|o| o.category_id == id)?;
        state.categories.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;

        if !state.dishes.contains_key(&order.dish_id) {
            return Err(StoreError::not_found("dish", order.dish_id));
        }
        if !state.customers.contains_key(&order.customer_id) {
            return Err(StoreError::not_found("customer", &order.customer_id));
        }
        if !state.categories.contains_key(&order.category_id) {
            return Err(StoreError::not_found("category", order.category_id));
        }

        let code = next_code(
            CodePrefix::Order,
            state.orders.keys().map(OrderId::as_str),
        );
        let now = Utc::now();
        let record = Order {
            id: OrderId::new(code),
            dish_id: order.dish_id,
            customer_id: order.customer_id,
            category_id: order.category_id,
            order_date: order.order_date,
            order_time: order.order_time,
            price: order.price,
            payment_phone: order.payment_phone,
            status: OrderStatus::Unpaid,
            payment_deadline: order.payment_deadline,
            delivery_date: order.delivery_date,
            pay_method: order.pay_method,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| code_order(a.id.as_str(), b.id.as_str()));
        Ok(orders)
    }

    async fn save_order(&self, order: &Order, expected: OrderStatus) -> Result<Option<Order>> {
        let mut state = self.state.write().await;

        if !state.dishes.contains_key(&order.dish_id) {
            return Err(StoreError::not_found("dish", order.dish_id));
        }
        if !state.customers.contains_key(&order.customer_id) {
            return Err(StoreError::not_found("customer", &order.customer_id));
        }
        if !state.categories.contains_key(&order.category_id) {
            return Err(StoreError::not_found("category", order.category_id));
        }

        let existing = state
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::not_found("order", &order.id))?;
        if existing.status != expected {
            return Ok(None);
        }
        *existing = Order {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..order.clone()
        };
        Ok(Some(existing.clone()))
    }

    async fn transition_order_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("order", id))?;

        if order.status != from {
            return Ok(false);
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_order(&self, id: &OrderId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.orders.contains_key(id) {
            return Err(StoreError::not_found("order", id));
        }
        if state.has_payments(id) {
            return Err(StoreError::Conflict(format!("order {id} has payments")));
        }
        state.orders.remove(id);
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment> {
        let mut state = self.state.write().await;

        if !state.orders.contains_key(&payment.order_id) {
            return Err(StoreError::not_found("order", &payment.order_id));
        }

        let code = next_code(
            CodePrefix::Payment,
            state.payments.keys().map(PayCode::as_str),
        );
        let now = Utc::now();
        let record = Payment {
            pay_code: PayCode::new(code),
            order_id: payment.order_id,
            method: payment.method,
            amount: payment.amount,
            payment_phone: payment.payment_phone,
            transaction_number: Some(payment.transaction_number),
            payment_date: Some(payment.payment_date),
            status: PaymentStatus::Waiting,
            created_at: now,
            updated_at: now,
        };
        state
            .payments
            .insert(record.pay_code.clone(), record.clone());
        Ok(record)
    }

    async fn find_payment(&self, code: &PayCode) -> Result<Option<Payment>> {
        Ok(self.state.read().await.payments.get(code).cloned())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<_> = state.payments.values().cloned().collect();
        payments.sort_by(|a, b| code_order(a.pay_code.as_str(), b.pay_code.as_str()));
        Ok(payments)
    }

    async fn list_payments_for_order(&self, id: &OrderId) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<_> = state
            .payments
            .values()
            .filter(|p| &p.order_id == id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| code_order(a.pay_code.as_str(), b.pay_code.as_str()));
        Ok(payments)
    }

    async fn save_payment(&self, payment: &Payment) -> Result<Payment> {
        let mut state = self.state.write().await;
        let existing = state
            .payments
            .get_mut(&payment.pay_code)
            .ok_or_else(|| StoreError::not_found("payment", &payment.pay_code))?;
        let created_at = existing.created_at;
        *existing = Payment {
            created_at,
            updated_at: Utc::now(),
            ..payment.clone()
        };
        Ok(existing.clone())
    }
}
