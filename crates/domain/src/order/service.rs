//! Order service: creation, the joined read model, updates and removal.

use std::collections::HashMap;

use common::{CategoryId, CustomerId, DishId, OrderId};
use serde::Serialize;
use store::{Category, Customer, Dish, NewOrder, Order, Store};
use validator::Validate;

use super::{CreateOrder, UpdateOrder};
use crate::error::DomainError;

/// An order joined with the records it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub dish: Option<Dish>,
    pub customer: Option<Customer>,
    pub category: Option<Category>,
}

/// Service for managing orders.
#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order for an available dish.
    ///
    /// The order starts `Unpaid` with the next `ORD` code.
    #[tracing::instrument(skip(self, cmd), fields(dish_id = %cmd.dish_id, customer_id = %cmd.customer_id))]
    pub async fn create(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        cmd.validate()?;

        let dish = self
            .store
            .find_dish(cmd.dish_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Dish {} not found", cmd.dish_id)))?;
        if !dish.available {
            return Err(DomainError::Unavailable(format!(
                "Dish \"{}\" is not available",
                dish.name
            )));
        }
        if self.store.find_customer(&cmd.customer_id).await?.is_none() {
            return Err(DomainError::NotFound(format!(
                "Customer {} not found",
                cmd.customer_id
            )));
        }
        if self.store.find_category(cmd.category_id).await?.is_none() {
            return Err(DomainError::NotFound(format!(
                "Category {} not found",
                cmd.category_id
            )));
        }

        let price = cmd.price.unwrap_or(dish.price);
        if price.is_negative() {
            return Err(DomainError::BadRequest("price must not be negative".to_string()));
        }

        let order = self
            .store
            .insert_order(NewOrder {
                dish_id: cmd.dish_id,
                customer_id: cmd.customer_id,
                category_id: cmd.category_id,
                order_date: cmd.order_date,
                order_time: cmd.order_time,
                price,
                payment_phone: cmd.payment_phone,
                payment_deadline: cmd.payment_deadline,
                delivery_date: cmd.delivery_date,
                pay_method: cmd.pay_method,
            })
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, price = %order.price, "Order created");

        Ok(order)
    }

    /// Returns an order without its joined records.
    pub async fn find(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.store
            .find_order(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Order {id} not found")))
    }

    /// Returns an order joined with its dish, customer and category.
    pub async fn get(&self, id: &OrderId) -> Result<OrderDetails, DomainError> {
        let order = self.find(id).await?;

        Ok(OrderDetails {
            dish: self.store.find_dish(order.dish_id).await?,
            customer: self.store.find_customer(&order.customer_id).await?,
            category: self.store.find_category(order.category_id).await?,
            order,
        })
    }

    /// Returns every order joined with its references, in code order.
    pub async fn list(&self) -> Result<Vec<OrderDetails>, DomainError> {
        let orders = self.store.list_orders().await?;

        let dishes: HashMap<DishId, Dish> = self
            .store
            .list_dishes()
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        let categories: HashMap<CategoryId, Category> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut customers: HashMap<CustomerId, Option<Customer>> = HashMap::new();
        for order in &orders {
            if !customers.contains_key(&order.customer_id) {
                let customer = self.store.find_customer(&order.customer_id).await?;
                customers.insert(order.customer_id.clone(), customer);
            }
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                dish: dishes.get(&order.dish_id).cloned(),
                customer: customers.get(&order.customer_id).cloned().flatten(),
                category: categories.get(&order.category_id).cloned(),
                order,
            })
            .collect())
    }

    /// Merges `patch` into an order.
    ///
    /// Changed references must exist (`BadRequest` otherwise). A status
    /// change must be allowed by the order state machine (`InvalidState`
    /// otherwise). The merged fields and the new status are written in one
    /// step guarded by the status read here, so a concurrent status change
    /// fails the whole update with `InvalidState` and writes nothing.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &OrderId, patch: UpdateOrder) -> Result<Order, DomainError> {
        patch.validate()?;

        let mut order = self.find(id).await?;

        if let Some(dish_id) = patch.dish_id {
            if self.store.find_dish(dish_id).await?.is_none() {
                return Err(DomainError::BadRequest(format!("Dish {dish_id} not found")));
            }
            order.dish_id = dish_id;
        }
        if let Some(customer_id) = patch.customer_id {
            if self.store.find_customer(&customer_id).await?.is_none() {
                return Err(DomainError::BadRequest(format!(
                    "Customer {customer_id} not found"
                )));
            }
            order.customer_id = customer_id;
        }
        if let Some(category_id) = patch.category_id {
            if self.store.find_category(category_id).await?.is_none() {
                return Err(DomainError::BadRequest(format!(
                    "Category {category_id} not found"
                )));
            }
            order.category_id = category_id;
        }
        if let Some(price) = patch.price {
            if price.is_negative() {
                return Err(DomainError::BadRequest("price must not be negative".to_string()));
            }
            order.price = price;
        }
        if let Some(target) = patch.status {
            if target != order.status && !order.status.can_transition_to(target) {
                return Err(DomainError::InvalidState(format!(
                    "Order {id} cannot move from {} to {target}",
                    order.status
                )));
            }
        }

        if let Some(date) = patch.order_date {
            order.order_date = date;
        }
        if let Some(time) = patch.order_time {
            order.order_time = time;
        }
        if let Some(phone) = patch.payment_phone {
            order.payment_phone = Some(phone);
        }
        if let Some(deadline) = patch.payment_deadline {
            order.payment_deadline = deadline;
        }
        if let Some(date) = patch.delivery_date {
            order.delivery_date = date;
        }
        if let Some(method) = patch.pay_method {
            order.pay_method = Some(method);
        }

        let current = order.status;
        if let Some(target) = patch.status {
            order.status = target;
        }

        // Fields and status land together, or not at all
        let saved = self
            .store
            .save_order(&order, current)
            .await?
            .ok_or_else(|| {
                DomainError::InvalidState(format!("Order {id} is no longer {current}"))
            })?;

        if saved.status != current {
            metrics::counter!("orders_status_changed_total", "to" => saved.status.as_str())
                .increment(1);
            tracing::info!(
                order_id = %id,
                from = %current,
                to = %saved.status,
                "Order status changed"
            );
        }

        Ok(saved)
    }

    /// Deletes an order.
    ///
    /// Fails with `Conflict` while payment attempts reference it.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &OrderId) -> Result<(), DomainError> {
        self.store.delete_order(id).await?;
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }
}
