//! Persisted record types.
//!
//! `New*` types carry what the caller supplies; the store fills in
//! generated identifiers, default statuses and timestamps.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{
    AccountStatus, CategoryId, CustomerId, CustomerRole, DishId, Money, OrderId, OrderStatus,
    PayCode, PaymentMethod, PaymentStatus, StaffId, StaffRole,
};
use serde::Serialize;

/// A staff identity (administrator or manager).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    pub id: StaffId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub username: String,
    pub password_hash: String,
    pub role: StaffRole,
}

/// A customer record, created at registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub lastname: String,
    pub firstname: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The sign-in identity of a customer. Exactly one per [`Customer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub customer_id: CustomerId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: CustomerRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create a customer and its account in one unit.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub lastname: String,
    pub firstname: String,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: CustomerRole,
}

/// The pair written by a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub customer: Customer,
    pub account: Account,
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub available: bool,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub available: bool,
    pub image_path: Option<String>,
}

/// A dish category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// An order for one dish by one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub dish_id: DishId,
    pub customer_id: CustomerId,
    pub category_id: CategoryId,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub price: Money,
    pub payment_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_deadline: DateTime<Utc>,
    pub delivery_date: NaiveDate,
    pub pay_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub dish_id: DishId,
    pub customer_id: CustomerId,
    pub category_id: CategoryId,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub price: Money,
    pub payment_phone: Option<String>,
    pub payment_deadline: DateTime<Utc>,
    pub delivery_date: NaiveDate,
    pub pay_method: Option<PaymentMethod>,
}

/// One payment attempt against an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub pay_code: PayCode,
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub amount: Money,
    pub payment_phone: Option<String>,
    pub transaction_number: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub amount: Money,
    pub payment_phone: Option<String>,
    pub transaction_number: String,
    pub payment_date: DateTime<Utc>,
}
