//! Order commands.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{CategoryId, CustomerId, DishId, Money, OrderStatus, PaymentMethod};
use serde::Deserialize;
use validator::Validate;

/// Command to place a new order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub dish_id: DishId,
    pub customer_id: CustomerId,
    pub category_id: CategoryId,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,

    /// Defaults to the dish price.
    #[serde(default)]
    pub price: Option<Money>,

    #[validate(length(max = 20, message = "paymentPhone must be at most 20 characters"))]
    #[serde(default)]
    pub payment_phone: Option<String>,

    pub payment_deadline: DateTime<Utc>,
    pub delivery_date: NaiveDate,

    #[serde(default)]
    pub pay_method: Option<PaymentMethod>,
}

/// Partial update of an order. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrder {
    pub dish_id: Option<DishId>,
    pub customer_id: Option<CustomerId>,
    pub category_id: Option<CategoryId>,
    pub order_date: Option<NaiveDate>,
    pub order_time: Option<NaiveTime>,
    pub price: Option<Money>,

    #[validate(length(max = 20, message = "paymentPhone must be at most 20 characters"))]
    pub payment_phone: Option<String>,

    pub status: Option<OrderStatus>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub delivery_date: Option<NaiveDate>,
    pub pay_method: Option<PaymentMethod>,
}

impl UpdateOrder {
    /// Creates an update that only changes the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
