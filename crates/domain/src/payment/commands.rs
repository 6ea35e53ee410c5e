//! Payment commands.

use common::{Money, OrderId, PaymentMethod, PaymentStatus};
use serde::Deserialize;
use validator::Validate;

/// Command to start a payment attempt against an order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePayment {
    pub order_id: OrderId,
    pub amount: Money,
    pub method: PaymentMethod,

    #[validate(length(min = 1, max = 20, message = "paymentPhone must be 1 to 20 characters"))]
    pub payment_phone: String,
}

/// Provider callback reporting the outcome of a payment attempt.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatus {
    pub status: PaymentStatus,

    #[validate(length(
        min = 1,
        max = 64,
        message = "transactionNumber must be 1 to 64 characters"
    ))]
    #[serde(default)]
    pub transaction_number: Option<String>,
}

impl UpdatePaymentStatus {
    pub fn new(status: PaymentStatus) -> Self {
        Self {
            status,
            transaction_number: None,
        }
    }
}
