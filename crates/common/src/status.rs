//! Order and payment status enums and the order state machine.

use serde::{Deserialize, Serialize};

use crate::role::{ParseEnumError, display_and_parse};

/// The status of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Unpaid ──(payment completed)──► Paid
///    │                              │
///    └──────(administrative)────────┴──► Cancelled
/// ```
///
/// `Cancelled` is terminal and nothing moves an order from `Paid` back to
/// `Unpaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Created, waiting for a completed payment.
    #[default]
    Unpaid,

    /// A payment for the order completed.
    Paid,

    /// Cancelled by staff (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if a new payment attempt may be initiated in this status.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, OrderStatus::Unpaid)
    }

    /// Returns true if a completed payment moves the order to `Paid`.
    pub fn can_mark_paid(&self) -> bool {
        matches!(self, OrderStatus::Unpaid)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Unpaid | OrderStatus::Paid)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Returns true if moving from `self` to `target` is allowed.
    ///
    /// Staying in the same status is always allowed and is a no-op.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if *self == target {
            return true;
        }
        match target {
            OrderStatus::Unpaid => false,
            OrderStatus::Paid => self.can_mark_paid(),
            OrderStatus::Cancelled => self.can_cancel(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unpaid => "Unpaid",
            OrderStatus::Paid => "Paid",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// The status of a single payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Waiting,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Waiting => "Waiting",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }
}

/// Mobile-money channel used to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "MTN MoMo")]
    MtnMomo,
    #[serde(rename = "Orange Money")]
    OrangeMoney,
    #[serde(rename = "Wave")]
    Wave,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MtnMomo => "MTN MoMo",
            PaymentMethod::OrangeMoney => "Orange Money",
            PaymentMethod::Wave => "Wave",
        }
    }
}

display_and_parse!(OrderStatus, "order status", [Unpaid, Paid, Cancelled]);
display_and_parse!(PaymentStatus, "payment status", [Waiting, Completed, Failed]);

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MTN MoMo" => Ok(PaymentMethod::MtnMomo),
            "Orange Money" => Ok(PaymentMethod::OrangeMoney),
            "Wave" => Ok(PaymentMethod::Wave),
            other => Err(ParseEnumError::new("payment method", other)),
        }
    }
}
