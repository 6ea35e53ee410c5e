//! Order lifecycle.
//!
//! Orders are created `Unpaid`, become `Paid` when a payment completes, and
//! can be cancelled by staff from either state. See
//! [`OrderStatus`](common::OrderStatus) for the state machine.

mod commands;
mod service;

pub use commands::{CreateOrder, UpdateOrder};
pub use service::{OrderDetails, OrderService};
