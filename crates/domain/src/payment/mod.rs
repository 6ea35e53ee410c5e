//! Payment attempts and their propagation onto orders.
//!
//! Every attempt is its own record starting in `Waiting`. Retries create new
//! records. The first attempt reported `Completed` moves its order from
//! `Unpaid` to `Paid`; later completions leave the order alone.

mod commands;
mod service;

pub use commands::{InitiatePayment, UpdatePaymentStatus};
pub use service::{PaymentService, transaction_reference};
