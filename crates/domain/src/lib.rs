//! Domain layer for the canteen ordering platform.
//!
//! This crate provides:
//! - Authentication across staff users and customer accounts, bearer tokens,
//!   and the role table guarding every operation
//! - The order lifecycle with its `Unpaid → Paid → Cancelled` state machine
//! - Payment attempts with amount reconciliation and paid propagation
//! - Catalog, staff and customer administration
//!
//! Services are generic over [`store::Store`] and cheap to clone.

pub mod auth;
pub mod catalog;
pub mod customer;
pub mod error;
pub mod order;
pub mod payment;
pub mod staff;

pub use auth::{
    AccessPolicy, AuthService, Claims, Login, Operation, Principal, RegisterCustomer,
    TokenConfig, TokenError, TokenIssuer, is_allowed,
};
pub use catalog::{CatalogService, CreateCategory, CreateDish, UpdateDish};
pub use customer::{CustomerService, SetAccountStatus};
pub use error::DomainError;
pub use order::{CreateOrder, OrderDetails, OrderService, UpdateOrder};
pub use payment::{InitiatePayment, PaymentService, UpdatePaymentStatus};
pub use staff::{CreateStaff, StaffService, UpdateStaff};
