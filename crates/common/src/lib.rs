//! Shared vocabulary for the canteen ordering platform.
//!
//! Everything in here is plain data: identifiers, money, roles, entity
//! statuses and the sequential code generator. Storage and services live in
//! the `store` and `domain` crates.

pub mod code;
pub mod money;
pub mod role;
pub mod status;
pub mod types;

pub use code::{CodePrefix, format_code, next_code, parse_sequence};
pub use money::{Money, MoneyError};
pub use role::{AccountStatus, CustomerRole, ParseEnumError, Role, StaffRole};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
pub use types::{CategoryId, CustomerId, DishId, OrderId, PayCode, StaffId};
