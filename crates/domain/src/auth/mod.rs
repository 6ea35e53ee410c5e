//! Authentication and authorization.
//!
//! Credentials are resolved against the customer accounts first and the
//! staff users second. Either way the result is a [`Principal`] carrying a
//! single [`Role`](common::Role), which is all [`AccessPolicy`] looks at.

mod commands;
pub mod password;
mod policy;
mod principal;
mod service;
mod token;

pub use commands::{Login, RegisterCustomer};
pub use policy::{AccessPolicy, Operation, is_allowed};
pub use principal::Principal;
pub use service::AuthService;
pub use token::{Claims, TokenConfig, TokenError, TokenIssuer};
