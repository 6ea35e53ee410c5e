pub mod auth;
pub mod categories;
pub mod customers;
pub mod dishes;
pub mod orders;
pub mod payments;
pub mod system;
pub mod users;
