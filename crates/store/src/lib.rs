pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{
    Account, Category, Customer, Dish, NewDish, NewOrder, NewPayment, NewRegistration,
    NewStaffUser, Order, Payment, Registration, StaffUser,
};
pub use store::{CatalogStore, IdentityStore, OrderStore, PaymentStore, Store};
