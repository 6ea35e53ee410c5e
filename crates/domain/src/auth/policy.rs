//! Role-based access decisions.
//!
//! Every protected operation declares the roles it requires in one table.
//! Handlers consult the table before dispatching to a service.

use std::collections::HashMap;

use common::Role;

use super::Principal;
use crate::error::DomainError;

const STAFF: &[Role] = &[Role::Administrator, Role::Manager];
const CUSTOMERS: &[Role] = &[Role::Student, Role::Teacher];
const ADMIN: &[Role] = &[Role::Administrator];
const ANY: &[Role] = &[];

/// An operation guarded by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOrder,
    ListOrders,
    GetOrder,
    UpdateOrder,
    DeleteOrder,
    ListOrderPayments,
    InitiatePayment,
    UpdatePaymentStatus,
    GetPayment,
    ListPayments,
    CreateStaff,
    ListStaff,
    GetStaff,
    UpdateStaff,
    DeleteStaff,
    SetAccountStatus,
    DeleteCustomer,
    CreateDish,
    ListDishes,
    GetDish,
    UpdateDish,
    DeleteDish,
    CreateCategory,
    ListCategories,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateOrder => "create order",
            Operation::ListOrders => "list orders",
            Operation::GetOrder => "get order",
            Operation::UpdateOrder => "update order",
            Operation::DeleteOrder => "delete order",
            Operation::ListOrderPayments => "list order payments",
            Operation::InitiatePayment => "initiate payment",
            Operation::UpdatePaymentStatus => "update payment status",
            Operation::GetPayment => "get payment",
            Operation::ListPayments => "list payments",
            Operation::CreateStaff => "create user",
            Operation::ListStaff => "list users",
            Operation::GetStaff => "get user",
            Operation::UpdateStaff => "update user",
            Operation::DeleteStaff => "delete user",
            Operation::SetAccountStatus => "set account status",
            Operation::DeleteCustomer => "delete customer",
            Operation::CreateDish => "create dish",
            Operation::ListDishes => "list dishes",
            Operation::GetDish => "get dish",
            Operation::UpdateDish => "update dish",
            Operation::DeleteDish => "delete dish",
            Operation::CreateCategory => "create category",
            Operation::ListCategories => "list categories",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `principal` satisfies `required`.
///
/// An empty requirement admits any authenticated principal. Otherwise the
/// principal's role must be listed, whichever store it came from.
pub fn is_allowed(required: &[Role], principal: &Principal) -> bool {
    required.is_empty() || required.contains(&principal.role())
}

/// The operation-to-roles table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: HashMap<Operation, &'static [Role]>,
}

impl AccessPolicy {
    /// Creates a policy with no rules; every operation is denied.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Sets the roles required for `operation`.
    pub fn with_rule(mut self, operation: Operation, required: &'static [Role]) -> Self {
        self.rules.insert(operation, required);
        self
    }

    /// Returns the roles required for `operation`, if it has a rule.
    pub fn required_roles(&self, operation: Operation) -> Option<&'static [Role]> {
        self.rules.get(&operation).copied()
    }

    /// Fails with `Forbidden` unless `principal` may perform `operation`.
    ///
    /// Operations without a rule are denied.
    pub fn check(&self, operation: Operation, principal: &Principal) -> Result<(), DomainError> {
        match self.required_roles(operation) {
            Some(required) if is_allowed(required, principal) => Ok(()),
            _ => {
                tracing::debug!(
                    operation = %operation,
                    role = %principal.role(),
                    "Access denied"
                );
                Err(DomainError::Forbidden(format!(
                    "Role {} may not {}",
                    principal.role(),
                    operation
                )))
            }
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        use Operation::*;

        Self::empty()
            .with_rule(CreateOrder, CUSTOMERS)
            .with_rule(ListOrders, ANY)
            .with_rule(GetOrder, ANY)
            .with_rule(UpdateOrder, STAFF)
            .with_rule(DeleteOrder, ADMIN)
            .with_rule(ListOrderPayments, ANY)
            .with_rule(InitiatePayment, CUSTOMERS)
            .with_rule(UpdatePaymentStatus, STAFF)
            .with_rule(GetPayment, ANY)
            .with_rule(ListPayments, STAFF)
            .with_rule(CreateStaff, ADMIN)
            .with_rule(ListStaff, STAFF)
            .with_rule(GetStaff, STAFF)
            .with_rule(UpdateStaff, ADMIN)
            .with_rule(DeleteStaff, ADMIN)
            .with_rule(SetAccountStatus, ADMIN)
            .with_rule(DeleteCustomer, ADMIN)
            .with_rule(CreateDish, STAFF)
            .with_rule(ListDishes, ANY)
            .with_rule(GetDish, ANY)
            .with_rule(UpdateDish, STAFF)
            .with_rule(DeleteDish, STAFF)
            .with_rule(CreateCategory, STAFF)
            .with_rule(ListCategories, ANY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, CustomerRole, StaffId, StaffRole};

    fn staff(role: StaffRole) -> Principal {
        Principal::Staff {
            id: StaffId::new(1),
            username: "staff".to_string(),
            role,
        }
    }

    fn customer(role: CustomerRole) -> Principal {
        Principal::Customer {
            customer_id: CustomerId::new("CUS0001"),
            username: "customer".to_string(),
            role,
        }
    }

    #[test]
    fn empty_requirement_admits_everyone() {
        assert!(is_allowed(&[], &staff(StaffRole::Manager)));
        assert!(is_allowed(&[], &customer(CustomerRole::Student)));
    }

    #[test]
    fn membership_ignores_identity_store() {
        let required = [Role::Manager, Role::Teacher];
        assert!(is_allowed(&required, &staff(StaffRole::Manager)));
        assert!(is_allowed(&required, &customer(CustomerRole::Teacher)));
        assert!(!is_allowed(&required, &staff(StaffRole::Administrator)));
        assert!(!is_allowed(&required, &customer(CustomerRole::Student)));
    }

    #[test]
    fn default_table_guards_orders_and_payments() {
        let policy = AccessPolicy::default();
        let student = customer(CustomerRole::Student);
        let manager = staff(StaffRole::Manager);
        let admin = staff(StaffRole::Administrator);

        assert!(policy.check(Operation::CreateOrder, &student).is_ok());
        assert!(policy.check(Operation::CreateOrder, &admin).is_err());
        assert!(policy.check(Operation::UpdateOrder, &manager).is_ok());
        assert!(policy.check(Operation::UpdateOrder, &student).is_err());
        assert!(policy.check(Operation::DeleteOrder, &admin).is_ok());
        assert!(policy.check(Operation::DeleteOrder, &manager).is_err());
        assert!(policy.check(Operation::GetPayment, &student).is_ok());
        assert!(policy.check(Operation::ListPayments, &student).is_err());
        assert!(policy.check(Operation::UpdatePaymentStatus, &manager).is_ok());
        assert!(policy.check(Operation::SetAccountStatus, &admin).is_ok());
        assert!(policy.check(Operation::SetAccountStatus, &manager).is_err());
        assert!(policy.check(Operation::DeleteCustomer, &student).is_err());
    }

    #[test]
    fn missing_rule_is_denied() {
        let policy = AccessPolicy::empty().with_rule(Operation::ListOrders, ANY);
        let admin = staff(StaffRole::Administrator);

        assert!(policy.check(Operation::ListOrders, &admin).is_ok());
        let err = policy.check(Operation::ListStaff, &admin).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
