use common::{CustomerId, CustomerRole, Role, StaffId, StaffRole};

/// The identity behind an authenticated request.
///
/// Staff users and customer accounts live in separate stores; a principal
/// unifies them behind a single [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Staff {
        id: StaffId,
        username: String,
        role: StaffRole,
    },
    Customer {
        customer_id: CustomerId,
        username: String,
        role: CustomerRole,
    },
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Staff { role, .. } => (*role).into(),
            Principal::Customer { role, .. } => (*role).into(),
        }
    }

    /// The token subject: the staff id rendered as a string, or the
    /// customer code.
    pub fn subject_id(&self) -> String {
        match self {
            Principal::Staff { id, .. } => id.to_string(),
            Principal::Customer { customer_id, .. } => customer_id.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Principal::Staff { username, .. } | Principal::Customer { username, .. } => username,
        }
    }

    /// Returns the customer code for customer principals.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        match self {
            Principal::Customer { customer_id, .. } => Some(customer_id),
            Principal::Staff { .. } => None,
        }
    }
}
