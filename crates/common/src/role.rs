//! Roles of the two identity stores and the unified role they map into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Role of a staff user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StaffRole {
    Administrator,
    #[default]
    Manager,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Administrator => "Administrator",
            StaffRole::Manager => "Manager",
        }
    }
}

/// Role of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CustomerRole {
    #[default]
    Student,
    Teacher,
}

impl CustomerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerRole::Student => "Student",
            CustomerRole::Teacher => "Teacher",
        }
    }
}

/// Whether a customer account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    #[default]
    Enabled,
    Disabled,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Enabled => "Enabled",
            AccountStatus::Disabled => "Disabled",
        }
    }
}

/// Every role known to the authorization layer, regardless of which
/// identity store it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Manager,
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Manager => "Manager",
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        }
    }

    /// Returns true for roles held by staff users.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Administrator | Role::Manager)
    }

    /// Returns true for roles held by customer accounts.
    pub fn is_customer(&self) -> bool {
        matches!(self, Role::Student | Role::Teacher)
    }
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Administrator => Role::Administrator,
            StaffRole::Manager => Role::Manager,
        }
    }
}

impl From<CustomerRole> for Role {
    fn from(role: CustomerRole) -> Self {
        match role {
            CustomerRole::Student => Role::Student,
            CustomerRole::Teacher => Role::Teacher,
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::role::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($ty::$variant),)+
                    other => Err($crate::role::ParseEnumError::new($kind, other)),
                }
            }
        }
    };
}

pub(crate) use display_and_parse;

display_and_parse!(StaffRole, "staff role", [Administrator, Manager]);
display_and_parse!(CustomerRole, "customer role", [Student, Teacher]);
display_and_parse!(AccountStatus, "account status", [Enabled, Disabled]);
display_and_parse!(Role, "role", [Administrator, Manager, Student, Teacher]);
