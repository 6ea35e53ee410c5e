//! Authentication commands.

use common::CustomerRole;
use serde::Deserialize;
use validator::Validate;

/// Command to register a new customer with its account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomer {
    #[validate(length(min = 1, max = 30, message = "lastname must be 1 to 30 characters"))]
    pub lastname: String,

    #[validate(length(min = 1, max = 50, message = "firstname must be 1 to 50 characters"))]
    pub firstname: String,

    #[validate(length(min = 1, max = 20, message = "phone must be 1 to 20 characters"))]
    pub phone: String,

    #[validate(
        email(message = "email must be a valid address"),
        length(max = 100, message = "email must be at most 100 characters")
    )]
    pub email: String,

    #[validate(length(min = 3, max = 20, message = "username must be 3 to 20 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to `Student`.
    #[serde(default)]
    pub role: Option<CustomerRole>,
}

/// Command to sign in with a username and password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Login {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterCustomer {
        RegisterCustomer {
            lastname: "Diallo".to_string(),
            firstname: "Awa".to_string(),
            phone: "+221700000000".to_string(),
            email: "awa@example.com".to_string(),
            username: "awa".to_string(),
            password: "secret123".to_string(),
            role: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_bad_fields() {
        let short_username = RegisterCustomer {
            username: "aw".to_string(),
            ..valid()
        };
        assert!(short_username.validate().is_err());

        let short_password = RegisterCustomer {
            password: "12345".to_string(),
            ..valid()
        };
        assert!(short_password.validate().is_err());

        let bad_email = RegisterCustomer {
            email: "not-an-email".to_string(),
            ..valid()
        };
        assert!(bad_email.validate().is_err());

        let long_lastname = RegisterCustomer {
            lastname: "x".repeat(31),
            ..valid()
        };
        assert!(long_lastname.validate().is_err());
    }
}
