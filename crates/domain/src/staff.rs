//! Staff user management.

use common::{StaffId, StaffRole};
use serde::Deserialize;
use store::{NewStaffUser, StaffUser, Store};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::DomainError;

/// Command to create a staff user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaff {
    #[validate(length(min = 3, max = 20, message = "username must be 3 to 20 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to `Manager`.
    #[serde(default)]
    pub role: Option<StaffRole>,
}

/// Partial update of a staff user. A new password is hashed before storage.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateStaff {
    #[validate(length(min = 3, max = 20, message = "username must be 3 to 20 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,

    pub role: Option<StaffRole>,
}

/// Service for administrators and managers.
#[derive(Clone)]
pub struct StaffService<S: Store> {
    store: S,
}

impl<S: Store> StaffService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, cmd), fields(username = %cmd.username))]
    pub async fn create(&self, cmd: CreateStaff) -> Result<StaffUser, DomainError> {
        cmd.validate()?;

        let user = self
            .store
            .create_staff(NewStaffUser {
                username: cmd.username,
                password_hash: hash_password(&cmd.password)?,
                role: cmd.role.unwrap_or_default(),
            })
            .await?;

        tracing::info!(staff_id = %user.id, role = %user.role, "Staff user created");
        Ok(user)
    }

    pub async fn get(&self, id: StaffId) -> Result<StaffUser, DomainError> {
        self.store
            .find_staff(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<StaffUser>, DomainError> {
        Ok(self.store.list_staff().await?)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: StaffId, patch: UpdateStaff) -> Result<StaffUser, DomainError> {
        patch.validate()?;

        let mut user = self.get(id).await?;
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(password) = patch.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        Ok(self.store.save_staff(&user).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: StaffId) -> Result<(), DomainError> {
        self.store.delete_staff(id).await?;
        tracing::info!(staff_id = %id, "Staff user deleted");
        Ok(())
    }

    /// Creates an administrator named `username` unless one already exists.
    ///
    /// Returns the created user, or `None` when the username was taken.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<StaffUser>, DomainError> {
        if self.store.find_staff_by_username(username).await?.is_some() {
            tracing::debug!(username, "Bootstrap administrator already exists");
            return Ok(None);
        }

        let user = self
            .create(CreateStaff {
                username: username.to_string(),
                password: password.to_string(),
                role: Some(StaffRole::Administrator),
            })
            .await?;
        Ok(Some(user))
    }
}
