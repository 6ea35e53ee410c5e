//! Identity resolution across the staff and customer stores.

use common::{AccountStatus, CustomerId, Role, StaffId};
use store::{NewRegistration, Registration, Store};
use validator::Validate;

use super::password::{dummy_verify, hash_password, verify_password};
use super::{Claims, Login, Principal, RegisterCustomer, TokenError, TokenIssuer};
use crate::error::DomainError;

/// Registers customers, signs principals in, and resolves tokens back
/// into principals.
#[derive(Clone)]
pub struct AuthService<S: Store> {
    store: S,
    tokens: TokenIssuer,
}

impl<S: Store> AuthService<S> {
    pub fn new(store: S, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Creates a customer and its account.
    ///
    /// Fails with `Conflict` if the email or the username is taken; neither
    /// record is written in that case.
    #[tracing::instrument(skip(self, cmd), fields(username = %cmd.username))]
    pub async fn register(&self, cmd: RegisterCustomer) -> Result<Registration, DomainError> {
        cmd.validate()?;

        let password_hash = hash_password(&cmd.password)?;
        let registration = self
            .store
            .register_customer(NewRegistration {
                lastname: cmd.lastname,
                firstname: cmd.firstname,
                phone: cmd.phone,
                email: cmd.email,
                username: cmd.username,
                password_hash,
                role: cmd.role.unwrap_or_default(),
            })
            .await?;

        metrics::counter!("auth_registrations_total").increment(1);
        tracing::info!(customer_id = %registration.customer.id, "Customer registered");

        Ok(registration)
    }

    /// Resolves credentials to a principal.
    ///
    /// Customer accounts are checked before staff users. Every failure is
    /// reported as `Unauthenticated` regardless of which store missed.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, DomainError> {
        let mut matched = false;

        if let Some(account) = self.store.find_account_by_username(username).await? {
            matched = true;
            // Disabled accounts still pay for the hash
            let verified = verify_password(password, &account.password_hash);
            if verified && account.status == AccountStatus::Enabled {
                return Ok(Principal::Customer {
                    customer_id: account.customer_id,
                    username: account.username,
                    role: account.role,
                });
            }
        }

        if let Some(user) = self.store.find_staff_by_username(username).await? {
            matched = true;
            if verify_password(password, &user.password_hash) {
                return Ok(Principal::Staff {
                    id: user.id,
                    username: user.username,
                    role: user.role,
                });
            }
        }

        if !matched {
            dummy_verify(password);
        }
        Err(DomainError::Unauthenticated)
    }

    /// Authenticates and issues an access token.
    pub async fn login(&self, cmd: Login) -> Result<String, DomainError> {
        cmd.validate()
            .map_err(|_| DomainError::Unauthenticated)?;

        match self.authenticate(&cmd.username, &cmd.password).await {
            Ok(principal) => {
                metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
                tracing::info!(role = %principal.role(), "Login succeeded");
                self.tokens.issue(&principal)
            }
            Err(e) => {
                metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
                tracing::info!("Login failed");
                Err(e)
            }
        }
    }

    /// Re-resolves the principal named by verified claims.
    ///
    /// Fails with `PrincipalNotFound` if the backing record was deleted or
    /// the account disabled since the token was issued.
    pub async fn resolve(&self, claims: &Claims) -> Result<Principal, DomainError> {
        match claims.role {
            Role::Administrator | Role::Manager => {
                let id: StaffId = claims
                    .sub
                    .parse()
                    .map_err(|_| DomainError::Token(TokenError::Invalid))?;
                let user = self
                    .store
                    .find_staff(id)
                    .await?
                    .ok_or(DomainError::PrincipalNotFound)?;

                Ok(Principal::Staff {
                    id: user.id,
                    username: user.username,
                    role: user.role,
                })
            }
            Role::Student | Role::Teacher => {
                let account = self
                    .store
                    .find_account_by_customer(&CustomerId::new(claims.sub.as_str()))
                    .await?
                    .filter(|a| a.status == AccountStatus::Enabled)
                    .ok_or(DomainError::PrincipalNotFound)?;

                Ok(Principal::Customer {
                    customer_id: account.customer_id,
                    username: account.username,
                    role: account.role,
                })
            }
        }
    }

    /// Verifies a bearer token and resolves its principal.
    pub async fn authorize(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.tokens.verify(token)?;
        self.resolve(&claims).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use common::{CustomerRole, StaffRole};
    use store::{IdentityStore, InMemoryStore, NewStaffUser};

    fn service(store: InMemoryStore) -> AuthService<InMemoryStore> {
        AuthService::new(store, TokenIssuer::new(TokenConfig::default()))
    }

    fn registration(username: &str, email: &str) -> RegisterCustomer {
        RegisterCustomer {
            lastname: "Diallo".to_string(),
            firstname: "Awa".to_string(),
            phone: "+221700000000".to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: "secret123".to_string(),
            role: None,
        }
    }

    async fn add_staff(store: &InMemoryStore, username: &str, role: StaffRole) -> StaffId {
        store
            .create_staff(NewStaffUser {
                username: username.to_string(),
                password_hash: hash_password("staffpass").unwrap(),
                role,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_register_defaults_to_student() {
        let service = service(InMemoryStore::new());

        let reg = service
            .register(registration("awa", "awa@example.com"))
            .await
            .unwrap();

        assert_eq!(reg.account.role, CustomerRole::Student);
        assert_ne!(reg.account.password_hash, "secret123");
    }

    #[tokio::test]
    async fn test_register_validation_is_bad_request() {
        let service = service(InMemoryStore::new());

        let err = service
            .register(registration("aw", "awa@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_register_conflicts() {
        let service = service(InMemoryStore::new());
        service
            .register(registration("awa", "awa@example.com"))
            .await
            .unwrap();

        let same_email = service
            .register(registration("moussa", "awa@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(same_email, DomainError::Conflict(_)));

        let same_username = service
            .register(registration("awa", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(same_username, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_customer_store_is_checked_first() {
        let store = InMemoryStore::new();
        add_staff(&store, "shared", StaffRole::Manager).await;
        let service = service(store);
        service
            .register(registration("shared", "shared@example.com"))
            .await
            .unwrap();

        let principal = service.authenticate("shared", "secret123").await.unwrap();
        assert_eq!(principal.role(), Role::Student);

        // Wrong customer password falls through to the staff store
        let principal = service.authenticate("shared", "staffpass").await.unwrap();
        assert_eq!(principal.role(), Role::Manager);
    }

    #[tokio::test]
    async fn test_failures_are_uniform() {
        let store = InMemoryStore::new();
        add_staff(&store, "admin", StaffRole::Administrator).await;
        let service = service(store);

        let unknown = service.authenticate("ghost", "whatever").await.unwrap_err();
        let wrong = service.authenticate("admin", "wrongpass").await.unwrap_err();

        assert!(matches!(unknown, DomainError::Unauthenticated));
        assert!(matches!(wrong, DomainError::Unauthenticated));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_token_round_trip_resolves_principal() {
        let store = InMemoryStore::new();
        let id = add_staff(&store, "admin", StaffRole::Administrator).await;
        let service = service(store);

        let token = service
            .login(Login {
                username: "admin".to_string(),
                password: "staffpass".to_string(),
            })
            .await
            .unwrap();
        let principal = service.authorize(&token).await.unwrap();

        assert_eq!(
            principal,
            Principal::Staff {
                id,
                username: "admin".to_string(),
                role: StaffRole::Administrator,
            }
        );
    }

    #[tokio::test]
    async fn test_deleted_staff_token_is_principal_not_found() {
        let store = InMemoryStore::new();
        let id = add_staff(&store, "manager", StaffRole::Manager).await;
        let service = service(store.clone());
        let token = service
            .login(Login {
                username: "manager".to_string(),
                password: "staffpass".to_string(),
            })
            .await
            .unwrap();

        store.delete_staff(id).await.unwrap();

        let err = service.authorize(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn test_customer_token_resolves_by_customer_code() {
        let store = InMemoryStore::new();
        let service = service(store.clone());
        let reg = service
            .register(registration("awa", "awa@example.com"))
            .await
            .unwrap();
        let token = service
            .login(Login {
                username: "awa".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let principal = service.authorize(&token).await.unwrap();
        assert_eq!(principal.customer_id(), Some(&reg.customer.id));

        store.delete_customer(&reg.customer.id).await.unwrap();
        let err = service.authorize(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_sign_in_or_use_tokens() {
        let store = InMemoryStore::new();
        let service = service(store.clone());
        let reg = service
            .register(registration("awa", "awa@example.com"))
            .await
            .unwrap();
        let token = service
            .login(Login {
                username: "awa".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        store
            .set_account_status(&reg.customer.id, AccountStatus::Disabled)
            .await
            .unwrap();

        let err = service.authenticate("awa", "secret123").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
        let err = service.authenticate("awa", "wrong-password").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
        let err = service.authorize(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let service = service(InMemoryStore::new());
        let err = service.authorize("garbage").await.unwrap_err();
        assert!(matches!(err, DomainError::Token(TokenError::Invalid)));
    }
}
