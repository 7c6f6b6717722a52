//! Password authentication for dashboard accounts.
//!
//! Passwords are stored as Argon2id PHC strings. Only active admin and vendor
//! accounts may sign in; every rejection looks the same to the client.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use bazaar_core::{Email, UserRole};

use crate::db::users::UserRepository;
use crate::models::{CurrentUser, NewUserFields, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong
    /// or the account may not use the dashboard.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Accounts created without a password (customers from checkout) have no hash.
        let password_hash = password_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &password_hash)?;

        let current = dashboard_identity(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "dashboard login");
        Ok(current)
    }

    /// Create a dashboard account, hashing its password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails and
    /// `AuthError::Repository` if the insert is rejected (duplicate email,
    /// unknown vendor).
    pub async fn register(&self, fields: &NewUserFields) -> Result<User, AuthError> {
        let password_hash = hash_password(&fields.password)?;
        Ok(self.users.create(fields, &password_hash).await?)
    }
}

/// The session identity for `user`, if the account may use the dashboard.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` for inactive accounts, customers,
/// and vendor users not attached to a vendor.
pub fn dashboard_identity(user: &User) -> Result<CurrentUser, AuthError> {
    if !user.is_active {
        return Err(AuthError::InvalidCredentials);
    }
    match (user.role, user.vendor_id) {
        (UserRole::Admin, _) | (UserRole::Vendor, Some(_)) => Ok(CurrentUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            vendor_id: user.vendor_id,
        }),
        (UserRole::Vendor, None) | (UserRole::Customer, _) => Err(AuthError::InvalidCredentials),
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{UserId, VendorId};
    use chrono::Utc;

    fn user(role: UserRole, vendor_id: Option<VendorId>, is_active: bool) -> User {
        User {
            id: UserId::new(5),
            email: Email::parse("kim@bazaar.test").unwrap(),
            name: "Kim".to_string(),
            role,
            vendor_id,
            vendor_name: None,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dashboard_identity() {
        let admin = dashboard_identity(&user(UserRole::Admin, None, true)).unwrap();
        assert_eq!(admin.vendor_scope(), None);

        let vendor = dashboard_identity(&user(UserRole::Vendor, Some(VendorId::new(2)), true)).unwrap();
        assert_eq!(vendor.vendor_scope(), Some(VendorId::new(2)));
    }

    #[test]
    fn test_rejected_accounts() {
        for rejected in [
            user(UserRole::Admin, None, false),
            user(UserRole::Customer, None, true),
            user(UserRole::Vendor, None, true),
        ] {
            assert!(matches!(
                dashboard_identity(&rejected),
                Err(AuthError::InvalidCredentials)
            ));
        }
    }
}
