//! Dashboard account commands.
//!
//! The first admin has to come from here: the dashboard only lets admins
//! create accounts.

use thiserror::Error;

use bazaar_core::{FieldErrors, UserId, UserRole};
use bazaar_dashboard::db::{RepositoryError, VendorRepository};
use bazaar_dashboard::models::{NewUserInput, Validate};
use bazaar_dashboard::services::{AuthError, AuthService};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: DASHBOARD_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No vendor with slug: {0}")]
    UnknownVendor(String),

    #[error("Invalid user: {0}")]
    Invalid(#[from] FieldErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// What `bazaar user create` was asked to create.
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub vendor_slug: Option<String>,
    pub password: String,
}

/// Create a dashboard account.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid, the vendor does not exist or
/// the email is taken.
pub async fn create(user: NewUser) -> Result<UserId, UserError> {
    let database_url = super::database_url().ok_or(UserError::MissingDatabaseUrl)?;
    let pool = bazaar_dashboard::db::create_pool(&database_url).await?;

    let vendor_id = match &user.vendor_slug {
        Some(slug) => Some(
            VendorRepository::new(&pool)
                .find_id_by_slug(slug)
                .await?
                .ok_or_else(|| UserError::UnknownVendor(slug.clone()))?,
        ),
        None => None,
    };

    let fields = NewUserInput {
        email: user.email,
        name: user.name,
        password: user.password,
        role: Some(user.role),
        vendor_id,
    }
    .validate()?;

    let created = AuthService::new(&pool).register(&fields).await?;
    tracing::info!(user_id = %created.id, email = %created.email, role = %created.role, "user created");
    Ok(created.id)
}
