//! User repository for database operations.
//!
//! Dashboard accounts (admins and vendor users) and storefront customers share
//! the `users` table; only the first two can sign in here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{
    Email, FetchRequest, FetchResponse, SortDirection, UserId, UserRole, VendorId,
};

use super::fetch::{self, FilterField, FilterKind, ListContext, ListSpec, SortField};
use super::{EntityTable, Ownership, RepositoryError, map_write_error};
use crate::models::{NewUserFields, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    role: UserRole,
    vendor_id: Option<VendorId>,
    vendor_name: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            role: row.role,
            vendor_id: row.vendor_id,
            vendor_name: row.vendor_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for the login lookup.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

pub(crate) const TABLE: EntityTable = EntityTable::new("users", "user", Ownership::Platform);

pub const LIST: ListSpec = ListSpec {
    entity: "users",
    select: "u.id, u.email, u.name, u.role, u.vendor_id, v.name AS vendor_name, u.is_active, \
             u.created_at, u.updated_at",
    from: "users u LEFT JOIN vendors v ON v.id = u.vendor_id",
    key_column: "u.id",
    sort_fields: &[
        SortField::new("name", "u.name"),
        SortField::new("email", "u.email"),
        SortField::new("role", "u.role"),
        SortField::new("vendorName", "v.name"),
        SortField::new("isActive", "u.is_active"),
        SortField::new("createdAt", "u.created_at"),
    ],
    filter_fields: &[
        FilterField::new("name", "u.name", FilterKind::Text),
        FilterField::new("email", "u.email", FilterKind::Text),
        FilterField::new("role", "u.role", FilterKind::OneOf),
        FilterField::new("vendorId", "u.vendor_id", FilterKind::Id),
        FilterField::new("isActive", "u.is_active", FilterKind::Boolean),
        FilterField::new("createdAt", "u.created_at", FilterKind::DateRange),
    ],
    search_columns: &["u.name", "u.email"],
    default_sort: ("u.created_at", SortDirection::Desc),
    vendor_column: None,
    shop_column: None,
    active_column: Some("u.is_active"),
};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, request: &FetchRequest) -> Result<FetchResponse<User>, RepositoryError> {
        fetch::fetch_page::<UserRow>(self.pool, &LIST, request, &ListContext::platform())
            .await?
            .try_map(TryInto::try_into)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        fetch::fetch_by_key::<UserRow>(self.pool, &LIST, id.as_i32(), &ListContext::platform())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT u.id, u.email, u.name, u.role, u.vendor_id, v.name AS vendor_name,
                   u.is_active, u.created_at, u.updated_at, u.password_hash
            FROM users u
            LEFT JOIN vendors v ON v.id = u.vendor_id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some((row.user.try_into()?, row.password_hash)))
    }

    /// Create a dashboard user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken or the
    /// vendor does not exist.
    #[instrument(skip(self, input, password_hash), fields(email = %input.email, role = %input.role))]
    pub async fn create(
        &self,
        input: &NewUserFields,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO users (email, name, password_hash, role, vendor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&input.email)
        .bind(&input.name)
        .bind(password_hash)
        .bind(input.role)
        .bind(input.vendor_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, TABLE.label))?;

        tracing::info!(user_id = id, "user created");
        fetch::reload::<UserRow>(self.pool, &LIST, id).await?.try_into()
    }

    /// Flip `is_active`, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when `acting` would deactivate
    /// their own account and `RepositoryError::NotFound` if the user does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn toggle(&self, id: UserId, acting: UserId) -> Result<bool, RepositoryError> {
        if id == acting {
            return Err(RepositoryError::Conflict(
                "you cannot deactivate your own account".to_string(),
            ));
        }
        TABLE.toggle(self.pool, "is_active", id.as_i32(), None).await
    }
}
