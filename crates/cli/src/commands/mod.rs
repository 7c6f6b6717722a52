pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Database URL for CLI commands: `DASHBOARD_DATABASE_URL`, then `DATABASE_URL`.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("DASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
