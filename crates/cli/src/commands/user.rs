//! Account management commands.

use marche_storefront::db::PgStore;
use marche_storefront::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a password account with an empty profile.
///
/// Applies the same name, email and password rules as the signup page.
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), UserError> {
    let store = PgStore::new(connect().await?);

    let account = AuthService::new(&store).signup(name, email, password).await?;

    tracing::info!(uid = %account.uid, email = %account.email, "Account created");
    Ok(())
}
