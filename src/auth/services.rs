use tracing::{debug, warn};

use crate::auth::password::{verify_password, PasswordError};
use crate::users::{User, UserRepository};

/// Resolves a credential pair to the active user it belongs to.
///
/// `Ok(None)` covers every "no such login" case: unknown email, inactive
/// account, wrong password, or a stored password that is not an argon2 hash.
/// Repository failures are returned as errors.
pub async fn login(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let found = users.find_active_by_email(email).await?;
    let Some(user) = found.filter(User::is_active) else {
        debug!(email = %email, "no active user for email");
        return Ok(None);
    };

    match verify_password(password, &user.password) {
        Ok(true) => Ok(Some(user)),
        Ok(false) => {
            debug!(user_id = user.id, "password mismatch");
            Ok(None)
        }
        Err(e @ PasswordError::MalformedHash(_)) => {
            warn!(user_id = user.id, error = %e, "stored password is not hashed; refusing login");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
