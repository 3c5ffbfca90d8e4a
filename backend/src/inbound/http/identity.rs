//! Identity resolution for HTTP handlers.
//!
//! Bridges the session cookie to a domain [`Actor`]: the session names a
//! user id, the account service re-reads the account so the role is always
//! current (a promotion or demotion takes effect on the next request, not
//! the next login).

use crate::domain::{AccountService, Actor};

use super::error::ApiResult;
use super::session::SessionContext;

/// Resolve the acting user behind the current session.
///
/// # Errors
///
/// - `Unauthorized` when there is no session or the account was deleted.
/// - `ServiceUnavailable` / `InternalError` when the store cannot be read.
pub async fn resolve_actor(
    session: &SessionContext,
    accounts: &AccountService,
) -> ApiResult<Actor> {
    let user_id = session.require_user_id()?;
    let user = accounts.current(&user_id).await?;
    Ok(user.as_actor())
}
