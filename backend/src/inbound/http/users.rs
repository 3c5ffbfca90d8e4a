//! Account directory API handlers.
//!
//! ```text
//! GET /api/v1/users            Admin directory listing
//! PUT /api/v1/users/{id}/role  Role change (admin)
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Role, User, UserId};

use super::error::ApiResult;
use super::identity::resolve_actor;
use super::session::SessionContext;
use super::state::HttpState;

/// Role change request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// New role for the account.
    pub role: Role,
}

/// List every account, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let users = state.accounts.list_users(&actor).await?;
    Ok(web::Json(users))
}

/// Overwrite an account's role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    params(("id" = Uuid, Path, description = "Account identifier")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateRole"
)]
#[put("/users/{id}/role")]
pub async fn update_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateRoleRequest>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let user_id = UserId::from_uuid(path.into_inner());
    state
        .accounts
        .update_role(&actor, &user_id, payload.into_inner().role)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
