use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims, UserRole};
use crate::AppState;

/// Validate the bearer token and stash its claims for later layers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) =
        auth.ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: UserRole, label: &str) -> AppResult<()> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if claims.role != role {
        return Err(AppError::Forbidden(format!("{} access required", label)));
    }
    Ok(())
}

pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    require_role(&request, UserRole::Admin, "Admin")?;
    Ok(next.run(request).await)
}

pub async fn require_motorista(request: Request, next: Next) -> AppResult<Response> {
    require_role(&request, UserRole::Motorista, "Driver")?;
    Ok(next.run(request).await)
}
