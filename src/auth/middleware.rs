use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use super::JwtService;
use crate::error::AppError;

/// Caller identity injected into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: String,
}

/// Accepts `Authorization: Bearer <token>` or the bare token.
pub async fn jwt_auth_middleware(
    State(jwt): State<JwtService>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .unwrap_or(auth_header)
        .trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("missing token"));
    }

    let claims = jwt.verify(token)?;
    request.extensions_mut().insert(AuthenticatedAccount {
        account_id: claims.sub,
    });
    Ok(next.run(request).await)
}
