use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub const ROLE_EMPLOYEE: &str = "EMPLOYEE";
pub const ROLE_MANAGER: &str = "MANAGER";

/// Claims issued by the authentication collaborator. `sub` is the
/// verified requester id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmployeeClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

fn decode_claims(req: &Request, secret: &str) -> Result<EmployeeClaims, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("missing bearer token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("missing bearer token".to_string()))?;

    let token_data = decode::<EmployeeClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Authentication("invalid or expired token".to_string()))?;

    Ok(token_data.claims)
}

/// Any verified travel requester: EMPLOYEE or MANAGER.
pub async fn employee_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = decode_claims(&req, &state.auth.secret)?;

    if claims.role != ROLE_EMPLOYEE && claims.role != ROLE_MANAGER {
        return Err(AppError::Authorization(
            "requester role cannot submit trips".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Approval endpoints: MANAGER only.
pub async fn manager_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = decode_claims(&req, &state.auth.secret)?;

    if claims.role != ROLE_MANAGER {
        return Err(AppError::Authorization(
            "manager role required".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
