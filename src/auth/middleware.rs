use actix_web::error::{ErrorUnauthorized, InternalError};
use actix_web::{Error, HttpRequest, HttpResponse};

use super::jwt::validate_token;
use super::model::{Claims, Role};
use crate::error::NumberingError;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Validate token from HttpRequest and return claims
pub fn validate_request_token(req: &HttpRequest, secret: &str) -> Result<Claims, Error> {
    let token =
        extract_token(req).ok_or_else(|| ErrorUnauthorized("Missing authorization token"))?;

    let claims = validate_token(secret, &token).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        ErrorUnauthorized("Invalid or expired token")
    })?;

    if claims.token_type != "access" {
        return Err(ErrorUnauthorized("Invalid token type"));
    }

    Ok(claims)
}

/// Validate the token and check the caller's role with `allowed`.
pub fn require_role(
    req: &HttpRequest,
    secret: &str,
    allowed: fn(Role) -> bool,
) -> Result<Claims, Error> {
    let claims = validate_request_token(req, secret)?;
    if !allowed(claims.role) {
        log::warn!(
            "User {} with role {} denied access to {}",
            claims.username,
            claims.role,
            req.path()
        );
        let denied = NumberingError::Forbidden(format!(
            "role {} may not perform this operation",
            claims.role
        ));
        let message = denied.to_string();
        return Err(InternalError::from_response(message, HttpResponse::from(denied)).into());
    }
    Ok(claims)
}
