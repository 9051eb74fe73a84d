//! Header-based identity resolution.
//!
//! The engine trusts an upstream auth layer: an `Authorization` bearer
//! token matching the configured admin token makes the caller an admin,
//! and an `X-User-Id` header (injected by the auth proxy) identifies a
//! regular registered user.  Anything else is anonymous.

use axum::http::HeaderMap;
use uuid::Uuid;

use colloquy_core::{Caller, Role};

use crate::config::ServerConfig;

/// Resolve the caller identity from request headers.
pub fn resolve_caller(headers: &HeaderMap, config: &ServerConfig) -> Caller {
    if is_admin_token(headers, config) {
        // Admin sessions may also carry a user id; without one, a nil id
        // stands in (admins never rely on ownership checks).
        let id = user_id_header(headers).unwrap_or_else(Uuid::nil);
        return Caller::Identified {
            id,
            role: Role::Admin,
        };
    }

    match user_id_header(headers) {
        Some(id) => Caller::Identified {
            id,
            role: Role::Other,
        },
        None => Caller::Anonymous,
    }
}

fn user_id_header(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

fn is_admin_token(headers: &HeaderMap, config: &ServerConfig) -> bool {
    let Some(ref expected) = config.admin_token else {
        return false;
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    // Constant-time comparison to prevent timing attacks on the admin token.
    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    token_bytes.len() == expected_bytes.len()
        && token_bytes.ct_eq(expected_bytes).unwrap_u8() == 1
}
