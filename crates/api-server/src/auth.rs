//! Bearer-token authentication for admin catalog mutation.
//!
//! The admin token is never stored: configuration carries only its SHA-256
//! digest, and requests are checked by hashing the presented token. With no
//! digest configured the admin surface is disabled outright.

use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::rest::{AppState, ApiError, ErrorResponse};
use streamrate_benchmarks::{Industry, NewIndustry};

const ADMIN_PATH_PREFIX: &str = "/api/v1/admin/";

/// Generate a fresh random admin token (hex, 32 bytes of entropy).
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    format!("sr_admin_{}", hex::encode(bytes))
}

/// Hex SHA-256 digest of a token, as stored in configuration.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Check a presented token against the configured digest.
pub fn verify_token(token: &str, digest_hex: &str) -> bool {
    token_digest(token) == digest_hex.to_lowercase()
}

/// Axum middleware guarding `/api/v1/admin/*`. All other paths pass through.
pub async fn admin_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !req.uri().path().starts_with(ADMIN_PATH_PREFIX) {
        return next.run(req).await;
    }

    let Some(digest) = state.admin_token_digest.as_deref() else {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "admin_disabled".to_string(),
                message: "No admin token digest is configured".to_string(),
            }),
        )
            .into_response();
    };

    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match bearer {
        Some(token) if verify_token(token, digest) => next.run(req).await,
        Some(_) => {
            metrics::counter!("admin.auth_failures").increment(1);
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "invalid_token".to_string(),
                    message: "Invalid admin bearer token".to_string(),
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "missing_auth".to_string(),
                message: "Authorization header with Bearer token required".to_string(),
            }),
        )
            .into_response(),
    }
}

// ─── Admin handlers ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RemovedIndustryResponse {
    pub removed: String,
}

/// POST /api/v1/admin/industries — create or update an industry row.
pub async fn upsert_industry(
    State(state): State<AppState>,
    Json(req): Json<NewIndustry>,
) -> Result<(StatusCode, Json<Industry>), ApiError> {
    if req.name.trim().is_empty() || req.slug.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_input".to_string(),
                message: "Industry name and slug must not be empty".to_string(),
            }),
        ));
    }
    if !(req.video_cpm_low > 0.0 && req.video_cpm_avg > 0.0 && req.video_cpm_high > 0.0) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_input".to_string(),
                message: "CPM benchmark values must be positive".to_string(),
            }),
        ));
    }

    let industry = state.benchmarks.upsert_industry(req);
    metrics::counter!("admin.industries_upserted").increment(1);
    Ok((StatusCode::CREATED, Json(industry)))
}

/// DELETE /api/v1/admin/industries/:slug
pub async fn remove_industry(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RemovedIndustryResponse>, ApiError> {
    match state.benchmarks.remove_industry(&slug) {
        Some(removed) => {
            metrics::counter!("admin.industries_removed").increment(1);
            Ok(Json(RemovedIndustryResponse { removed }))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "not_found".to_string(),
                message: format!("Industry '{}' not found", slug),
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_digest_round_trip() {
        let token = generate_token();
        let digest = token_digest(&token);
        assert!(verify_token(&token, &digest));
        assert!(verify_token(&token, &digest.to_uppercase()));
        assert!(!verify_token("sr_admin_wrong", &digest));
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
