//! Hush Token Service
//!
//! A small HTTP service that mints chat-service tokens for signed-in
//! users. The mobile client calls `POST /generateStreamToken` with a
//! user id and connects to the chat transport with the returned token.
//!
//! **Privacy**: this service never sees key material or message
//! content. It only signs user ids.
//!
//! Every issued token carries an elevated chat-service role claim by
//! default, matching the deployed behavior; start with
//! `--no-elevated-role` to issue plain member tokens instead.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hush-token", version, about = "Hush chat token service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "TOKEN_PORT")]
    port: u16,

    /// Chat-service API secret used to sign tokens
    #[arg(long, env = "CHAT_API_SECRET", hide_env_values = true)]
    api_secret: String,

    /// Issue plain member tokens instead of elevated-role tokens
    #[arg(long, default_value_t = false, env = "NO_ELEVATED_ROLE")]
    no_elevated_role: bool,
}

// ── State & Wire Types ────────────────────────────────────────────────────────

/// Shared handler state: the signing key and the role policy.
#[derive(Clone)]
struct AppState {
    encoding_key: EncodingKey,
    grant_elevated_role: bool,
}

impl AppState {
    fn new(api_secret: &str, grant_elevated_role: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
            grant_elevated_role,
        }
    }
}

/// Request body for token issuance.
#[derive(Debug, Deserialize)]
struct TokenRequest {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
}

/// Claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    iat: u64,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hush_token=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let state = AppState::new(&args.api_secret, !args.no_elevated_role);
    if state.grant_elevated_role {
        tracing::warn!("Issuing elevated-role tokens on every request (deployed default)");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/generateStreamToken", post(generate_token))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Hush token service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server error");
}

// ── Route Handlers ────────────────────────────────────────────────────────────

/// Token issuance endpoint.
///
/// `POST /generateStreamToken` with `{"userId": "<id>"}`; responds
/// `{"token": "<jwt>"}` or an error status with `{"error": "..."}`.
async fn generate_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> impl IntoResponse {
    let user_id = match request.user_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing userId" })),
            );
        }
    };

    match mint_token(&state, user_id) {
        Ok(token) => {
            tracing::info!(user_id, elevated = state.grant_elevated_role, "Token issued");
            (StatusCode::OK, Json(json!({ "token": token })))
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "Token signing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
        }
    }
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "hush-token",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Sign an HS256 token for `user_id` under the configured policy.
fn mint_token(state: &AppState, user_id: &str) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        user_id: user_id.to_string(),
        role: state.grant_elevated_role.then(|| "admin".to_string()),
        iat: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };

    encode(&Header::default(), &claims, &state.encoding_key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn decode_claims(token: &str, secret: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_token_carries_user_id() {
        let state = AppState::new("secret", false);
        let token = mint_token(&state, "cesar").unwrap();

        let claims = decode_claims(&token, "secret");
        assert_eq!(claims.user_id, "cesar");
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_elevated_role_claim_by_default_policy() {
        let state = AppState::new("secret", true);
        let token = mint_token(&state, "cesar").unwrap();

        let claims = decode_claims(&token, "secret");
        assert_eq!(claims.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_token_rejected_under_wrong_secret() {
        let state = AppState::new("secret", true);
        let token = mint_token(&state, "cesar").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other secret"),
            &validation,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_user_id_rejected() {
        let state = AppState::new("secret", true);

        for body in [TokenRequest { user_id: None }, TokenRequest { user_id: Some(String::new()) }] {
            let response = generate_token(State(state.clone()), Json(body))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(value["error"], "Missing userId");
        }
    }

    #[tokio::test]
    async fn test_issuance_response_shape() {
        let state = AppState::new("secret", true);

        let response = generate_token(
            State(state),
            Json(TokenRequest {
                user_id: Some("cesar".into()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let token = value["token"].as_str().unwrap();

        let claims = decode_claims(token, "secret");
        assert_eq!(claims.user_id, "cesar");
    }
}
