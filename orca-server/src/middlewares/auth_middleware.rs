use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Header};

use crate::configs::storage::Storage;
use crate::errors::{ApiError, AuthError};
use crate::repositories::UserRepository;
use crate::services::TokenService;

/// The already-authenticated caller of a read-side endpoint. Login flows
/// live outside the core; by the time a handler runs, this is resolved.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i32,
    pub role: String,
}

#[derive(Clone)]
pub struct TokenState {
    pub token_service: Arc<TokenService>,
    pub storage: Arc<Storage>,
}

pub async fn auth(
    State(state): State<TokenState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let mut headers = req.headers_mut().get_all(header::AUTHORIZATION).iter();

    let header: Authorization<Bearer> =
        Authorization::decode(&mut headers).map_err(|_| AuthError::MissingToken)?;

    let token_data = state
        .token_service
        .retrieve_token_claims(header.token())
        .map_err(|_| AuthError::InvalidToken)?;

    let user_id: i32 = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidToken)?;

    // Tokens outlive account changes; re-check the user row on every call.
    let user = UserRepository::new(state.storage.clone())
        .find_by_id(user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AuthError::InvalidToken)?;

    req.extensions_mut().insert(Principal {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(req).await)
}
