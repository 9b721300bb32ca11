// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{Role, SessionView},
};

/// Sessão resolvida uma única vez por requisição e repassada explicitamente
/// aos handlers (via extensions), em vez de um cliente global.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub client_id: Option<Uuid>,
}

impl SessionContext {
    pub fn home(&self) -> &'static str {
        self.role.home()
    }

    pub fn require_client_id(&self) -> Result<Uuid, AppError> {
        self.client_id.ok_or(AppError::ClientNotLinked)
    }

    pub fn to_view(&self) -> SessionView {
        SessionView {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role,
            client_id: self.client_id,
            home: self.home().to_string(),
        }
    }
}

// O middleware em si: token -> sessão completa
pub async fn session_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

    let session = app_state.auth_service
        .resolve_session(bearer.token())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // Insere a sessão nos "extensions" da requisição
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

// Extrator para obter a sessão diretamente nos handlers
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&Locale::from_headers(&parts.headers)))
    }
}
