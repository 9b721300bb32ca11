// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::ApiJson,
    },
    config::AppState,
    middleware::{auth::SessionContext, i18n::Locale},
    models::auth::{AuthResponse, LoginUserPayload, SessionView},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado; `home` indica o painel do perfil", body = AuthResponse),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    ApiJson(payload): ApiJson<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state.auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(response))
}

// POST /api/auth/logout
// Tokens são stateless: o front descarta o token, aqui só registramos.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(session: SessionContext) -> impl IntoResponse {
    tracing::info!("👋 Logout de {}", session.user_id);
    StatusCode::NO_CONTENT
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Sessão atual", body = SessionView),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(session: SessionContext) -> Json<SessionView> {
    Json(session.to_view())
}
