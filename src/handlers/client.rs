// src/handlers/client.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{
        db_utils::{begin_session_tx, commit_session_tx},
        error::ApiError,
        extract::ApiQuery,
    },
    config::AppState,
    middleware::{
        auth::SessionContext,
        i18n::Locale,
        rbac::{ClientArea, RequireRole},
    },
    models::{
        billing::{BoletoHistory, HistoryFilter},
        consumption::ConsumptionReport,
        dashboard::ClientDashboard,
    },
};

// GET /api/client/dashboard
#[utoipa::path(
    get,
    path = "/api/client/dashboard",
    tag = "Cliente",
    responses(
        (status = 200, description = "Última fatura, economia no ano e gráfico de 12 meses", body = ClientDashboard),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Perfil não é de cliente"),
        (status = 404, description = "Perfil sem cliente vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<ClientArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = session.require_client_id().map_err(|e| e.to_api_error(&locale))?;

    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let dashboard = app_state.dashboard_service
        .get_client_dashboard(&mut tx, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// GET /api/client/consumption
#[utoipa::path(
    get,
    path = "/api/client/consumption",
    tag = "Cliente",
    responses(
        (status = 200, description = "Estatísticas e tendência de consumo (últimos 12 meses)", body = ConsumptionReport),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Perfil não é de cliente"),
        (status = 404, description = "Perfil sem cliente vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_consumption(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<ClientArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = session.require_client_id().map_err(|e| e.to_api_error(&locale))?;

    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let report = app_state.consumption_service
        .get_report(&mut tx, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// all | paid | pending
    #[param(value_type = Option<String>, example = "pending")]
    pub filter: Option<HistoryFilter>,
}

// GET /api/client/history
#[utoipa::path(
    get,
    path = "/api/client/history",
    tag = "Cliente",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Boletos do cliente com totais pagos e em aberto", body = BoletoHistory),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Perfil não é de cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<ClientArea>,
    session: SessionContext,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = session.require_client_id().map_err(|e| e.to_api_error(&locale))?;

    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let history = app_state.billing_service
        .get_client_history(&mut tx, client_id, query.filter.unwrap_or_default())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(history)))
}
