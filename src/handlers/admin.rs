// src/handlers/admin.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{begin_session_tx, commit_session_tx},
        error::{ApiError, AppError},
        extract::{ApiJson, ApiPath},
    },
    config::AppState,
    middleware::{
        auth::SessionContext,
        i18n::Locale,
        rbac::{AdminArea, RequireRole},
    },
    models::{
        billing::{BillableInvoice, Boleto, BoletoStatus, CalculationResponse, InvoiceSummary, ProcedureAck},
        client::{Client, CreateClientPayload},
        dashboard::AdminDashboard,
    },
};

// =============================================================================
//  1. PAINEL
// =============================================================================

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Métricas gerais e as 5 faturas mais recentes aguardando validação", body = AdminDashboard),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Perfil não é admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let dashboard = app_state.dashboard_service
        .get_admin_dashboard(&mut tx)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// =============================================================================
//  2. FATURAS (validação -> cálculo -> boleto)
// =============================================================================

// GET /api/admin/invoices/pending
#[utoipa::path(
    get,
    path = "/api/admin/invoices/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Faturas ativas aguardando validação", body = Vec<InvoiceSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let invoices = app_state.billing_service
        .list_pending_validation(&mut tx)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(invoices)))
}

// POST /api/admin/invoices/{invoice_id}/validate
#[utoipa::path(
    post,
    path = "/api/admin/invoices/{invoice_id}/validate",
    tag = "Admin",
    params(("invoice_id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura validada", body = ProcedureAck),
        (status = 422, description = "Validação recusada pela função remota")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let ack = app_state.billing_service
        .validate_invoice(&mut tx, invoice_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(ack)))
}

// GET /api/admin/calculations/pending
#[utoipa::path(
    get,
    path = "/api/admin/calculations/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Faturas validadas ainda sem cálculo", body = Vec<InvoiceSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_calculations(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let invoices = app_state.billing_service
        .list_awaiting_calculation(&mut tx)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(invoices)))
}

// POST /api/admin/invoices/{invoice_id}/calculate
#[utoipa::path(
    post,
    path = "/api/admin/invoices/{invoice_id}/calculate",
    tag = "Admin",
    params(("invoice_id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Cálculo realizado", body = CalculationResponse),
        (status = 422, description = "Cálculo recusado pela função remota")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let calculation = app_state.billing_service
        .calculate_invoice(&mut tx, invoice_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(calculation)))
}

// GET /api/admin/boletos/pending
#[utoipa::path(
    get,
    path = "/api/admin/boletos/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Faturas calculadas ainda sem boleto", body = Vec<BillableInvoice>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_boletos(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let invoices = app_state.billing_service
        .list_awaiting_boleto(&mut tx)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(invoices)))
}

// POST /api/admin/invoices/{invoice_id}/boleto
#[utoipa::path(
    post,
    path = "/api/admin/invoices/{invoice_id}/boleto",
    tag = "Admin",
    params(("invoice_id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 201, description = "Boleto gerado; falta registrar o link de pagamento", body = ProcedureAck),
        (status = 422, description = "Geração recusada pela função remota")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_boleto(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let ack = app_state.billing_service
        .generate_boleto(&mut tx, invoice_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(ack)))
}

// =============================================================================
//  3. BOLETOS (link de pagamento e ciclo de vida)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PaymentLinkPayload {
    #[validate(url(message = "Informe uma URL válida."))]
    #[schema(example = "https://www.asaas.com/i/abc123")]
    pub url: String,
}

// PUT /api/admin/boletos/{boleto_id}/payment-link
#[utoipa::path(
    put,
    path = "/api/admin/boletos/{boleto_id}/payment-link",
    tag = "Admin",
    request_body = PaymentLinkPayload,
    params(("boleto_id" = Uuid, Path, description = "ID do boleto")),
    responses(
        (status = 200, description = "Link registrado, boleto enviado", body = Boleto),
        (status = 404, description = "Boleto não encontrado"),
        (status = 409, description = "Boleto já enviado, pago ou cancelado")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_payment_link(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiPath(boleto_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PaymentLinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let boleto = app_state.billing_service
        .register_payment_link(&mut tx, boleto_id, payload.url.trim())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(boleto)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BoletoStatusPayload {
    #[schema(example = "pago")]
    pub status: BoletoStatus,
}

// PUT /api/admin/boletos/{boleto_id}/status
#[utoipa::path(
    put,
    path = "/api/admin/boletos/{boleto_id}/status",
    tag = "Admin",
    request_body = BoletoStatusPayload,
    params(("boleto_id" = Uuid, Path, description = "ID do boleto")),
    responses(
        (status = 200, description = "Status atualizado", body = Boleto),
        (status = 404, description = "Boleto não encontrado"),
        (status = 409, description = "Transição de status inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_boleto_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiPath(boleto_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BoletoStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let boleto = app_state.billing_service
        .change_status(&mut tx, boleto_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(boleto)))
}

// =============================================================================
//  4. CLIENTES
// =============================================================================

// GET /api/admin/clients
#[utoipa::path(
    get,
    path = "/api/admin/clients",
    tag = "Admin",
    responses(
        (status = 200, description = "Clientes ativos em ordem alfabética", body = Vec<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let clients = app_state.client_service
        .list_clients(&mut tx)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/admin/clients
#[utoipa::path(
    post,
    path = "/api/admin/clients",
    tag = "Admin",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Client),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "CPF/CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _role: RequireRole<AdminArea>,
    session: SessionContext,
    ApiJson(payload): ApiJson<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut tx = begin_session_tx(&app_state.db_pool, &session)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let client = app_state.client_service
        .create_client(&mut tx, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    commit_session_tx(tx).await.map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(client)))
}
