// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,

        // --- Cliente ---
        handlers::client::get_dashboard,
        handlers::client::get_consumption,
        handlers::client::get_history,

        // --- Admin ---
        handlers::admin::get_dashboard,
        handlers::admin::list_pending_invoices,
        handlers::admin::validate_invoice,
        handlers::admin::list_pending_calculations,
        handlers::admin::calculate_invoice,
        handlers::admin::list_pending_boletos,
        handlers::admin::generate_boleto,
        handlers::admin::register_payment_link,
        handlers::admin::change_boleto_status,
        handlers::admin::list_clients,
        handlers::admin::create_client,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::SessionView,

            // --- Consumo ---
            models::consumption::TrendClassification,
            models::consumption::ConsumptionStats,
            models::consumption::ConsumptionChartPoint,
            models::consumption::ConsumptionReport,

            // --- Dashboard ---
            models::dashboard::ClientStatistics,
            models::dashboard::LastInvoiceCard,
            models::dashboard::SavingsChartEntry,
            models::dashboard::ClientDashboard,
            models::dashboard::AdminMetrics,
            models::dashboard::AdminDashboard,

            // --- Faturamento ---
            models::billing::InvoiceSummary,
            models::billing::BillableInvoice,
            models::billing::InvoiceCalculation,
            models::billing::CalculationResponse,
            models::billing::ProcedureAck,
            models::billing::BoletoStatus,
            models::billing::Boleto,
            models::billing::HistoryFilter,
            models::billing::BoletoHistory,

            // --- Clientes ---
            models::client::Client,
            models::client::CreateClientPayload,

            // --- Payloads ---
            handlers::admin::PaymentLinkPayload,
            handlers::admin::BoletoStatusPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e Logout"),
        (name = "Users", description = "Sessão do Usuário"),
        (name = "Cliente", description = "Painel, Consumo e Histórico do Cliente"),
        (name = "Admin", description = "Validação, Cálculo, Boletos e Clientes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
