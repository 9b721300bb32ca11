// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::billing::InvoiceSummary;

// =========================================================================
//  PAINEL DO CLIENTE
// =========================================================================

// Payload de `dashboard_cliente`. A função remota omite campos à vontade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientDashboardPayload {
    #[serde(default)]
    pub ultimas_faturas: Vec<RecentInvoice>,
    #[serde(default)]
    pub estatisticas: Option<ClientStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentInvoice {
    pub mes_ano: Option<String>,
    pub consumo_kwh: Option<Decimal>,
    pub valor_original: Option<Decimal>,
    pub nova_fatura: Option<Decimal>,
    pub economia: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatistics {
    #[serde(default, alias = "total_faturas")]
    pub total_invoices: i64,
    #[serde(default, alias = "media_consumo")]
    pub average_consumption: Decimal,
    #[serde(default, alias = "media_economia")]
    pub average_savings: Decimal,
    #[serde(default, alias = "boletos_pendentes")]
    pub pending_boletos: i64,
}

// Card "Última Fatura" + "Economia Mensal"
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastInvoiceCard {
    #[schema(example = "03/2024")]
    pub month_year: String,
    pub consumption_kwh: Decimal,
    pub original_amount: Decimal,
    pub discounted_amount: Decimal,
    pub savings: Decimal,
    #[schema(example = "15.8")]
    pub savings_percent: Decimal,
    #[schema(example = "pendente")]
    pub boleto_status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavingsChartEntry {
    #[schema(example = "Mar/2024")]
    pub month: String,
    pub utility_amount: Decimal,
    pub discounted_amount: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDashboard {
    pub last_invoice: LastInvoiceCard,
    pub year_to_date_savings: Decimal,
    #[schema(example = "R$ 412,30")]
    pub year_to_date_savings_formatted: String,
    pub savings_chart: Vec<SavingsChartEntry>,
    pub statistics: ClientStatistics,
}

// =========================================================================
//  PAINEL DO ADMIN
// =========================================================================

// Linha da view `view_dashboard_admin`
#[derive(Debug, Clone, FromRow)]
pub struct MetricRow {
    pub metrica: String,
    pub valor: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminMetrics {
    pub total_clients: i64,
    pub pending_invoices: i64,
    pub calculated_invoices: i64,
    pub pending_boletos: i64,
    pub total_savings_month: Decimal,
    pub paid_boletos: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub metrics: AdminMetrics,
    pub pending_validation: Vec<InvoiceSummary>,
}
