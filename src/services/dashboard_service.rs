// src/services/dashboard_service.rs

use chrono::{Datelike, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        format::{format_currency, format_month_year},
    },
    db::{DashboardRepository, InvoiceRepository, ProcedureGateway, RemoteProcedure},
    models::{
        billing::SavingsRow,
        consumption::Period,
        dashboard::{
            AdminDashboard, AdminMetrics, ClientDashboard, ClientDashboardPayload, LastInvoiceCard,
            MetricRow, RecentInvoice, SavingsChartEntry,
        },
    },
    services::consumption_service::HISTORY_MONTHS,
};

// Quantas faturas aguardando validação aparecem no painel admin
const ADMIN_PENDING_PREVIEW: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    invoice_repo: InvoiceRepository,
    procedures: ProcedureGateway,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        invoice_repo: InvoiceRepository,
        procedures: ProcedureGateway,
    ) -> Self {
        Self { repo, invoice_repo, procedures }
    }

    pub async fn get_client_dashboard(
        &self,
        conn: &mut PgConnection,
        client_id: Uuid,
    ) -> Result<ClientDashboard, AppError> {
        let payload: ClientDashboardPayload = self.procedures
            .call(&mut *conn, RemoteProcedure::ClientDashboard, client_id)
            .await?;

        let savings = self.invoice_repo
            .list_recent_savings(&mut *conn, client_id, HISTORY_MONTHS)
            .await?;

        Ok(build_client_dashboard(payload, &savings, Utc::now().year()))
    }

    pub async fn get_admin_dashboard(&self, conn: &mut PgConnection) -> Result<AdminDashboard, AppError> {
        let metrics = self.repo.get_admin_metrics(&mut *conn).await?;
        let pending_validation = self.invoice_repo
            .list_pending_validation(&mut *conn, Some(ADMIN_PENDING_PREVIEW))
            .await?;

        Ok(AdminDashboard { metrics: metrics_from_rows(&metrics), pending_validation })
    }
}

pub fn build_client_dashboard(
    payload: ClientDashboardPayload,
    savings: &[SavingsRow],
    current_year: i32,
) -> ClientDashboard {
    let mut savings_chart = Vec::with_capacity(savings.len());
    let mut year_to_date_savings = Decimal::ZERO;

    for row in savings {
        let period: Option<Period> = row.mes_ano.parse().ok();
        let economia = row.economia_cliente.unwrap_or(Decimal::ZERO);

        if period.is_some_and(|p| p.year == current_year) {
            year_to_date_savings += economia;
        }

        savings_chart.push(SavingsChartEntry {
            month: period.map(|p| format_month_year(&p)).unwrap_or_else(|| row.mes_ano.clone()),
            utility_amount: row.fatura_enel_bruta.unwrap_or(Decimal::ZERO),
            discounted_amount: row.nova_fatura_p2p.unwrap_or(Decimal::ZERO),
            savings: economia,
        });
    }

    ClientDashboard {
        last_invoice: last_invoice_card(payload.ultimas_faturas.into_iter().next()),
        year_to_date_savings_formatted: format_currency(year_to_date_savings),
        year_to_date_savings,
        savings_chart,
        statistics: payload.estatisticas.unwrap_or_default(),
    }
}

fn last_invoice_card(invoice: Option<RecentInvoice>) -> LastInvoiceCard {
    let invoice = invoice.unwrap_or_default();

    let original = invoice.valor_original.unwrap_or(Decimal::ZERO);
    let savings = invoice.economia.unwrap_or(Decimal::ZERO);
    // Sem valor original, divide por 1 (economia "absoluta")
    let base = if original.is_zero() { Decimal::ONE } else { original };

    LastInvoiceCard {
        month_year: invoice.mes_ano.unwrap_or_else(|| "-".to_string()),
        consumption_kwh: invoice.consumo_kwh.unwrap_or(Decimal::ZERO),
        original_amount: original,
        discounted_amount: invoice.nova_fatura.unwrap_or(Decimal::ZERO),
        savings,
        savings_percent: (savings / base * Decimal::ONE_HUNDRED).round_dp(2),
        boleto_status: invoice.status.unwrap_or_else(|| "pendente".to_string()),
    }
}

pub fn metrics_from_rows(rows: &[MetricRow]) -> AdminMetrics {
    let value = |name: &str| -> Decimal {
        rows.iter()
            .find(|r| r.metrica == name)
            .and_then(|r| r.valor)
            .unwrap_or(Decimal::ZERO)
    };
    let count = |name: &str| -> i64 { value(name).trunc().to_i64().unwrap_or(0) };

    AdminMetrics {
        total_clients: count("total_clientes"),
        pending_invoices: count("faturas_pendentes"),
        calculated_invoices: count("faturas_calculadas"),
        pending_boletos: count("boletos_pendentes"),
        total_savings_month: value("economia_total_mes"),
        paid_boletos: count("boletos_pagos"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::ClientStatistics;

    fn savings_row(mes_ano: &str, enel: i64, p2p: i64, economia: i64) -> SavingsRow {
        SavingsRow {
            mes_ano: mes_ano.into(),
            fatura_enel_bruta: Some(Decimal::from(enel)),
            nova_fatura_p2p: Some(Decimal::from(p2p)),
            economia_cliente: Some(Decimal::from(economia)),
        }
    }

    #[test]
    fn year_to_date_only_counts_current_year() {
        let rows = vec![
            savings_row("11/2023", 300, 250, 50),
            savings_row("12/2023", 310, 260, 50),
            savings_row("01/2024", 320, 270, 50),
            savings_row("02/2024", 280, 240, 40),
        ];

        let dashboard = build_client_dashboard(ClientDashboardPayload::default(), &rows, 2024);

        assert_eq!(dashboard.year_to_date_savings, Decimal::from(90));
        assert_eq!(dashboard.year_to_date_savings_formatted, "R$ 90,00");
        assert_eq!(dashboard.savings_chart.len(), 4);
        assert_eq!(dashboard.savings_chart[0].month, "Nov/2023");
        assert_eq!(dashboard.savings_chart[3].utility_amount, Decimal::from(280));
    }

    #[test]
    fn missing_last_invoice_uses_placeholders() {
        let dashboard = build_client_dashboard(ClientDashboardPayload::default(), &[], 2024);
        let card = dashboard.last_invoice;

        assert_eq!(card.month_year, "-");
        assert_eq!(card.savings_percent, Decimal::ZERO);
        assert_eq!(card.boleto_status, "pendente");
        assert_eq!(dashboard.statistics.total_invoices, 0);
    }

    #[test]
    fn savings_percent_is_relative_to_original_amount() {
        let payload = ClientDashboardPayload {
            ultimas_faturas: vec![RecentInvoice {
                mes_ano: Some("03/2024".into()),
                valor_original: Some(Decimal::from(200)),
                economia: Some(Decimal::from(30)),
                status: Some("pago".into()),
                ..Default::default()
            }],
            estatisticas: Some(ClientStatistics { total_invoices: 7, ..Default::default() }),
        };

        let dashboard = build_client_dashboard(payload, &[], 2024);

        assert_eq!(dashboard.last_invoice.savings_percent, Decimal::from(15));
        assert_eq!(dashboard.last_invoice.boleto_status, "pago");
        assert_eq!(dashboard.statistics.total_invoices, 7);
    }

    #[test]
    fn metrics_default_to_zero_when_absent() {
        let rows = vec![
            MetricRow { metrica: "total_clientes".into(), valor: Some(Decimal::from(42)) },
            MetricRow { metrica: "economia_total_mes".into(), valor: Some(Decimal::new(123450, 2)) },
            MetricRow { metrica: "boletos_pagos".into(), valor: None },
        ];

        let metrics = metrics_from_rows(&rows);

        assert_eq!(metrics.total_clients, 42);
        assert_eq!(metrics.total_savings_month, Decimal::new(123450, 2));
        assert_eq!(metrics.paid_boletos, 0);
        assert_eq!(metrics.pending_invoices, 0);
    }
}
