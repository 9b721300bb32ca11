// src/services/billing_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::format_currency},
    db::{BoletoRepository, InvoiceRepository, ProcedureGateway, RemoteProcedure},
    models::billing::{
        BillableInvoice, Boleto, BoletoHistory, BoletoStatus, CalculationOutcome,
        CalculationResponse, HistoryFilter, InvoiceSummary, ProcedureAck,
    },
};

/// Fluxo da fatura: validação -> cálculo -> boleto -> link de pagamento -> pagamento.
/// As três primeiras etapas são funções remotas; aqui só orquestramos.
#[derive(Clone)]
pub struct BillingService {
    invoice_repo: InvoiceRepository,
    boleto_repo: BoletoRepository,
    procedures: ProcedureGateway,
}

impl BillingService {
    pub fn new(
        invoice_repo: InvoiceRepository,
        boleto_repo: BoletoRepository,
        procedures: ProcedureGateway,
    ) -> Self {
        Self { invoice_repo, boleto_repo, procedures }
    }

    // =========================================================================
    //  FILAS
    // =========================================================================

    pub async fn list_pending_validation(&self, conn: &mut PgConnection) -> Result<Vec<InvoiceSummary>, AppError> {
        self.invoice_repo.list_pending_validation(conn, None).await
    }

    pub async fn list_awaiting_calculation(&self, conn: &mut PgConnection) -> Result<Vec<InvoiceSummary>, AppError> {
        self.invoice_repo.list_awaiting_calculation(conn).await
    }

    pub async fn list_awaiting_boleto(&self, conn: &mut PgConnection) -> Result<Vec<BillableInvoice>, AppError> {
        self.invoice_repo.list_awaiting_boleto(conn).await
    }

    // =========================================================================
    //  AÇÕES (RPC)
    // =========================================================================

    pub async fn validate_invoice(&self, conn: &mut PgConnection, invoice_id: Uuid) -> Result<ProcedureAck, AppError> {
        let ack: ProcedureAck = self.procedures
            .call(conn, RemoteProcedure::ValidateInvoice, invoice_id)
            .await?;

        tracing::info!("✅ Fatura {} validada", invoice_id);
        Ok(ack)
    }

    pub async fn calculate_invoice(
        &self,
        conn: &mut PgConnection,
        invoice_id: Uuid,
    ) -> Result<CalculationResponse, AppError> {
        let outcome: CalculationOutcome = self.procedures
            .call(conn, RemoteProcedure::CalculateInvoice, invoice_id)
            .await?;

        let calculation = outcome.calculos;
        tracing::info!(
            "🧮 Fatura {} calculada: economia {}, nova fatura {}",
            invoice_id,
            calculation.economia_cliente,
            calculation.nova_fatura_p2p
        );

        Ok(CalculationResponse {
            savings_formatted: format_currency(calculation.economia_cliente),
            new_invoice_formatted: format_currency(calculation.nova_fatura_p2p),
            calculation,
        })
    }

    pub async fn generate_boleto(&self, conn: &mut PgConnection, invoice_id: Uuid) -> Result<ProcedureAck, AppError> {
        let ack: ProcedureAck = self.procedures
            .call(conn, RemoteProcedure::GenerateBoleto, invoice_id)
            .await?;

        tracing::info!("🧾 Boleto gerado para a fatura {} ({:?})", invoice_id, ack.id_boleto);
        Ok(ack)
    }

    // =========================================================================
    //  BOLETOS
    // =========================================================================

    pub async fn get_client_history(
        &self,
        conn: &mut PgConnection,
        client_id: Uuid,
        filter: HistoryFilter,
    ) -> Result<BoletoHistory, AppError> {
        let rows = self.boleto_repo.list_by_client(conn, client_id).await?;
        let boletos = rows.into_iter().map(Boleto::from).collect();

        Ok(BoletoHistory::build(boletos, filter))
    }

    /// Registra o link emitido pelo provedor de pagamento e marca o boleto como enviado.
    pub async fn register_payment_link(
        &self,
        conn: &mut PgConnection,
        boleto_id: Uuid,
        url: &str,
    ) -> Result<Boleto, AppError> {
        let current = self.current_status(&mut *conn, boleto_id).await?;

        if !current.accepts_payment_link() {
            return Err(AppError::InvalidStatusTransition {
                from: current.to_string(),
                to: BoletoStatus::Enviado.to_string(),
            });
        }

        self.apply_transition(conn, boleto_id, current, BoletoStatus::Enviado, Some(url)).await
    }

    pub async fn change_status(
        &self,
        conn: &mut PgConnection,
        boleto_id: Uuid,
        next: BoletoStatus,
    ) -> Result<Boleto, AppError> {
        let current = self.current_status(&mut *conn, boleto_id).await?;
        let next = current.transition_to(next)?;

        self.apply_transition(conn, boleto_id, current, next, None).await
    }

    async fn current_status(&self, conn: &mut PgConnection, boleto_id: Uuid) -> Result<BoletoStatus, AppError> {
        let row = self.boleto_repo
            .find_by_id(conn, boleto_id)
            .await?
            .ok_or(AppError::NotFound { resource: "Boleto" })?;

        Ok(BoletoStatus::from_db(&row.status))
    }

    async fn apply_transition(
        &self,
        conn: &mut PgConnection,
        boleto_id: Uuid,
        current: BoletoStatus,
        next: BoletoStatus,
        payment_link: Option<&str>,
    ) -> Result<Boleto, AppError> {
        let updated = self.boleto_repo
            .update_status(conn, boleto_id, current, next, payment_link)
            .await?
            // Outro admin mexeu no boleto entre a leitura e o update
            .ok_or_else(|| AppError::InvalidStatusTransition {
                from: current.to_string(),
                to: next.to_string(),
            })?;

        tracing::info!("🔁 Boleto {}: {} -> {}", boleto_id, current, next);
        Ok(Boleto::from(updated))
    }
}
