// src/models/billing.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::common::error::AppError;

// =========================================================================
//  FATURAS
// =========================================================================

// Fatura ativa aguardando alguma etapa do fluxo (validação ou cálculo)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id_fatura: Uuid,
    #[schema(example = "Maria Souza")]
    pub nome_cliente: Option<String>,
    #[schema(example = "03/2024")]
    pub mes_ano: String,
    #[schema(example = "320")]
    pub consumo_kwh: Option<Decimal>,
    #[schema(example = "289.90")]
    pub valor_fatura_atual: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-04-10")]
    pub data_vencimento: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

// Fatura já calculada, pronta para virar boleto
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillableInvoice {
    pub id_fatura: Uuid,
    pub nome_cliente: Option<String>,
    pub email_cliente: Option<String>,
    pub mes_ano: String,
    pub fatura_enel_bruta: Option<Decimal>,
    pub nova_fatura_p2p: Option<Decimal>,
    pub economia_cliente: Option<Decimal>,
}

// Linha do gráfico "Sem desconto x Com desconto" (view_faturas_completas)
#[derive(Debug, Clone, FromRow)]
pub struct SavingsRow {
    pub mes_ano: String,
    pub fatura_enel_bruta: Option<Decimal>,
    pub nova_fatura_p2p: Option<Decimal>,
    pub economia_cliente: Option<Decimal>,
}

// Resultado de `calcular_fatura`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceCalculation {
    pub id_calculo: Option<Uuid>,
    pub id_fatura: Option<Uuid>,
    #[serde(default)]
    pub nova_fatura_p2p: Decimal,
    #[serde(default)]
    pub fatura_enel_bruta: Decimal,
    #[serde(default)]
    pub economia_cliente: Decimal,
    #[serde(default)]
    pub economia_cliente_perc: Option<Decimal>,
    #[serde(default)]
    pub lucro_p2p: Option<Decimal>,
    #[serde(default)]
    pub reserva_creditos: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationOutcome {
    pub calculos: InvoiceCalculation,
}

// Resposta do admin após o cálculo, já com os valores formatados para o aviso
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub calculation: InvoiceCalculation,
    #[schema(example = "R$ 45,80")]
    pub savings_formatted: String,
    #[schema(example = "R$ 244,10")]
    pub new_invoice_formatted: String,
}

// Respostas simples das funções `validar_fatura` / `gerar_boleto`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProcedureAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id_boleto: Option<Uuid>,
}

// =========================================================================
//  BOLETOS
// =========================================================================

/// Ciclo de vida: pendente -> aguardando_link -> enviado -> pago.
/// Qualquer estado não final pode ser cancelado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BoletoStatus {
    Pendente,
    AguardandoLink,
    Enviado,
    Pago,
    Cancelado,
}

impl BoletoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoletoStatus::Pendente => "pendente",
            BoletoStatus::AguardandoLink => "aguardando_link",
            BoletoStatus::Enviado => "enviado",
            BoletoStatus::Pago => "pago",
            BoletoStatus::Cancelado => "cancelado",
        }
    }

    // Status desconhecido é exibido como pendente
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "aguardando_link" => BoletoStatus::AguardandoLink,
            "enviado" => BoletoStatus::Enviado,
            "pago" => BoletoStatus::Pago,
            "cancelado" => BoletoStatus::Cancelado,
            _ => BoletoStatus::Pendente,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BoletoStatus::Pendente => "Pendente",
            BoletoStatus::AguardandoLink => "Processando",
            BoletoStatus::Enviado => "Enviado",
            BoletoStatus::Pago => "Pago",
            BoletoStatus::Cancelado => "Cancelado",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, BoletoStatus::Pago | BoletoStatus::Cancelado)
    }

    /// Ainda conta como "a pagar" no histórico do cliente
    pub fn is_awaiting_payment(&self) -> bool {
        matches!(self, BoletoStatus::Pendente | BoletoStatus::Enviado)
    }

    /// O link do provedor de pagamento só pode ser registrado antes do envio
    pub fn accepts_payment_link(&self) -> bool {
        matches!(self, BoletoStatus::Pendente | BoletoStatus::AguardandoLink)
    }

    pub fn can_transition_to(&self, next: BoletoStatus) -> bool {
        use BoletoStatus::*;
        match (self, next) {
            (from, Cancelado) => !from.is_final(),
            (Pendente, AguardandoLink) => true,
            (Pendente | AguardandoLink, Enviado) => true,
            (Enviado, Pago) => true,
            _ => false,
        }
    }

    pub fn transition_to(&self, next: BoletoStatus) -> Result<BoletoStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for BoletoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Linha da tabela `boletos`
#[derive(Debug, Clone, FromRow)]
pub struct BoletoRow {
    pub id_boleto: Uuid,
    pub id_cliente: Uuid,
    pub id_fatura: Option<Uuid>,
    pub nome_cliente: Option<String>,
    pub valor_fatura: Option<Decimal>,
    pub mes_referencia: String,
    pub status: String,
    pub link_pagamento: Option<String>,
    pub data_pagamento: Option<NaiveDate>,
    pub pago_em: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Boleto {
    pub id_boleto: Uuid,
    pub id_cliente: Uuid,
    pub id_fatura: Option<Uuid>,
    pub nome_cliente: Option<String>,
    pub mes_referencia: String,
    pub valor_fatura: Decimal,
    #[schema(example = "R$ 244,10")]
    pub valor_formatado: String,
    pub status: BoletoStatus,
    #[schema(example = "Pendente")]
    pub status_label: String,
    pub link_pagamento: Option<String>,
    // Vencimento
    #[schema(value_type = Option<String>, format = Date, example = "2024-04-10")]
    pub data_pagamento: Option<NaiveDate>,
    #[schema(example = "10/04/2024")]
    pub vencimento_formatado: Option<String>,
    pub pago_em: Option<DateTime<Utc>>,
    /// Tem link e ainda não foi pago
    pub payable: bool,
}

impl From<BoletoRow> for Boleto {
    fn from(row: BoletoRow) -> Self {
        let status = BoletoStatus::from_db(&row.status);
        let valor_fatura = row.valor_fatura.unwrap_or(Decimal::ZERO);
        let payable = row.link_pagamento.is_some() && status != BoletoStatus::Pago;

        Self {
            id_boleto: row.id_boleto,
            id_cliente: row.id_cliente,
            id_fatura: row.id_fatura,
            nome_cliente: row.nome_cliente,
            mes_referencia: row.mes_referencia,
            valor_formatado: crate::common::format::format_currency(valor_fatura),
            valor_fatura,
            status,
            status_label: status.label().to_string(),
            link_pagamento: row.link_pagamento,
            vencimento_formatado: row.data_pagamento.map(crate::common::format::format_date),
            data_pagamento: row.data_pagamento,
            pago_em: row.pago_em,
            payable,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    Paid,
    Pending,
}

impl HistoryFilter {
    pub fn matches(&self, status: BoletoStatus) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Paid => status == BoletoStatus::Pago,
            HistoryFilter::Pending => status.is_awaiting_payment(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoletoHistory {
    pub boletos: Vec<Boleto>,
    pub count_all: usize,
    pub count_paid: usize,
    pub count_pending: usize,
    pub total_paid: Decimal,
    pub total_open: Decimal,
}

impl BoletoHistory {
    /// Contadores e totais são sempre sobre o histórico completo; só a lista é filtrada.
    pub fn build(all: Vec<Boleto>, filter: HistoryFilter) -> Self {
        let count_all = all.len();
        let count_paid = all.iter().filter(|b| b.status == BoletoStatus::Pago).count();
        let count_pending = all.iter().filter(|b| b.status.is_awaiting_payment()).count();

        let total_paid = all
            .iter()
            .filter(|b| b.status == BoletoStatus::Pago)
            .map(|b| b.valor_fatura)
            .sum();
        let total_open = all
            .iter()
            .filter(|b| !b.status.is_final())
            .map(|b| b.valor_fatura)
            .sum();

        let boletos = all.into_iter().filter(|b| filter.matches(b.status)).collect();

        Self { boletos, count_all, count_paid, count_pending, total_paid, total_open }
    }
}
