// src/db/procedures.rs

use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

/// Funções remotas (RPC) que concentram as regras de faturamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProcedure {
    CalculateInvoice,
    ValidateInvoice,
    GenerateBoleto,
    ClientDashboard,
}

impl RemoteProcedure {
    pub fn sql_name(&self) -> &'static str {
        match self {
            RemoteProcedure::CalculateInvoice => "calcular_fatura",
            RemoteProcedure::ValidateInvoice => "validar_fatura",
            RemoteProcedure::GenerateBoleto => "gerar_boleto",
            RemoteProcedure::ClientDashboard => "dashboard_cliente",
        }
    }

    pub fn param_name(&self) -> &'static str {
        match self {
            RemoteProcedure::ClientDashboard => "p_id_cliente",
            _ => "p_id_fatura",
        }
    }

    // Nomes vêm do enum, nunca do usuário
    fn statement(&self) -> String {
        format!("SELECT {}({} => $1)::jsonb AS result", self.sql_name(), self.param_name())
    }
}

#[derive(Clone, Default)]
pub struct ProcedureGateway;

impl ProcedureGateway {
    pub fn new() -> Self {
        Self
    }

    /// Executa a função e devolve o payload já tipado.
    pub async fn call<'e, E, T>(
        &self,
        executor: E,
        procedure: RemoteProcedure,
        id: Uuid,
    ) -> Result<T, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: DeserializeOwned,
    {
        tracing::debug!("📞 RPC {}({})", procedure.sql_name(), id);

        let statement = procedure.statement();
        let raw: Option<Value> = sqlx::query_scalar(&statement)
            .bind(id)
            .fetch_one(executor)
            .await?;

        interpret(procedure, raw.unwrap_or(Value::Null))
    }
}

/// `success: false` vira erro estruturado. Sem a flag, a resposta é tratada como sucesso.
pub fn interpret<T: DeserializeOwned>(procedure: RemoteProcedure, value: Value) -> Result<T, AppError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("erro não informado")
            .to_string();

        tracing::warn!("❌ {} recusou a operação: {}", procedure.sql_name(), message);
        return Err(AppError::ProcedureFailed { procedure: procedure.sql_name(), message });
    }

    let value = if value.is_null() { Value::Object(Default::default()) } else { value };
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        billing::{CalculationOutcome, ProcedureAck},
        dashboard::ClientDashboardPayload,
    };
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn statement_uses_named_parameter() {
        assert_eq!(
            RemoteProcedure::GenerateBoleto.statement(),
            "SELECT gerar_boleto(p_id_fatura => $1)::jsonb AS result"
        );
        assert_eq!(
            RemoteProcedure::ClientDashboard.statement(),
            "SELECT dashboard_cliente(p_id_cliente => $1)::jsonb AS result"
        );
    }

    #[test]
    fn failure_flag_becomes_procedure_error() {
        let result: Result<ProcedureAck, _> = interpret(
            RemoteProcedure::ValidateInvoice,
            json!({ "success": false, "error": "Fatura sem leitura de consumo" }),
        );

        match result {
            Err(AppError::ProcedureFailed { procedure, message }) => {
                assert_eq!(procedure, "validar_fatura");
                assert_eq!(message, "Fatura sem leitura de consumo");
            }
            other => panic!("esperava ProcedureFailed, veio {:?}", other),
        }
    }

    #[test]
    fn calculation_payload_is_typed() {
        let outcome: CalculationOutcome = interpret(
            RemoteProcedure::CalculateInvoice,
            json!({
                "success": true,
                "calculos": { "economia_cliente": 45.8, "nova_fatura_p2p": 244.1, "fatura_enel_bruta": 289.9 }
            }),
        )
        .unwrap();

        assert_eq!(outcome.calculos.economia_cliente, Decimal::new(458, 1));
        assert_eq!(outcome.calculos.nova_fatura_p2p, Decimal::new(2441, 1));
        assert!(outcome.calculos.lucro_p2p.is_none());
    }

    #[test]
    fn missing_flag_and_null_are_success() {
        let payload: ClientDashboardPayload =
            interpret(RemoteProcedure::ClientDashboard, Value::Null).unwrap();
        assert!(payload.ultimas_faturas.is_empty());
        assert!(payload.estatisticas.is_none());
    }
}
