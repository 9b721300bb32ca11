// src/db/invoice_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::period_sort_key, error::AppError},
    models::{
        billing::{BillableInvoice, InvoiceSummary, SavingsRow},
        consumption::ConsumptionRow,
    },
};

// `mes_ano` é texto "MM/YYYY": toda ordenação usa period_sort_key para ser cronológica.
// Linhas com período inválido vão para o fim (NULLS LAST) e o Rust decide o que fazer com elas.
#[derive(Clone, Default)]
pub struct InvoiceRepository;

fn recent_consumption_sql() -> String {
    let key = period_sort_key("mes_ano");
    format!(
        r#"
        SELECT mes_ano, consumo_kwh, media_consumo_12_meses
        FROM (
            SELECT mes_ano, consumo_kwh, media_consumo_12_meses, {key} AS periodo
            FROM faturas
            WHERE id_cliente = $1
              AND status = 'ativa'
            ORDER BY periodo DESC NULLS LAST
            LIMIT $2
        ) recentes
        ORDER BY periodo ASC NULLS LAST
        "#
    )
}

fn recent_savings_sql() -> String {
    let key = period_sort_key("mes_ano");
    format!(
        r#"
        SELECT mes_ano, fatura_enel_bruta, nova_fatura_p2p, economia_cliente
        FROM (
            SELECT mes_ano, fatura_enel_bruta, nova_fatura_p2p, economia_cliente, {key} AS periodo
            FROM view_faturas_completas
            WHERE id_cliente = $1
              AND status_fatura = 'ativa'
            ORDER BY periodo DESC NULLS LAST
            LIMIT $2
        ) recentes
        ORDER BY periodo ASC NULLS LAST
        "#
    )
}

fn awaiting_calculation_sql() -> String {
    let key = period_sort_key("f.mes_ano");
    format!(
        r#"
        SELECT f.id_fatura, c.nome AS nome_cliente, f.mes_ano, f.consumo_kwh,
               f.valor_fatura_atual, f.data_vencimento, f.created_at
        FROM faturas f
        JOIN clientes c ON c.id_cliente = f.id_cliente
        LEFT JOIN calculos_faturas cf ON cf.id_fatura = f.id_fatura
        WHERE f.dados_validados = true
          AND f.status = 'ativa'
          AND cf.id_calculo IS NULL
        ORDER BY {key} DESC NULLS LAST
        "#
    )
}

fn awaiting_boleto_sql() -> String {
    let key = period_sort_key("f.mes_ano");
    format!(
        r#"
        SELECT f.id_fatura, c.nome AS nome_cliente, c.email AS email_cliente, f.mes_ano,
               cf.fatura_enel_bruta, cf.nova_fatura_p2p, cf.economia_cliente
        FROM faturas f
        JOIN clientes c ON c.id_cliente = f.id_cliente
        JOIN calculos_faturas cf ON cf.id_fatura = f.id_fatura
        LEFT JOIN boletos b ON b.id_fatura = f.id_fatura
        WHERE f.dados_validados = true
          AND f.status = 'ativa'
          AND b.id_boleto IS NULL
        ORDER BY {key} DESC NULLS LAST
        "#
    )
}

impl InvoiceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEITURAS DO CLIENTE
    // =========================================================================

    /// Os `limit` meses mais recentes de faturas ativas, em ordem crescente.
    pub async fn list_recent_consumption<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConsumptionRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = recent_consumption_sql();

        let rows = sqlx::query_as::<_, ConsumptionRow>(&sql)
            .bind(client_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn list_recent_savings<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SavingsRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = recent_savings_sql();

        let rows = sqlx::query_as::<_, SavingsRow>(&sql)
            .bind(client_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    // =========================================================================
    //  FILAS DO ADMIN
    // =========================================================================

    // Faturas ativas ainda não validadas, mais novas primeiro
    pub async fn list_pending_validation<'e, E>(
        &self,
        executor: E,
        limit: Option<i64>,
    ) -> Result<Vec<InvoiceSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id_fatura, nome_cliente, mes_ano, consumo_kwh,
                   valor_fatura_atual, data_vencimento, created_at
            FROM view_faturas_completas
            WHERE dados_validados = false
              AND status_fatura = 'ativa'
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
            // LIMIT NULL = sem limite
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    // Validadas e sem cálculo
    pub async fn list_awaiting_calculation<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<InvoiceSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = awaiting_calculation_sql();

        let rows = sqlx::query_as::<_, InvoiceSummary>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    // Calculadas e sem boleto
    pub async fn list_awaiting_boleto<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<BillableInvoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = awaiting_boleto_sql();

        let rows = sqlx::query_as::<_, BillableInvoice>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nenhuma consulta pode aplicar to_date direto na coluna: um "13/2024" derrubaria tudo
    fn assert_guarded(sql: &str, column: &str) {
        let bare = format!("ORDER BY to_date({column}");
        assert!(!sql.contains(&bare), "to_date sem proteção em: {sql}");
        assert!(sql.contains(&period_sort_key(column)));
        assert!(sql.contains("NULLS LAST"));
    }

    #[test]
    fn client_series_sort_with_guarded_period_key() {
        assert_guarded(&recent_consumption_sql(), "mes_ano");
        assert_guarded(&recent_savings_sql(), "mes_ano");
    }

    #[test]
    fn admin_queues_sort_with_guarded_period_key() {
        assert_guarded(&awaiting_calculation_sql(), "f.mes_ano");
        assert_guarded(&awaiting_boleto_sql(), "f.mes_ano");
    }

    #[test]
    fn window_keeps_latest_and_returns_ascending() {
        let sql = recent_consumption_sql();
        let inner = sql.find("ORDER BY periodo DESC NULLS LAST").unwrap();
        let outer = sql.find("ORDER BY periodo ASC NULLS LAST").unwrap();
        assert!(inner < sql.find("LIMIT $2").unwrap());
        assert!(outer > inner);
    }
}
