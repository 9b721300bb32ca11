// src/db/boleto_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::period_sort_key, error::AppError},
    models::billing::{BoletoRow, BoletoStatus},
};

const BOLETO_COLUMNS: &str = r#"
    id_boleto, id_cliente, id_fatura, nome_cliente, valor_fatura, mes_referencia,
    status, link_pagamento, data_pagamento, pago_em
"#;

// Boleto com referência fora do formato continua no histórico, só que no fim
fn client_history_sql() -> String {
    let key = period_sort_key("mes_referencia");
    format!(
        r#"
        SELECT {BOLETO_COLUMNS}
        FROM boletos
        WHERE id_cliente = $1
        ORDER BY {key} DESC NULLS LAST
        "#
    )
}

#[derive(Clone, Default)]
pub struct BoletoRepository;

impl BoletoRepository {
    pub fn new() -> Self {
        Self
    }

    // Histórico do cliente, referência mais recente primeiro
    pub async fn list_by_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<BoletoRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = client_history_sql();

        let rows = sqlx::query_as::<_, BoletoRow>(&sql)
            .bind(client_id)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        boleto_id: Uuid,
    ) -> Result<Option<BoletoRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {BOLETO_COLUMNS} FROM boletos WHERE id_boleto = $1");

        let row = sqlx::query_as::<_, BoletoRow>(&sql)
            .bind(boleto_id)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }

    /// Troca o status só se ele ainda for `expected` (evita corrida entre dois admins).
    /// `None` quando outro processo mudou o boleto antes.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        boleto_id: Uuid,
        expected: BoletoStatus,
        next: BoletoStatus,
        payment_link: Option<&str>,
    ) -> Result<Option<BoletoRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE boletos
            SET status = $3,
                link_pagamento = COALESCE($4, link_pagamento),
                pago_em = CASE WHEN $3 = 'pago' THEN now() ELSE pago_em END
            WHERE id_boleto = $1
              AND status = $2
            RETURNING {BOLETO_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, BoletoRow>(&sql)
            .bind(boleto_id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(payment_link)
            .fetch_optional(executor)
            .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_sorts_with_guarded_period_key() {
        let sql = client_history_sql();
        assert!(!sql.contains("ORDER BY to_date("));
        assert!(sql.contains(&format!("ORDER BY {} DESC NULLS LAST", period_sort_key("mes_referencia"))));
    }
}
