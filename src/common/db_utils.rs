// src/common/db_utils.rs

use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{common::error::AppError, middleware::auth::SessionContext};

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação com as claims do usuário em `request.jwt.claims`,
/// que é de onde as policies do Supabase leem `auth.uid()`.
/// O `set_config(..., true)` vale só até o commit/rollback.
pub(crate) async fn begin_session_tx(
    pool: &PgPool,
    session: &SessionContext,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    let claims = json!({
        "sub": session.user_id.to_string(),
        "role": "authenticated",
        "email": session.email,
    });

    sqlx::query("SELECT set_config('request.jwt.claims', $1, true)")
        .bind(claims.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

// Leituras também fecham com commit; o rollback fica para o drop em caso de erro
pub(crate) async fn commit_session_tx(tx: Transaction<'static, Postgres>) -> Result<(), AppError> {
    tx.commit().await?;
    Ok(())
}

// ---
// Ordenação por período ("MM/YYYY")
// ---
/// Textos que o `to_date(..., 'MM/YYYY')` aceita sem erro.
pub(crate) const PERIOD_PATTERN: &str = "^(0?[1-9]|1[0-2])/[1-9][0-9]{3}$";

/// Chave cronológica que vira NULL para período fora do formato.
/// Um `to_date` direto derruba a consulta inteira na primeira linha inválida.
pub(crate) fn period_sort_key(column: &str) -> String {
    format!("(CASE WHEN {column} ~ '{PERIOD_PATTERN}' THEN to_date({column}, 'MM/YYYY') END)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_guards_to_date_with_pattern() {
        assert_eq!(
            period_sort_key("f.mes_ano"),
            "(CASE WHEN f.mes_ano ~ '^(0?[1-9]|1[0-2])/[1-9][0-9]{3}$' THEN to_date(f.mes_ano, 'MM/YYYY') END)"
        );
    }
}
