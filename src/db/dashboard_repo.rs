// src/db/dashboard_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::dashboard::MetricRow};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // Métricas agregadas do painel admin (uma linha por métrica)
    pub async fn get_admin_metrics<'e, E>(&self, executor: E) -> Result<Vec<MetricRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MetricRow>(
            "SELECT metrica, valor::numeric AS valor FROM view_dashboard_admin",
        )
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}
