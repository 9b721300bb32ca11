// src/services/consumption_service.rs

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::format_month_year},
    db::InvoiceRepository,
    models::consumption::{
        ConsumptionChartPoint, ConsumptionReport, ConsumptionRow, ConsumptionStats,
        MonthlyConsumptionRecord, TrendClassification,
    },
};

// Tamanho da janela de histórico exibida no painel do cliente
pub const HISTORY_MONTHS: i64 = 12;

// Abaixo disso não há "3 recentes vs 3 anteriores"
const TREND_MIN_RECORDS: usize = 6;
const TREND_GROUP: usize = 3;
const TREND_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Agrega a série mensal (já em ordem cronológica) para os cards e o gráfico.
pub fn analyze(records: &[MonthlyConsumptionRecord]) -> ConsumptionStats {
    if records.is_empty() {
        return ConsumptionStats::empty();
    }

    let consumptions: Vec<Decimal> = records.iter().map(|r| r.consumption_kwh).collect();

    let total: Decimal = consumptions.iter().sum();
    let average = total / Decimal::from(consumptions.len());
    let max = consumptions.iter().copied().max().unwrap_or(Decimal::ZERO);
    let min = consumptions.iter().copied().min().unwrap_or(Decimal::ZERO);

    ConsumptionStats { total, average, max, min, trend: classify_trend(&consumptions) }
}

/// Média dos 3 últimos meses contra a dos 3 anteriores.
pub fn classify_trend(consumptions: &[Decimal]) -> TrendClassification {
    if consumptions.len() < TREND_MIN_RECORDS {
        return TrendClassification::Stable;
    }

    let window = &consumptions[consumptions.len() - TREND_MIN_RECORDS..];
    let (previous, recent) = window.split_at(TREND_GROUP);

    match percentage_change(mean(previous), mean(recent)) {
        Some(delta) if delta > TREND_THRESHOLD_PERCENT => TrendClassification::Increasing,
        Some(delta) if delta < -TREND_THRESHOLD_PERCENT => TrendClassification::Decreasing,
        // Média anterior zerada não tem variação percentual definida
        _ => TrendClassification::Stable,
    }
}

/// Variação percentual de `from` para `to`; `None` quando `from` é zero.
pub fn percentage_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        return None;
    }
    (to - from)
        .checked_div(from)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

#[derive(Clone)]
pub struct ConsumptionService {
    repo: InvoiceRepository,
}

impl ConsumptionService {
    pub fn new(repo: InvoiceRepository) -> Self {
        Self { repo }
    }

    pub async fn get_report(
        &self,
        conn: &mut PgConnection,
        client_id: Uuid,
    ) -> Result<ConsumptionReport, AppError> {
        let rows = self.repo.list_recent_consumption(&mut *conn, client_id, HISTORY_MONTHS).await?;
        Ok(build_report(client_id, rows))
    }
}

/// Monta o relatório a partir das linhas cruas: descarta períodos inválidos,
/// ordena cronologicamente e gera uma barra do gráfico por mês.
pub fn build_report(client_id: Uuid, rows: Vec<ConsumptionRow>) -> ConsumptionReport {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match MonthlyConsumptionRecord::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("⚠️ Fatura ignorada no consumo do cliente {}: {}", client_id, e),
        }
    }
    records.sort_by_key(|r| r.period);

    let stats = analyze(&records);
    tracing::debug!(
        "Consumo do cliente {}: {} meses, tendência {:?}",
        client_id,
        records.len(),
        stats.trend
    );

    let chart = records
        .iter()
        .map(|r| ConsumptionChartPoint {
            month: format_month_year(&r.period),
            consumption: r.consumption_kwh,
            average: r.trailing_average_kwh,
        })
        .collect();

    ConsumptionReport { trend_label: stats.trend.label().to_string(), stats, chart }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::consumption::Period;

    fn series(values: &[i64]) -> Vec<MonthlyConsumptionRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let period = Period::new(i as u32 + 1, 2024).unwrap();
                MonthlyConsumptionRecord::new(period, Decimal::from(*v))
            })
            .collect()
    }

    #[test]
    fn empty_series_yields_zeroed_stats() {
        let stats = analyze(&[]);

        assert_eq!(stats.total, Decimal::ZERO);
        assert_eq!(stats.average, Decimal::ZERO);
        assert_eq!(stats.max, Decimal::ZERO);
        assert_eq!(stats.min, Decimal::ZERO);
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn single_record() {
        let stats = analyze(&series(&[100]));

        assert_eq!(stats.total, Decimal::from(100));
        assert_eq!(stats.average, Decimal::from(100));
        assert_eq!(stats.max, Decimal::from(100));
        assert_eq!(stats.min, Decimal::from(100));
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn constant_year_is_stable() {
        let stats = analyze(&series(&[200; 12]));

        assert_eq!(stats.total, Decimal::from(2400));
        assert_eq!(stats.average, Decimal::from(200));
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn thirty_percent_rise_is_increasing() {
        let stats = analyze(&series(&[100, 100, 100, 130, 130, 130]));

        assert_eq!(stats.max, Decimal::from(130));
        assert_eq!(stats.min, Decimal::from(100));
        assert_eq!(stats.trend, TrendClassification::Increasing);
    }

    #[test]
    fn drop_is_decreasing() {
        let stats = analyze(&series(&[130, 130, 130, 100, 100, 100]));
        assert_eq!(stats.trend, TrendClassification::Decreasing);

        let delta = percentage_change(Decimal::from(130), Decimal::from(100)).unwrap();
        assert!(delta < Decimal::from(-23) && delta > Decimal::from(-24));
    }

    #[test]
    fn five_records_never_trend() {
        let stats = analyze(&series(&[10, 10, 500, 900, 1200]));
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn only_last_six_months_matter() {
        // O pico no começo do ano fica fora da janela
        let stats = analyze(&series(&[900, 900, 900, 100, 100, 100, 100, 100, 100]));
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn zero_previous_average_is_stable() {
        let stats = analyze(&series(&[0, 0, 0, 150, 150, 150]));
        assert_eq!(stats.trend, TrendClassification::Stable);
    }

    #[test]
    fn exactly_five_percent_is_stable() {
        assert_eq!(
            classify_trend(&series_values(&[100, 100, 100, 105, 105, 105])),
            TrendClassification::Stable
        );
        assert_eq!(
            classify_trend(&series_values(&[100, 100, 100, 95, 95, 95])),
            TrendClassification::Stable
        );
    }

    #[test]
    fn analyze_is_idempotent() {
        let input = series(&[120, 80, 95, 140, 160, 150, 170]);
        assert_eq!(analyze(&input), analyze(&input));
    }

    fn series_values(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    fn row(mes_ano: &str, kwh: Option<i64>, media: Option<i64>) -> ConsumptionRow {
        ConsumptionRow {
            mes_ano: mes_ano.into(),
            consumo_kwh: kwh.map(Decimal::from),
            media_consumo_12_meses: media.map(Decimal::from),
        }
    }

    #[test]
    fn report_sorts_chart_and_skips_invalid_periods() {
        let rows = vec![
            row("01/2025", Some(300), None),
            row("13/2024", Some(999), Some(999)),
            row("12/2024", Some(250), Some(240)),
            row("ab/2024", Some(999), Some(999)),
        ];

        let report = build_report(Uuid::nil(), rows);

        let months: Vec<&str> = report.chart.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Dez/2024", "Jan/2025"]);

        assert_eq!(report.chart[0].consumption, Decimal::from(250));
        assert_eq!(report.chart[0].average, Decimal::from(240));
        // Média ausente vira zero
        assert_eq!(report.chart[1].average, Decimal::ZERO);

        assert_eq!(report.stats.total, Decimal::from(550));
        assert_eq!(report.stats.trend, TrendClassification::Stable);
        assert_eq!(report.trend_label, "Estável");
    }

    #[test]
    fn report_label_follows_trend() {
        let rows = ["01", "02", "03", "04", "05", "06"]
            .iter()
            .zip([100, 100, 100, 130, 130, 130])
            .rev()
            .map(|(m, v)| row(&format!("{m}/2024"), Some(v), None))
            .collect();

        let report = build_report(Uuid::nil(), rows);

        assert_eq!(report.chart.first().map(|p| p.month.as_str()), Some("Jan/2024"));
        assert_eq!(report.stats.trend, TrendClassification::Increasing);
        assert_eq!(report.trend_label, "Crescente");
    }

    #[test]
    fn report_with_null_consumption_counts_zero() {
        let report = build_report(Uuid::nil(), vec![row("03/2024", None, None)]);

        assert_eq!(report.chart.len(), 1);
        assert_eq!(report.chart[0].consumption, Decimal::ZERO);
        assert_eq!(report.stats.max, Decimal::ZERO);
    }
}
