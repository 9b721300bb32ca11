// src/models/consumption.rs

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- Período (coluna `mes_ano`, formato "MM/YYYY") ---

/// Mês de referência de uma fatura.
///
/// A ordenação é cronológica (ano, depois mês). Comparar o texto "MM/YYYY"
/// diretamente coloca "01/2025" antes de "12/2024".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    // A ordem dos campos importa para o derive de Ord
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidPeriod(format!("{:02}/{}", month, year)));
        }
        Ok(Self { year, month })
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidPeriod(raw.to_string());

        let (month, year) = raw.trim().split_once('/').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        Period::new(month, year).map_err(|_| invalid())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// --- Série de consumo ---

// Linha crua da tabela `faturas`. Qualquer coluna pode vir nula.
#[derive(Debug, Clone, FromRow)]
pub struct ConsumptionRow {
    pub mes_ano: String,
    pub consumo_kwh: Option<Decimal>,
    pub media_consumo_12_meses: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyConsumptionRecord {
    pub period: Period,
    pub consumption_kwh: Decimal,
    pub trailing_average_kwh: Decimal,
}

impl MonthlyConsumptionRecord {
    pub fn new(period: Period, consumption_kwh: Decimal) -> Self {
        Self { period, consumption_kwh, trailing_average_kwh: Decimal::ZERO }
    }
}

impl TryFrom<ConsumptionRow> for MonthlyConsumptionRecord {
    type Error = AppError;

    // Consumo ausente conta como zero
    fn try_from(row: ConsumptionRow) -> Result<Self, Self::Error> {
        let record = Self::new(row.mes_ano.parse()?, row.consumo_kwh.unwrap_or(Decimal::ZERO));
        Ok(Self {
            trailing_average_kwh: row.media_consumo_12_meses.unwrap_or(Decimal::ZERO),
            ..record
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendClassification {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendClassification {
    pub fn label(&self) -> &'static str {
        match self {
            TrendClassification::Increasing => "Crescente",
            TrendClassification::Decreasing => "Decrescente",
            TrendClassification::Stable => "Estável",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionStats {
    #[schema(example = "2400")]
    pub total: Decimal,
    #[schema(example = "200")]
    pub average: Decimal,
    pub max: Decimal,
    pub min: Decimal,
    pub trend: TrendClassification,
}

impl ConsumptionStats {
    pub fn empty() -> Self {
        Self {
            total: Decimal::ZERO,
            average: Decimal::ZERO,
            max: Decimal::ZERO,
            min: Decimal::ZERO,
            trend: TrendClassification::Stable,
        }
    }
}

// Uma barra do gráfico "Consumo do Mês" x "Média 12 Meses"
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionChartPoint {
    #[schema(example = "Mar/2024")]
    pub month: String,
    pub consumption: Decimal,
    pub average: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    pub stats: ConsumptionStats,
    #[schema(example = "Estável")]
    pub trend_label: String,
    pub chart: Vec<ConsumptionChartPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_orders_by_year_before_month() {
        let dec_2024: Period = "12/2024".parse().unwrap();
        let jan_2025: Period = "01/2025".parse().unwrap();

        assert!(dec_2024 < jan_2025);
        assert_eq!(jan_2025.to_string(), "01/2025");
    }

    #[test]
    fn period_rejects_garbage() {
        assert!("13/2024".parse::<Period>().is_err());
        assert!("2024-01".parse::<Period>().is_err());
        assert!("ab/2024".parse::<Period>().is_err());
    }

    #[test]
    fn null_consumption_becomes_zero() {
        let row = ConsumptionRow {
            mes_ano: "3/2024".into(),
            consumo_kwh: None,
            media_consumo_12_meses: Some(Decimal::from(180)),
        };

        let record = MonthlyConsumptionRecord::try_from(row).unwrap();
        assert_eq!(record.period, Period::new(3, 2024).unwrap());
        assert_eq!(record.consumption_kwh, Decimal::ZERO);
        assert_eq!(record.trailing_average_kwh, Decimal::from(180));
    }
}
