// src/common/format.rs
//
// Helpers de exibição no padrão brasileiro (pt-BR).

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::consumption::Period;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// `1234.5` -> `R$ 1.234,50`
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let digits = format!("{:.2}", rounded.abs());
    let (integer, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, cents)
}

/// CPF (11 dígitos) ou CNPJ (14 dígitos). Qualquer outra coisa volta como veio.
pub fn format_cpf_cnpj(value: &str) -> String {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    match value.len() {
        11 => format!("{}.{}.{}-{}", &value[0..3], &value[3..6], &value[6..9], &value[9..11]),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &value[0..2],
            &value[2..5],
            &value[5..8],
            &value[8..12],
            &value[12..14]
        ),
        _ => value.to_string(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `03/2024` -> `Mar/2024`
pub fn format_month_year(period: &Period) -> String {
    let index = (period.month as usize).saturating_sub(1).min(11);
    format!("{}/{}", MONTH_ABBREVIATIONS[index], period.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_brazilian_separators() {
        assert_eq!(format_currency(Decimal::new(123456, 2)), "R$ 1.234,56");
        assert_eq!(format_currency(Decimal::from(1_000_000)), "R$ 1.000.000,00");
        assert_eq!(format_currency(Decimal::new(5, 1)), "R$ 0,50");
        assert_eq!(format_currency(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(10005, 3)), "R$ 10,01");
        assert_eq!(format_currency(Decimal::new(-25075, 2)), "-R$ 250,75");
    }

    #[test]
    fn cpf_and_cnpj_masks() {
        assert_eq!(format_cpf_cnpj("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf_cnpj("12345678000199"), "12.345.678/0001-99");
        assert_eq!(format_cpf_cnpj("123"), "123");
        assert_eq!(format_cpf_cnpj("123.456.789-01"), "123.456.789-01");
    }

    #[test]
    fn dates_and_months() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2024");

        let period = Period::new(12, 2023).unwrap();
        assert_eq!(format_month_year(&period), "Dez/2023");
    }
}
