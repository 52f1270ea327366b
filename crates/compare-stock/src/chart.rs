//! Key-indicator comparison chart
//!
//! Renders a grouped horizontal bar chart as text. Prices, capitalisations
//! and ratios differ by many orders of magnitude, so each indicator group
//! is scaled to its own largest absolute value.

use serde::{Deserialize, Serialize};

use crate::format::{format_currency, format_percent};
use crate::language::Language;
use crate::snapshot::FinancialSnapshot;

const POSITIVE_GLYPH: char = '█';
const NEGATIVE_GLYPH: char = '▒';

/// Indicators plotted, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    CurrentPrice,
    MarketCap,
    Revenue,
    NetIncome,
    ReturnOnEquity,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::CurrentPrice,
        Indicator::MarketCap,
        Indicator::Revenue,
        Indicator::NetIncome,
        Indicator::ReturnOnEquity,
    ];

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Indicator::CurrentPrice, Language::French) => "Prix actuel",
            (Indicator::CurrentPrice, Language::English) => "Current price",
            (Indicator::MarketCap, Language::French) => "Capitalisation",
            (Indicator::MarketCap, Language::English) => "Market cap",
            (Indicator::Revenue, Language::French) => "Chiffre d'affaires",
            (Indicator::Revenue, Language::English) => "Revenue",
            (Indicator::NetIncome, Language::French) => "Bénéfice net",
            (Indicator::NetIncome, Language::English) => "Net income",
            (Indicator::ReturnOnEquity, _) => "ROE",
        }
    }

    /// Value plotted for a company; missing figures plot as 0
    pub fn value(self, snapshot: &FinancialSnapshot) -> f64 {
        match self {
            Indicator::CurrentPrice => snapshot.current_price,
            Indicator::MarketCap => snapshot.market_cap,
            Indicator::Revenue => snapshot.total_revenue,
            Indicator::NetIncome => snapshot.net_income_to_common,
            Indicator::ReturnOnEquity => snapshot.return_on_equity,
        }
        .unwrap_or(0.0)
    }

    fn format_value(self, value: f64, lang: Language) -> String {
        match self {
            Indicator::CurrentPrice => format!("{value:.2}"),
            Indicator::ReturnOnEquity => format_percent(value),
            _ => format_currency(Some(value), lang),
        }
    }
}

/// One bar group: an indicator and one value per company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorGroup {
    pub indicator: Indicator,
    pub values: Vec<f64>,
}

impl IndicatorGroup {
    fn max_abs(&self) -> f64 {
        self.values
            .iter()
            .map(|v| v.abs())
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Data behind the comparison chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorChart {
    /// Company names, one per series
    pub series: Vec<String>,
    pub groups: Vec<IndicatorGroup>,
    pub language: Language,
}

impl IndicatorChart {
    pub fn build(snapshots: &[&FinancialSnapshot], language: Language) -> Self {
        let series = snapshots
            .iter()
            .map(|s| s.display_name().to_string())
            .collect();
        let groups = Indicator::ALL
            .iter()
            .map(|&indicator| IndicatorGroup {
                indicator,
                values: snapshots.iter().map(|s| indicator.value(s)).collect(),
            })
            .collect();

        Self {
            series,
            groups,
            language,
        }
    }

    /// Draw the chart with bars at most `width` cells long.
    pub fn render(&self, width: usize) -> String {
        let name_width = self
            .series
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for group in &self.groups {
            out.push_str(group.indicator.label(self.language));
            out.push('\n');

            let max_abs = group.max_abs();
            for (name, &value) in self.series.iter().zip(&group.values) {
                let len = bar_length(value, max_abs, width);
                let glyph = if value < 0.0 { NEGATIVE_GLYPH } else { POSITIVE_GLYPH };
                let bar: String = std::iter::repeat_n(glyph, len).collect();
                out.push_str(&format!(
                    "  {name:<name_width$}  {bar:<width$}  {}\n",
                    group.indicator.format_value(value, self.language)
                ));
            }
        }
        out
    }
}

fn bar_length(value: f64, max_abs: f64, width: usize) -> usize {
    if width == 0 || max_abs <= 0.0 || !value.is_finite() {
        return 0;
    }
    let len = (value.abs() / max_abs * width as f64).round() as usize;
    // Non-zero values always get at least one cell.
    if value != 0.0 { len.clamp(1, width) } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, price: f64, cap: f64, roe: Option<f64>) -> FinancialSnapshot {
        FinancialSnapshot {
            short_name: Some(name.to_string()),
            current_price: Some(price),
            market_cap: Some(cap),
            return_on_equity: roe,
            ..FinancialSnapshot::new(name)
        }
    }

    #[test]
    fn test_build_orders_indicators_and_series() {
        let a = company("Apple", 190.0, 3e12, Some(1.5));
        let b = company("Tesla", 250.0, 8e11, None);
        let chart = IndicatorChart::build(&[&a, &b], Language::English);

        assert_eq!(chart.series, vec!["Apple", "Tesla"]);
        assert_eq!(chart.groups.len(), 5);
        assert_eq!(chart.groups[0].indicator, Indicator::CurrentPrice);
        assert_eq!(chart.groups[0].values, vec![190.0, 250.0]);
        // missing ROE plots as zero
        assert_eq!(chart.groups[4].values, vec![1.5, 0.0]);
    }

    #[test]
    fn test_bar_length_scales_per_group() {
        assert_eq!(bar_length(50.0, 100.0, 40), 20);
        assert_eq!(bar_length(100.0, 100.0, 40), 40);
        assert_eq!(bar_length(-100.0, 100.0, 40), 40);
        assert_eq!(bar_length(0.0, 100.0, 40), 0);
        assert_eq!(bar_length(0.001, 100.0, 40), 1);
        assert_eq!(bar_length(5.0, 0.0, 40), 0);
        assert_eq!(bar_length(f64::NAN, 10.0, 40), 0);
    }

    #[test]
    fn test_render_contains_labels_and_values() {
        let a = company("Apple", 190.0, 3e12, Some(0.25));
        let b = company("Tesla", 95.0, 8e11, Some(-0.1));
        let text = IndicatorChart::build(&[&a, &b], Language::French).render(20);

        assert!(text.contains("Prix actuel"));
        assert!(text.contains("Capitalisation"));
        assert!(text.contains("3000.00 Md"));
        assert!(text.contains("25.00%"));
        assert!(text.contains(NEGATIVE_GLYPH));
        let price_line = text.lines().nth(1).unwrap();
        assert_eq!(price_line.matches(POSITIVE_GLYPH).count(), 20);
        let tesla_line = text.lines().nth(2).unwrap();
        assert_eq!(tesla_line.matches(POSITIVE_GLYPH).count(), 10);
    }
}
