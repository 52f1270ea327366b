//! Company profiles and the comparison report

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chart::IndicatorChart;
use crate::format::{format_currency, format_optional, format_percent, format_text, NOT_AVAILABLE};
use crate::language::Language;
use crate::ratios::Ratios;
use crate::scoring::{score, FinancialScore};
use crate::snapshot::{keys, FinancialSnapshot};

/// Width of chart bars in the text rendering
const CHART_WIDTH: usize = 40;

/// Profile rows, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Sector,
    Industry,
    CurrentPrice,
    MarketCap,
    Revenue,
    NetIncome,
    Eps,
    PeRatio,
    ReturnOnEquity,
    TotalDebt,
    FreeCashFlow,
    NetMargin,
    DebtToEquity,
}

impl ProfileField {
    pub const ALL: [ProfileField; 13] = [
        ProfileField::Sector,
        ProfileField::Industry,
        ProfileField::CurrentPrice,
        ProfileField::MarketCap,
        ProfileField::Revenue,
        ProfileField::NetIncome,
        ProfileField::Eps,
        ProfileField::PeRatio,
        ProfileField::ReturnOnEquity,
        ProfileField::TotalDebt,
        ProfileField::FreeCashFlow,
        ProfileField::NetMargin,
        ProfileField::DebtToEquity,
    ];

    pub fn label(self, lang: Language) -> &'static str {
        match lang {
            Language::French => match self {
                Self::Sector => "Secteur",
                Self::Industry => "Industrie",
                Self::CurrentPrice => "Prix actuel",
                Self::MarketCap => "Capitalisation boursière",
                Self::Revenue => "Chiffre d'affaires annuel",
                Self::NetIncome => "Bénéfice net",
                Self::Eps => "Bénéfice par action (EPS)",
                Self::PeRatio => "Ratio P/E",
                Self::ReturnOnEquity => "ROE",
                Self::TotalDebt => "Dette totale",
                Self::FreeCashFlow => "Flux de trésorerie libre",
                Self::NetMargin => "Marge nette estimée",
                Self::DebtToEquity => "Dette / Capitaux propres estimé",
            },
            Language::English => match self {
                Self::Sector => "Sector",
                Self::Industry => "Industry",
                Self::CurrentPrice => "Current price",
                Self::MarketCap => "Market capitalisation",
                Self::Revenue => "Annual revenue",
                Self::NetIncome => "Net income",
                Self::Eps => "Earnings per share (EPS)",
                Self::PeRatio => "P/E ratio",
                Self::ReturnOnEquity => "ROE",
                Self::TotalDebt => "Total debt",
                Self::FreeCashFlow => "Free cash flow",
                Self::NetMargin => "Estimated net margin",
                Self::DebtToEquity => "Estimated debt / equity",
            },
        }
    }
}

/// One labelled line of a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub field: ProfileField,
    pub label: String,
    pub value: String,
}

/// Everything shown for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: String,
    pub rows: Vec<ProfileRow>,
    /// Absent when an input of the ratio was unusable
    pub ratios: Option<Ratios>,
    pub score: FinancialScore,
}

impl CompanyProfile {
    pub fn build(snapshot: &FinancialSnapshot, lang: Language) -> Self {
        let ratio_inputs = [
            keys::NET_INCOME,
            keys::TOTAL_REVENUE,
            keys::TOTAL_DEBT,
            keys::STOCKHOLDERS_EQUITY,
        ];
        let ratios = if ratio_inputs.iter().any(|k| snapshot.is_malformed(k)) {
            None
        } else {
            Some(Ratios::of(snapshot))
        };

        let currency = snapshot.currency_label();
        let amount = |v: Option<f64>| format!("{} {currency}", format_currency(v, lang));

        let rows = ProfileField::ALL
            .iter()
            .map(|&field| {
                let value = match field {
                    ProfileField::Sector => format_text(snapshot.sector.as_deref()),
                    ProfileField::Industry => format_text(snapshot.industry.as_deref()),
                    ProfileField::CurrentPrice => {
                        format!("{} {currency}", format_optional(snapshot.current_price))
                    }
                    ProfileField::MarketCap => amount(snapshot.market_cap),
                    ProfileField::Revenue => amount(snapshot.total_revenue),
                    ProfileField::NetIncome => amount(snapshot.net_income_to_common),
                    ProfileField::Eps => format_optional(snapshot.trailing_eps),
                    ProfileField::PeRatio => format_optional(snapshot.trailing_pe),
                    ProfileField::ReturnOnEquity => format_optional(snapshot.return_on_equity),
                    ProfileField::TotalDebt => amount(snapshot.total_debt),
                    ProfileField::FreeCashFlow => amount(snapshot.free_cashflow),
                    ProfileField::NetMargin => ratios
                        .map_or_else(|| NOT_AVAILABLE.to_string(), |r| format_percent(r.net_margin)),
                    ProfileField::DebtToEquity => ratios.map_or_else(
                        || NOT_AVAILABLE.to_string(),
                        |r| format!("{:.2}", r.debt_to_equity),
                    ),
                };
                ProfileRow {
                    field,
                    label: field.label(lang).to_string(),
                    value,
                }
            })
            .collect();

        Self {
            symbol: snapshot.symbol.clone(),
            name: snapshot.display_name().to_string(),
            rows,
            ratios,
            score: score(snapshot),
        }
    }

    pub fn value(&self, field: ProfileField) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.value.as_str())
    }
}

/// Outcome of asking the LLM for commentary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum AiCommentary {
    /// The model's answer
    Answer(String),
    /// No provider configured, or commentary disabled
    Unavailable(String),
    /// The provider call failed
    Failed(String),
}

impl AiCommentary {
    pub fn answer(&self) -> Option<&str> {
        match self {
            AiCommentary::Answer(text) => Some(text),
            _ => None,
        }
    }
}

/// Result of comparing two companies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub language: Language,
    pub snapshots: Vec<FinancialSnapshot>,
    pub profiles: Vec<CompanyProfile>,
    pub chart: IndicatorChart,
    pub commentary: AiCommentary,
    pub generated_at: DateTime<Utc>,
}

impl ComparisonReport {
    /// Build the data part of the report; commentary starts as unavailable.
    pub fn new(snapshots: Vec<FinancialSnapshot>, language: Language) -> Self {
        let profiles = snapshots
            .iter()
            .map(|s| CompanyProfile::build(s, language))
            .collect();
        let refs: Vec<&FinancialSnapshot> = snapshots.iter().collect();
        let chart = IndicatorChart::build(&refs, language);

        Self {
            language,
            snapshots,
            profiles,
            chart,
            commentary: AiCommentary::Unavailable(String::new()),
            generated_at: Utc::now(),
        }
    }

    pub fn with_commentary(mut self, commentary: AiCommentary) -> Self {
        self.commentary = commentary;
        self
    }

    pub fn tickers(&self) -> Vec<String> {
        self.snapshots.iter().map(|s| s.symbol.clone()).collect()
    }

    pub fn scores(&self) -> Vec<&FinancialScore> {
        self.profiles.iter().map(|p| &p.score).collect()
    }

    /// Side-by-side profile table with the score as last row
    pub fn profile_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![String::new()];
        header.extend(self.profiles.iter().map(|p| format!("{} ({})", p.name, p.symbol)));
        table.set_header(header);

        for (i, field) in ProfileField::ALL.iter().enumerate() {
            let mut row = vec![field.label(self.language).to_string()];
            row.extend(
                self.profiles
                    .iter()
                    .map(|p| p.rows.get(i).map_or_else(String::new, |r| r.value.clone())),
            );
            table.add_row(row);
        }

        let mut score_row = vec![score_label(self.language).to_string()];
        score_row.extend(self.profiles.iter().map(|p| p.score.to_string()));
        table.add_row(score_row);

        table
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.profile_table())?;
        writeln!(f)?;
        writeln!(f, "{}", chart_title(self.language))?;
        write!(f, "{}", self.chart.render(CHART_WIDTH))?;
        writeln!(f)?;

        match &self.commentary {
            AiCommentary::Answer(text) => {
                writeln!(f, "{}", commentary_title(self.language))?;
                writeln!(f, "{text}")
            }
            AiCommentary::Unavailable(reason) if reason.is_empty() => Ok(()),
            AiCommentary::Unavailable(reason) => writeln!(f, "{reason}"),
            AiCommentary::Failed(error) => writeln!(f, "LLM: {error}"),
        }
    }
}

fn score_label(lang: Language) -> &'static str {
    match lang {
        Language::French => "Note financière globale",
        Language::English => "Overall financial score",
    }
}

fn chart_title(lang: Language) -> &'static str {
    match lang {
        Language::French => "Visualisation des indicateurs clés",
        Language::English => "Key indicators",
    }
}

fn commentary_title(lang: Language) -> &'static str {
    match lang {
        Language::French => "Analyse IA détaillée",
        Language::English => "Detailed AI analysis",
    }
}
