//! Overall financial score out of 10
//!
//! Four components, each with fixed thresholds:
//!
//! | component      | measure                  | points          |
//! |----------------|--------------------------|-----------------|
//! | margin         | net income / revenue     | >10%: 3, >5%: 2, else 1 |
//! | return on equity | ROE                    | >15%: 3, >7%: 2, else 1 |
//! | leverage       | total debt / equity      | <0.5: 2, <1.0: 1, else 0 |
//! | free cash flow | FCF                      | >0: 2, else 0   |
//!
//! A component whose input the provider sent in an unusable form earns a
//! single fallback point.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language::Language;
use crate::snapshot::{keys, FinancialSnapshot};

/// Upper bound of the score
pub const MAX_SCORE: u8 = 10;

/// Points granted to a component whose input is malformed
pub const FALLBACK_POINTS: u8 = 1;

/// What a score component measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    NetMargin,
    ReturnOnEquity,
    Leverage,
    FreeCashFlow,
}

impl ComponentKind {
    /// Highest number of points the component can award
    pub fn max_points(self) -> u8 {
        match self {
            ComponentKind::NetMargin | ComponentKind::ReturnOnEquity => 3,
            ComponentKind::Leverage | ComponentKind::FreeCashFlow => 2,
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::NetMargin, Language::French) => "marge nette",
            (Self::NetMargin, Language::English) => "net margin",
            (Self::ReturnOnEquity, Language::French) => "rentabilité (ROE)",
            (Self::ReturnOnEquity, Language::English) => "return on equity",
            (Self::Leverage, Language::French) => "dette / capitaux",
            (Self::Leverage, Language::English) => "debt / equity",
            (Self::FreeCashFlow, Language::French) => "flux de trésorerie",
            (Self::FreeCashFlow, Language::English) => "free cash flow",
        }
    }
}

/// Points awarded by one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub kind: ComponentKind,
    pub points: u8,
    /// Measured value, absent when the fallback point was used
    pub value: Option<f64>,
    /// True when the input was malformed
    pub fallback: bool,
}

impl ScoreComponent {
    fn measured(kind: ComponentKind, value: f64, points: u8) -> Self {
        Self {
            kind,
            points,
            value: Some(value),
            fallback: false,
        }
    }

    fn fallback(kind: ComponentKind) -> Self {
        Self {
            kind,
            points: FALLBACK_POINTS,
            value: None,
            fallback: true,
        }
    }

    pub fn max_points(&self) -> u8 {
        self.kind.max_points()
    }
}

/// Score of one company with its breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialScore {
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

impl FinancialScore {
    pub fn component(&self, kind: ComponentKind) -> Option<&ScoreComponent> {
        self.components.iter().find(|c| c.kind == kind)
    }
}

impl fmt::Display for FinancialScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.total, MAX_SCORE)
    }
}

/// Score a company.
pub fn score(snapshot: &FinancialSnapshot) -> FinancialScore {
    let components = vec![
        margin_component(snapshot),
        roe_component(snapshot),
        leverage_component(snapshot),
        fcf_component(snapshot),
    ];
    let sum: u32 = components.iter().map(|c| u32::from(c.points)).sum();

    FinancialScore {
        total: sum.min(u32::from(MAX_SCORE)) as u8,
        components,
    }
}

fn margin_component(s: &FinancialSnapshot) -> ScoreComponent {
    let kind = ComponentKind::NetMargin;
    if s.is_malformed(keys::TOTAL_REVENUE) || s.is_malformed(keys::NET_INCOME) {
        return ScoreComponent::fallback(kind);
    }

    let revenue = s.total_revenue.unwrap_or(0.0);
    let income = s.net_income_to_common.unwrap_or(0.0);
    let margin = if revenue > 0.0 { income / revenue } else { 0.0 };

    let points = if margin > 0.10 {
        3
    } else if margin > 0.05 {
        2
    } else {
        1
    };
    ScoreComponent::measured(kind, margin, points)
}

fn roe_component(s: &FinancialSnapshot) -> ScoreComponent {
    let kind = ComponentKind::ReturnOnEquity;
    if s.is_malformed(keys::RETURN_ON_EQUITY) {
        return ScoreComponent::fallback(kind);
    }

    let roe = s.return_on_equity.unwrap_or(0.0);
    let points = if roe > 0.15 {
        3
    } else if roe > 0.07 {
        2
    } else {
        1
    };
    ScoreComponent::measured(kind, roe, points)
}

fn leverage_component(s: &FinancialSnapshot) -> ScoreComponent {
    let kind = ComponentKind::Leverage;
    if s.is_malformed(keys::TOTAL_DEBT) || s.is_malformed(keys::STOCKHOLDERS_EQUITY) {
        return ScoreComponent::fallback(kind);
    }

    let debt = s.total_debt.unwrap_or(0.0);
    // Equity is rarely reported; a missing or zero value counts as 1,
    // whether it arrived as a number or a numeric string.
    let equity = s
        .total_stockholders_equity
        .filter(|e| *e != 0.0)
        .unwrap_or(1.0);
    let leverage = debt / equity;

    let points = if leverage < 0.5 {
        2
    } else if leverage < 1.0 {
        1
    } else {
        0
    };
    ScoreComponent::measured(kind, leverage, points)
}

fn fcf_component(s: &FinancialSnapshot) -> ScoreComponent {
    let kind = ComponentKind::FreeCashFlow;
    if s.is_malformed(keys::FREE_CASHFLOW) {
        return ScoreComponent::fallback(kind);
    }

    let fcf = s.free_cashflow.unwrap_or(0.0);
    let points = if fcf > 0.0 { 2 } else { 0 };
    ScoreComponent::measured(kind, fcf, points)
}
