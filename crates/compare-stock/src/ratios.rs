//! Derived ratios shown next to a company's profile
//!
//! These are display estimates. The score uses its own substitutions for
//! missing figures, see [`crate::scoring`].

use serde::{Deserialize, Serialize};

use crate::snapshot::FinancialSnapshot;

/// Estimated ratios of one company
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    /// Net income over revenue
    pub net_margin: f64,
    /// Total debt over stockholders' equity
    pub debt_to_equity: f64,
}

impl Ratios {
    pub fn of(snapshot: &FinancialSnapshot) -> Self {
        Self {
            net_margin: net_margin(snapshot),
            debt_to_equity: debt_to_equity(snapshot),
        }
    }
}

/// `net income / revenue`, with missing income as 0 and a missing or zero
/// revenue replaced by 1.
pub fn net_margin(snapshot: &FinancialSnapshot) -> f64 {
    let income = snapshot.net_income_to_common.unwrap_or(0.0);
    let revenue = snapshot
        .total_revenue
        .filter(|r| *r != 0.0)
        .unwrap_or(1.0);
    income / revenue
}

/// `debt / max(equity, 1)`, with missing debt as 0 and a missing or zero
/// equity replaced by 1.
pub fn debt_to_equity(snapshot: &FinancialSnapshot) -> f64 {
    let debt = snapshot.total_debt.unwrap_or(0.0);
    let equity = snapshot
        .total_stockholders_equity
        .filter(|e| *e != 0.0)
        .unwrap_or(1.0);
    debt / equity.max(1.0)
}
