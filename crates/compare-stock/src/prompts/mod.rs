//! LLM prompt templates
//!
//! Templates are Jinja sources rendered with MiniJinja. Each name exists in
//! every [`Language`]; the library picks the variant for its language.

mod templates;

use minijinja::{Environment, Value};
use serde::Serialize;

use crate::error::{Result, StockError};
use crate::format::{format_currency, format_optional, format_text};
use crate::language::Language;
use crate::snapshot::FinancialSnapshot;

/// Comparison of two companies
pub const COMPARISON: &str = "comparison";
/// Follow-up question on the previous answer
pub const FOLLOW_UP: &str = "follow_up";

const SOURCES: &[(&str, Language, &str)] = &[
    (COMPARISON, Language::French, templates::COMPARISON_FR),
    (COMPARISON, Language::English, templates::COMPARISON_EN),
    (FOLLOW_UP, Language::French, templates::FOLLOW_UP_FR),
    (FOLLOW_UP, Language::English, templates::FOLLOW_UP_EN),
];

/// Company figures as they appear in a prompt
#[derive(Debug, Clone, Serialize)]
pub struct CompanyPromptVars {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub currency: String,
    pub price: String,
    pub market_cap: String,
    pub revenue: String,
    pub net_income: String,
    pub eps: String,
    pub pe: String,
    pub roe: String,
    pub total_debt: String,
    pub free_cashflow: String,
}

impl CompanyPromptVars {
    pub fn new(snapshot: &FinancialSnapshot, lang: Language) -> Self {
        Self {
            name: snapshot.display_name().to_string(),
            sector: format_text(snapshot.sector.as_deref()),
            industry: format_text(snapshot.industry.as_deref()),
            currency: snapshot.currency_label().to_string(),
            price: format_optional(snapshot.current_price),
            market_cap: format_currency(snapshot.market_cap, lang),
            revenue: format_currency(snapshot.total_revenue, lang),
            net_income: format_currency(snapshot.net_income_to_common, lang),
            eps: format_optional(snapshot.trailing_eps),
            pe: format_optional(snapshot.trailing_pe),
            roe: format_optional(snapshot.return_on_equity),
            total_debt: format_currency(snapshot.total_debt, lang),
            free_cashflow: format_currency(snapshot.free_cashflow, lang),
        }
    }
}

#[derive(Serialize)]
struct ComparisonVars {
    companies: Vec<CompanyPromptVars>,
}

#[derive(Serialize)]
struct FollowUpVars<'a> {
    previous_answer: &'a str,
    question: &'a str,
}

/// Template set bound to one language
pub struct PromptLibrary {
    env: Environment<'static>,
    language: Language,
}

impl PromptLibrary {
    /// Load and parse every template
    pub fn new(language: Language) -> Result<Self> {
        let mut env = Environment::new();
        for &(name, lang, source) in SOURCES {
            if lang == language {
                env.add_template(name, source)?;
            }
        }
        Ok(Self { env, language })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Render a template by name
    pub fn render<S: Serialize>(&self, name: &str, vars: &S) -> Result<String> {
        let template = self.env.get_template(name).map_err(|_| {
            StockError::Prompt(format!(
                "no template named {name} for {}",
                self.language.name()
            ))
        })?;
        Ok(template.render(Value::from_serialize(vars))?)
    }

    /// Prompt asking which of the companies is the better investment
    pub fn comparison(&self, snapshots: &[&FinancialSnapshot]) -> Result<String> {
        let vars = ComparisonVars {
            companies: snapshots
                .iter()
                .map(|s| CompanyPromptVars::new(s, self.language))
                .collect(),
        };
        self.render(COMPARISON, &vars)
    }

    /// Prompt carrying the previous answer and a new question
    pub fn follow_up(&self, previous_answer: &str, question: &str) -> Result<String> {
        self.render(
            FOLLOW_UP,
            &FollowUpVars {
                previous_answer,
                question,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> FinancialSnapshot {
        FinancialSnapshot {
            short_name: Some("Apple Inc.".to_string()),
            sector: Some("Technology".to_string()),
            current_price: Some(189.5),
            market_cap: Some(2.95e12),
            total_revenue: Some(383_290_000_000.0),
            return_on_equity: Some(1.56),
            ..FinancialSnapshot::new("AAPL")
        }
    }

    #[test]
    fn test_every_template_exists_in_every_language() {
        for lang in [Language::French, Language::English] {
            let library = PromptLibrary::new(lang).unwrap();
            for name in [COMPARISON, FOLLOW_UP] {
                assert!(library.env.get_template(name).is_ok(), "{name} {lang}");
            }
        }
    }

    #[test]
    fn test_comparison_prompt_french() {
        let library = PromptLibrary::new(Language::French).unwrap();
        let tesla = FinancialSnapshot::new("TSLA");
        let prompt = library.comparison(&[&apple(), &tesla]).unwrap();

        assert!(prompt.starts_with("Tu es un expert financier."));
        assert!(prompt.contains("en utilisant des notes sur 10 que tu imagines."));
        assert!(prompt.contains("Entreprise 1 : Apple Inc. :"));
        assert!(prompt.contains("- Prix actuel : 189.5 USD"));
        assert!(prompt.contains("- Capitalisation boursière : 2950.00 Md USD"));
        assert!(prompt.contains("- Chiffre d'affaires annuel : 383.29 Md USD"));
        assert!(prompt.contains("- ROE : 1.56"));
        assert!(prompt.contains("Entreprise 2 : TSLA :"));
        assert!(prompt.contains("- Secteur : N/A"));
        assert!(prompt.trim_end().ends_with("professionnelle."));
    }

    #[test]
    fn test_comparison_prompt_english() {
        let library = PromptLibrary::new(Language::English).unwrap();
        let prompt = library.comparison(&[&apple()]).unwrap();
        assert!(prompt.contains("scores out of 10 that you estimate yourself."));
        assert!(prompt.contains("Company 1: Apple Inc.:"));
        assert!(prompt.contains("- Market capitalisation: 2950.00 B USD"));
    }

    #[test]
    fn test_follow_up_prompt() {
        let library = PromptLibrary::new(Language::French).unwrap();
        let prompt = library
            .follow_up("Apple semble plus solide.", "Et la dette ?")
            .unwrap();
        assert!(prompt.contains("Apple semble plus solide."));
        assert!(prompt.contains("Question : Et la dette ?"));

        // an empty previous answer still renders
        let prompt = library.follow_up("", "Pourquoi ?").unwrap();
        assert!(prompt.contains("Question : Pourquoi ?"));
    }

    #[test]
    fn test_unknown_template() {
        let library = PromptLibrary::new(Language::English).unwrap();
        assert!(matches!(
            library.render("haiku", &()),
            Err(StockError::Prompt(_))
        ));
    }
}
