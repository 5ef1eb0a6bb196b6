pub mod catalog;
pub mod documents;
pub mod underwriting;

use clap::Args;
use rust_decimal::Decimal;
use underwrite_core::assumptions::AssumptionSet;
use underwrite_core::documents::DocumentOrchestrator;
use underwrite_core::offer::terms::OfferConfig;

use crate::input;

/// Configuration shared by every command, loaded once from the global flags.
pub struct Settings {
    pub assumptions: AssumptionSet,
    pub offer_config: OfferConfig,
}

impl Settings {
    pub fn load(
        assumptions: Option<&str>,
        offer_config: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let assumptions = match assumptions {
            Some(path) => input::file::read_document(path)?,
            None => AssumptionSet::default(),
        };
        let offer_config = match offer_config {
            Some(path) => input::file::read_document(path)?,
            None => OfferConfig::default(),
        };
        Ok(Settings {
            assumptions,
            offer_config,
        })
    }

    pub fn orchestrator(&self, overrides: &AssumptionOverrides) -> DocumentOrchestrator {
        DocumentOrchestrator::new(overrides.apply(&self.assumptions), self.offer_config.clone())
    }
}

/// Per-invocation overrides layered over the assumption file.
#[derive(Args, Debug, Default)]
#[command(allow_hyphen_values = true)]
pub struct AssumptionOverrides {
    /// Share of the price paid in cash (e.g. 0.25)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate (e.g. 0.065 for 6.5%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Vacancy as a fraction of gross rent
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Annual rent growth for the projection
    #[arg(long)]
    pub rent_growth: Option<Decimal>,

    /// Annual expense growth for the projection
    #[arg(long)]
    pub expense_growth: Option<Decimal>,
}

impl AssumptionOverrides {
    pub fn apply(&self, base: &AssumptionSet) -> AssumptionSet {
        let mut set = base.clone();
        if let Some(v) = self.down_payment {
            set.down_payment_pct = v;
        }
        if let Some(v) = self.interest_rate {
            set.interest_rate = v;
        }
        if let Some(v) = self.loan_term {
            set.loan_term_years = v;
        }
        if let Some(v) = self.vacancy_rate {
            set.vacancy_rate = v;
        }
        if let Some(v) = self.rent_growth {
            set.rent_growth = v;
        }
        if let Some(v) = self.expense_growth {
            set.expense_growth = v;
        }
        set
    }
}
