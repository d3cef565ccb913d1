use chrono::NaiveDate;
use serde::Serialize;

/// Fixed amortization amounts compared side by side.
pub const COMPARISON_AMORTIZATIONS: [f64; 5] = [5_000.0, 8_000.0, 10_000.0, 15_000.0, 20_000.0];

/// Simulation is abandoned after 50 years.
pub const HORIZON_MONTHS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanScenarioInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub monthly_amortization: f64,
    pub birth_year: i32,
    pub birth_month: u32,
}

impl LoanScenarioInput {
    /// Same loan and borrower, different monthly amortization.
    pub fn with_amortization(&self, monthly_amortization: f64) -> Self {
        Self {
            monthly_amortization,
            ..*self
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub months: u32,
    pub years: u32,
    pub remaining_months: u32,
    pub payoff_date: NaiveDate,
    pub total_interest: f64,
    pub total_paid: f64,
    pub age_at_payoff: i32,
    pub avg_monthly_interest: f64,
    pub avg_monthly_payment: f64,
    pub initial_monthly_interest: f64,
    pub initial_total_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayoffOutcome {
    PaidOff(PayoffSummary),
    Failed { error: String },
}

/// One row of the comparison table. `amortization` is always set, even when
/// the scenario failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayoffResult {
    pub amortization: f64,
    #[serde(flatten)]
    pub outcome: PayoffOutcome,
}

impl LoanPayoffResult {
    pub fn summary(&self) -> Option<&PayoffSummary> {
        match &self.outcome {
            PayoffOutcome::PaidOff(summary) => Some(summary),
            PayoffOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            PayoffOutcome::PaidOff(_) => None,
            PayoffOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.summary().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recomputation {
    pub comparison: Vec<LoanPayoffResult>,
    pub custom: Option<LoanPayoffResult>,
}
