mod engine;
mod error;
mod types;

pub use engine::{current_age, first_month_interest, recompute, run_custom, run_scenarios, simulate};
pub use error::SimulationError;
pub use types::{
    COMPARISON_AMORTIZATIONS, HORIZON_MONTHS, LoanPayoffResult, LoanScenarioInput, PayoffOutcome,
    PayoffSummary, Recomputation,
};
