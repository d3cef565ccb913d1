use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("loan takes more than {horizon_years} years to pay off")]
    Divergence { horizon_years: u32 },

    #[error("monthly amortization must be > 0")]
    NonPositiveAmortization,

    #[error("principal must be > 0")]
    NonPositivePrincipal,

    #[error("payoff date is out of range: {months} months after {start}")]
    DateOutOfRange { start: chrono::NaiveDate, months: u32 },
}
