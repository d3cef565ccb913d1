use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use super::error::SimulationError;
use super::types::{
    COMPARISON_AMORTIZATIONS, HORIZON_MONTHS, LoanPayoffResult, LoanScenarioInput,
    PayoffOutcome, PayoffSummary, Recomputation,
};

/// Simulates monthly payoff of a straight-amortization loan starting at
/// `start_date`.
///
/// Interest accrues on the outstanding balance and is paid on top of the
/// amortization, so only the amortization reduces the balance. The final
/// payment is capped at the remaining balance.
///
/// Never fails with `Err`: divergence past [`HORIZON_MONTHS`], a
/// non-positive amortization or a non-positive principal all come back as
/// [`PayoffOutcome::Failed`] with `amortization` still echoed.
pub fn simulate(input: &LoanScenarioInput, start_date: NaiveDate) -> LoanPayoffResult {
    let outcome = match amortize(input, start_date) {
        Ok(summary) => PayoffOutcome::PaidOff(summary),
        Err(err) => {
            debug!(
                target: "payoff.engine",
                amortization = input.monthly_amortization,
                principal = input.principal,
                %err,
                "scenario not paid off"
            );
            PayoffOutcome::Failed {
                error: err.to_string(),
            }
        }
    };

    LoanPayoffResult {
        amortization: input.monthly_amortization,
        outcome,
    }
}

/// Runs one scenario per candidate amount, in candidate order.
///
/// Candidates that are not positive finite amounts are omitted; every other
/// candidate yields exactly one result, failures included.
pub fn run_scenarios(
    base: &LoanScenarioInput,
    candidates: &[f64],
    start_date: NaiveDate,
) -> Vec<LoanPayoffResult> {
    candidates
        .iter()
        .copied()
        .filter(|&amount| is_payable(amount))
        .map(|amount| simulate(&base.with_amortization(amount), start_date))
        .collect()
}

/// The user's own amortization, or `None` when it is not a positive amount.
pub fn run_custom(base: &LoanScenarioInput, start_date: NaiveDate) -> Option<LoanPayoffResult> {
    is_payable(base.monthly_amortization).then(|| simulate(base, start_date))
}

/// Full recompute after any input change: the fixed comparison set plus the
/// custom amount. Nothing is reused between calls.
pub fn recompute(base: &LoanScenarioInput, start_date: NaiveDate) -> Recomputation {
    Recomputation {
        comparison: run_scenarios(base, &COMPARISON_AMORTIZATIONS, start_date),
        custom: run_custom(base, start_date),
    }
}

pub fn current_age(birth_year: i32, today: NaiveDate) -> i32 {
    today.year() - birth_year
}

pub fn first_month_interest(principal: f64, annual_rate_percent: f64) -> f64 {
    principal * annual_rate_percent / 100.0 / 12.0
}

fn amortize(
    input: &LoanScenarioInput,
    start_date: NaiveDate,
) -> Result<PayoffSummary, SimulationError> {
    if !is_payable(input.monthly_amortization) {
        return Err(SimulationError::NonPositiveAmortization);
    }
    if !input.principal.is_finite() || input.principal <= 0.0 {
        return Err(SimulationError::NonPositivePrincipal);
    }

    let monthly_rate = input.monthly_rate();
    let amortization = input.monthly_amortization;

    let mut balance = input.principal;
    let mut months = 0u32;
    let mut total_interest = 0.0;

    while balance > 0.0 && months < HORIZON_MONTHS {
        let interest = balance * monthly_rate;
        let principal_payment = amortization.min(balance);

        balance -= principal_payment;
        total_interest += interest;
        months += 1;
    }

    if months >= HORIZON_MONTHS {
        return Err(SimulationError::Divergence {
            horizon_years: HORIZON_MONTHS / 12,
        });
    }

    let payoff_date = start_date
        .checked_add_months(Months::new(months))
        .ok_or(SimulationError::DateOutOfRange {
            start: start_date,
            months,
        })?;

    let avg_monthly_interest = total_interest / f64::from(months);
    let initial_monthly_interest = input.principal * monthly_rate;

    Ok(PayoffSummary {
        months,
        years: months / 12,
        remaining_months: months % 12,
        payoff_date,
        total_interest,
        total_paid: input.principal + total_interest,
        age_at_payoff: age_at_payoff(payoff_date, input.birth_year, input.birth_month),
        avg_monthly_interest,
        avg_monthly_payment: amortization + avg_monthly_interest,
        initial_monthly_interest,
        initial_total_payment: amortization + initial_monthly_interest,
    })
}

// One year is taken off only while the payoff month is strictly before the
// birth month, so a payoff in the birth month counts the birthday as reached.
fn age_at_payoff(payoff_date: NaiveDate, birth_year: i32, birth_month: u32) -> i32 {
    let birthday_pending = payoff_date.month0() + 1 < birth_month;
    payoff_date.year() - birth_year - i32::from(birthday_pending)
}

fn is_payable(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}
