use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    HORIZON_MONTHS, LoanPayoffResult, LoanScenarioInput, current_age, first_month_interest,
    recompute,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "payoff",
    about = "Mortgage payoff calculator: fixed monthly amortization with interest paid on top",
    allow_negative_numbers = true
)]
pub struct Cli {
    #[arg(long, default_value_t = 3_000_000.0, help = "Loan balance today")]
    principal: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Annual interest rate in percent, e.g. 3"
    )]
    interest_rate: f64,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Monthly amortization; interest is added on top"
    )]
    monthly_amortization: f64,
    #[arg(long, default_value_t = 1990)]
    birth_year: i32,
    #[arg(long, default_value_t = 1, help = "Birth month, 1-12")]
    birth_month: u32,
    #[arg(long, help = "First month of the loan as YYYY-MM-DD, defaults to today")]
    start_date: Option<String>,
}

// Keys match the calculator page's query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatorPayload {
    loan_amount: Option<f64>,
    interest_rate: Option<f64>,
    monthly_amortization: Option<f64>,
    birth_year: Option<i32>,
    birth_month: Option<u32>,
    start_date: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    input: LoanScenarioInput,
    start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculatorResponse {
    inputs: LoanScenarioInput,
    start_date: NaiveDate,
    current_age: i32,
    first_month_interest: f64,
    horizon_months: u32,
    comparison: Vec<LoanPayoffResult>,
    custom: Option<LoanPayoffResult>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_request(cli: Cli, today: NaiveDate) -> Result<ApiRequest, String> {
    if !cli.principal.is_finite() || cli.principal <= 0.0 {
        return Err("--principal must be > 0".to_string());
    }

    if !cli.interest_rate.is_finite() || cli.interest_rate < 0.0 {
        return Err("--interest-rate must be >= 0".to_string());
    }

    if !cli.monthly_amortization.is_finite() {
        return Err("--monthly-amortization must be a finite amount".to_string());
    }

    if !(1..=12).contains(&cli.birth_month) {
        return Err("--birth-month must be between 1 and 12".to_string());
    }

    let start_date = match cli.start_date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|e| format!("--start-date must be YYYY-MM-DD: {e}"))?,
        None => today,
    };

    Ok(ApiRequest {
        input: LoanScenarioInput {
            principal: cli.principal,
            annual_rate_percent: cli.interest_rate,
            monthly_amortization: cli.monthly_amortization,
            birth_year: cli.birth_year,
            birth_month: cli.birth_month,
        },
        start_date,
    })
}

fn build_calculator_response(request: &ApiRequest) -> CalculatorResponse {
    let input = &request.input;
    let recomputed = recompute(input, request.start_date);

    CalculatorResponse {
        inputs: *input,
        start_date: request.start_date,
        current_age: current_age(input.birth_year, request.start_date),
        first_month_interest: first_month_interest(input.principal, input.annual_rate_percent),
        horizon_months: HORIZON_MONTHS,
        comparison: recomputed.comparison,
        custom: recomputed.custom,
    }
}

/// Runs one calculation from command-line flags and returns the response as
/// pretty-printed JSON.
pub fn run_cli(cli: Cli) -> Result<String, String> {
    let request = build_request(cli, Local::now().date_naive())?;
    let response = build_calculator_response(&request);
    serde_json::to_string_pretty(&response)
        .map_err(|e| format!("failed to serialize response: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(target: "payoff.api", %addr, "payoff HTTP API listening");
    info!(target: "payoff.api", "local access: http://127.0.0.1:{port}/api/calculate");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    payload: Result<Query<CalculatorPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), &rejection.body_text()),
    }
}

async fn calculate_post_handler(
    payload: Result<Json<CalculatorPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), &rejection.body_text()),
    }
}

fn rejected_payload(status: StatusCode, msg: &str) -> Response {
    info!(target: "payoff.api", %status, error = %msg, "malformed calculation payload");
    error_response(status, msg)
}

fn calculate_handler_impl(payload: CalculatorPayload) -> Response {
    let request = match api_request_from_payload(payload, Local::now().date_naive()) {
        Ok(request) => request,
        Err(msg) => {
            info!(target: "payoff.api", error = %msg, "rejected calculation request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let response = build_calculator_response(&request);
    info!(
        target: "payoff.api",
        principal = request.input.principal,
        rate = request.input.annual_rate_percent,
        amortization = request.input.monthly_amortization,
        paid_off = response.comparison.iter().filter(|r| r.is_paid_off()).count(),
        "calculation served"
    );
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, today: NaiveDate) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<CalculatorPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload, today)
}

fn api_request_from_payload(
    payload: CalculatorPayload,
    today: NaiveDate,
) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.loan_amount {
        cli.principal = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.monthly_amortization {
        cli.monthly_amortization = v;
    }
    if let Some(v) = payload.birth_year {
        cli.birth_year = v;
    }
    if let Some(v) = payload.birth_month {
        cli.birth_month = v;
    }
    if payload.start_date.is_some() {
        cli.start_date = payload.start_date;
    }

    build_request(cli, today)
}

fn default_cli_for_api() -> Cli {
    Cli {
        principal: 3_000_000.0,
        interest_rate: 3.0,
        monthly_amortization: 10_000.0,
        birth_year: 1990,
        birth_month: 1,
        start_date: None,
    }
}
