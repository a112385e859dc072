use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{InputOverrides, Settings, validate_inputs};
use crate::core::{
    BreakEvenConfig, BreakEvenResult, BreakEvenTarget, BuyingMonth, ComparisonResult,
    ComparisonSummary, Inputs, RentingMonth, SimulationParameters, run_comparison,
    solve_break_even,
};
use crate::report::{ChartSeries, chart_series};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Query/JSON payload from the web form. Rates are in percent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    house_price: Option<f64>,
    down_payment: Option<f64>,
    mortgage_rate: Option<f64>,
    mortgage_percent: Option<f64>,
    amortization_years: Option<u32>,
    etf_yield: Option<f64>,
    appreciation: Option<f64>,
    maintenance: Option<f64>,
    monthly_rent: Option<f64>,
    rent_increase: Option<f64>,
    simulation_years: Option<u32>,
    currency: Option<String>,
    include_months: Option<bool>,

    target: Option<BreakEvenTarget>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

impl SimulatePayload {
    fn overrides(&self) -> InputOverrides {
        let pct = |v: Option<f64>| v.map(|v| v / 100.0);
        InputOverrides {
            house_price: self.house_price,
            down_payment: self.down_payment,
            mortgage_interest_rate_annual: pct(self.mortgage_rate),
            etf_annual_yield: pct(self.etf_yield),
            house_price_annual_yield: pct(self.appreciation),
            house_maintenance_percent_annual: pct(self.maintenance),
            monthly_rent: self.monthly_rent,
            mortgage_percent: pct(self.mortgage_percent),
            mortgage_amortization_years: self.amortization_years,
            rent_annual_increase: pct(self.rent_increase),
            simulation_years: self.simulation_years,
        }
    }
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    currency: String,
    include_months: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuyingSummary {
    monthly_interest_baseline: f64,
    monthly_amortization: f64,
    monthly_maintenance: f64,
    initial_monthly_cost: f64,
    final_house_value: f64,
    final_equity: f64,
    final_investment_portfolio: f64,
    final_total_wealth: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RentingSummary {
    initial_monthly_rent: f64,
    final_monthly_rent: f64,
    initial_investment: f64,
    final_portfolio_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    currency: String,
    inputs: Inputs,
    parameters: SimulationParameters,
    buying: BuyingSummary,
    renting: RentingSummary,
    comparison: ComparisonSummary,
    series: ChartSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    buying_months: Option<Vec<BuyingMonth>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    renting_months: Option<Vec<RentingMonth>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakEvenResponse {
    currency: String,
    inputs: Inputs,
    result: BreakEvenResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, base: Settings) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route(
            "/api/break-even",
            get(break_even_get_handler).post(break_even_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(base));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "buy-vs-rent HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(
    State(base): State<Arc<Settings>>,
    Query(payload): Query<SimulatePayload>,
) -> Response {
    compare_handler_impl(&base, payload)
}

async fn compare_post_handler(
    State(base): State<Arc<Settings>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    compare_handler_impl(&base, payload)
}

async fn break_even_get_handler(
    State(base): State<Arc<Settings>>,
    Query(payload): Query<SimulatePayload>,
) -> Response {
    break_even_handler_impl(&base, payload)
}

async fn break_even_post_handler(
    State(base): State<Arc<Settings>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    break_even_handler_impl(&base, payload)
}

fn compare_handler_impl(base: &Settings, payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(base, &payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected compare request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match run_comparison(&request.inputs) {
        Ok(result) => json_response(StatusCode::OK, build_compare_response(request, result)),
        Err(e) => {
            warn!(error = %e, "comparison failed");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

fn break_even_handler_impl(base: &Settings, payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(base, &payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected break-even request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    let config = break_even_config_from_payload(&payload);

    match solve_break_even(&request.inputs, config) {
        Ok(result) => json_response(
            StatusCode::OK,
            BreakEvenResponse {
                currency: request.currency,
                inputs: request.inputs,
                result,
            },
        ),
        Err(e) => {
            warn!(error = %e, "break-even search failed");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
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
fn api_request_from_json(base: &Settings, json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(base, &payload)
}

fn api_request_from_payload(
    base: &Settings,
    payload: &SimulatePayload,
) -> Result<ApiRequest, String> {
    let mut inputs = base.inputs.clone();
    payload.overrides().apply_to(&mut inputs);
    validate_inputs(&inputs).map_err(|e| e.to_string())?;

    Ok(ApiRequest {
        inputs,
        currency: payload
            .currency
            .clone()
            .unwrap_or_else(|| base.currency.clone()),
        include_months: payload.include_months.unwrap_or(false),
    })
}

fn break_even_config_from_payload(payload: &SimulatePayload) -> BreakEvenConfig {
    BreakEvenConfig::from_user_bounds(
        payload.target.unwrap_or(BreakEvenTarget::MonthlyRent),
        payload.search_min,
        payload.search_max,
        payload.tolerance,
        payload.max_iterations,
    )
}

fn build_compare_response(request: ApiRequest, result: ComparisonResult) -> CompareResponse {
    let series = chart_series(&result);
    let ComparisonResult {
        parameters,
        buying,
        renting,
        comparison,
    } = result;

    CompareResponse {
        currency: request.currency,
        inputs: request.inputs,
        parameters,
        buying: BuyingSummary {
            monthly_interest_baseline: buying.monthly_interest_baseline,
            monthly_amortization: buying.monthly_amortization,
            monthly_maintenance: buying.monthly_maintenance,
            initial_monthly_cost: buying.initial_monthly_cost,
            final_house_value: buying.final_house_value,
            final_equity: buying.final_equity,
            final_investment_portfolio: buying.final_investment_portfolio,
            final_total_wealth: buying.final_total_wealth,
        },
        renting: RentingSummary {
            initial_monthly_rent: renting.initial_monthly_rent,
            final_monthly_rent: renting.final_monthly_rent,
            initial_investment: renting.initial_investment,
            final_portfolio_value: renting.final_portfolio_value,
        },
        comparison,
        series,
        buying_months: request.include_months.then_some(buying.months),
        renting_months: request.include_months.then_some(renting.months),
    }
}
