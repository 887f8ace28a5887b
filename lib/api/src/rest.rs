use crate::context::AppContext;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use chrono::Local;
use credrisk_core::Error;
use credrisk_store::{BankProfile, PersonalProfile};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct ClientsResponse {
    #[serde(rename = "clientsID")]
    clients_id: Vec<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionResponse {
    probability0: f64,
    probability1: f64,
    /// Credit score on a 0-1000 gauge: round(probability0 * 1000).
    score: i64,
    threshold: f64,
    repay: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NeighborEntry {
    client_id: u64,
    score: f64,
}

#[derive(Serialize)]
struct OutcomeCounts {
    repaid: usize,
    defaulted: usize,
}

#[derive(Serialize)]
struct IncomeSummary {
    min: f64,
    mean: f64,
    max: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimilarClientsResponse {
    client_id: u64,
    neighbors: Vec<NeighborEntry>,
    /// Predicted outcomes of the neighbor set at the configured threshold.
    outcomes: OutcomeCounts,
    income: IncomeSummary,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(ctx: Arc<AppContext>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(ctx.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Route table, separated out so tests can mount it on a test service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/api/clients", web::get().to(list_clients))
        .route(
            "/api/clients/{id}/personal_information",
            web::get().to(personal_information),
        )
        .route(
            "/api/clients/{id}/bank_information",
            web::get().to(bank_information),
        )
        .route("/api/clients/{id}/prediction", web::get().to(prediction))
        .route(
            "/api/clients/{id}/similar_clients",
            web::get().to(similar_clients),
        )
        .route("/api/statistics/loans", web::get().to(stats_loans))
        .route("/api/statistics/genders", web::get().to(stats_genders))
        .route("/api/statistics/ages", web::get().to(stats_ages))
        .route(
            "/api/statistics/total_incomes",
            web::get().to(stats_total_incomes),
        )
        .route("/api/statistics/credits", web::get().to(stats_credits))
        .route("/api/statistics/annuity", web::get().to(stats_annuity))
        .route(
            "/api/statistics/length_loan",
            web::get().to(stats_length_loan),
        )
        .route(
            "/api/statistics/payment_rate",
            web::get().to(stats_payment_rate),
        )
        .route(
            "/api/statistics/credit_income_percent",
            web::get().to(stats_credit_income_percent),
        );
}

fn error_response(err: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    if err.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::InternalServerError().json(body)
    }
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json("Credit Default Risk API"))
}

async fn list_clients(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ClientsResponse {
        clients_id: ctx.dataset().ids().to_vec(),
    }))
}

async fn personal_information(
    ctx: web::Data<Arc<AppContext>>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match PersonalProfile::from_dataset(ctx.dataset(), id, Local::now().date_naive()) {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn bank_information(
    ctx: web::Data<Arc<AppContext>>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match BankProfile::from_dataset(ctx.dataset(), id, Local::now().date_naive()) {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn prediction(
    ctx: web::Data<Arc<AppContext>>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let row = match ctx.dataset().feature_row(id) {
        Ok(row) => row,
        Err(e) => return Ok(error_response(&e)),
    };
    let probability1 = match ctx.model().predict_proba(&row) {
        Ok(p) => p,
        Err(e) => return Ok(error_response(&e)),
    };

    let probability0 = 1.0 - probability1;
    let threshold = ctx.threshold();
    Ok(HttpResponse::Ok().json(PredictionResponse {
        probability0,
        probability1,
        score: (probability0 * 1000.0).round() as i64,
        threshold,
        repay: if probability1 <= threshold { "Yes" } else { "No" }.to_string(),
    }))
}

async fn similar_clients(
    ctx: web::Data<Arc<AppContext>>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let neighbors = match ctx.index().neighbors(id) {
        Ok(n) => n,
        Err(e) => return Ok(error_response(&e)),
    };

    let neighbor_ids: Vec<u64> = neighbors.iter().map(|n| n.client_id).collect();

    // One batch pass over the neighbor set; O(K) inferences total.
    let predictions = match ctx.model().predict_batch(ctx.dataset(), &neighbor_ids) {
        Ok(p) => p,
        Err(e) => return Ok(error_response(&e)),
    };
    let defaulted = predictions
        .values()
        .filter(|&&p| p > ctx.threshold())
        .count();

    let mut incomes = Vec::with_capacity(neighbor_ids.len());
    for &nid in &neighbor_ids {
        match ctx.dataset().value_or_zero(nid, "AMT_INCOME_TOTAL") {
            Ok(v) => incomes.push(v),
            Err(e) => return Ok(error_response(&e)),
        }
    }
    let income = IncomeSummary {
        min: incomes.iter().copied().fold(f64::INFINITY, f64::min),
        mean: incomes.iter().sum::<f64>() / incomes.len() as f64,
        max: incomes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    Ok(HttpResponse::Ok().json(SimilarClientsResponse {
        client_id: id,
        neighbors: neighbors
            .into_iter()
            .map(|n| NeighborEntry {
                client_id: n.client_id,
                score: n.score,
            })
            .collect(),
        outcomes: OutcomeCounts {
            repaid: neighbor_ids.len() - defaulted,
            defaulted,
        },
        income,
    }))
}

async fn stats_loans(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    let dataset = ctx.dataset();
    let mut repaid = 0usize;
    let mut defaulted = 0usize;
    for &id in dataset.ids() {
        match dataset.repaid(id) {
            Ok(true) => repaid += 1,
            Ok(false) => defaulted += 1,
            Err(e) => return Ok(error_response(&e)),
        }
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "repaid": repaid,
        "defaulted": defaulted,
    })))
}

/// Per-client map of `[value(s)..., "repaid" | "defaulted"]`, the shape the
/// dashboard's scatter plots consume.
fn per_client_stat<F>(ctx: &AppContext, f: F) -> ActixResult<HttpResponse>
where
    F: Fn(u64) -> credrisk_core::Result<Vec<serde_json::Value>>,
{
    let dataset = ctx.dataset();
    let mut out = serde_json::Map::with_capacity(dataset.len());
    for &id in dataset.ids() {
        let mut values = match f(id) {
            Ok(v) => v,
            Err(e) => return Ok(error_response(&e)),
        };
        let label = match dataset.repaid(id) {
            Ok(true) => "repaid",
            Ok(false) => "defaulted",
            Err(e) => return Ok(error_response(&e)),
        };
        values.push(serde_json::json!(label));
        out.insert(id.to_string(), serde_json::Value::Array(values));
    }
    Ok(HttpResponse::Ok().json(out))
}

async fn stats_genders(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        let gender = if ctx.dataset().value_or_zero(id, "CODE_GENDER")? == 1.0 {
            "F"
        } else {
            "M"
        };
        Ok(vec![serde_json::json!(gender)])
    })
}

async fn stats_ages(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        let days_birth = ctx.dataset().value_or_zero(id, "DAYS_BIRTH")?;
        Ok(vec![serde_json::json!((days_birth / -365.0).round())])
    })
}

async fn stats_total_incomes(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        Ok(vec![serde_json::json!(
            ctx.dataset().value_or_zero(id, "AMT_INCOME_TOTAL")?
        )])
    })
}

async fn stats_credits(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        Ok(vec![serde_json::json!(
            ctx.dataset().value_or_zero(id, "AMT_CREDIT")?
        )])
    })
}

async fn stats_annuity(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        Ok(vec![serde_json::json!(
            ctx.dataset().value_or_zero(id, "AMT_ANNUITY")?
        )])
    })
}

async fn stats_length_loan(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        Ok(vec![
            serde_json::json!(ctx.dataset().value_or_zero(id, "AMT_CREDIT")?),
            serde_json::json!(ctx.dataset().value_or_zero(id, "AMT_ANNUITY")?),
        ])
    })
}

async fn stats_payment_rate(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        let rate = 100.0 * ctx.dataset().value_or_zero(id, "PAYMENT_RATE")?;
        Ok(vec![serde_json::json!((rate * 100.0).round() / 100.0)])
    })
}

async fn stats_credit_income_percent(
    ctx: web::Data<Arc<AppContext>>,
) -> ActixResult<HttpResponse> {
    per_client_stat(&ctx, |id| {
        let pct = ctx.dataset().value_or_zero(id, "CREDIT_INCOME_PERCENT")?;
        Ok(vec![serde_json::json!((pct * 100.0).round() / 100.0)])
    })
}
