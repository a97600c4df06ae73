//! Request handlers, one per endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use netwatch_core::{
    CertificateReport, DomainRecord, DomainReputation, EmailCheck, FeedItem, HashRecord, IpRecord,
    LatencyReport, NewsDigest, ReputationReport,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Query parameters accepted across GET endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    target: Option<String>,
    domain: Option<String>,
    ip: Option<String>,
    q: Option<String>,
}

/// Body of `POST /hash-lookup`
#[derive(Debug, Deserialize)]
pub struct HashRequest {
    hash: Option<String>,
}

/// Body of `POST /email-check`
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    email: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// `GET /ip-lookup?target=`
pub async fn ip_lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<IpRecord> {
    let target = required(query.target, "Target IP required")?;
    let record = state
        .intel
        .ip
        .lookup(&target)
        .await
        .map_err(|e| ApiError::lookup("All IP lookup sources failed", e))?;
    Ok(Json(record))
}

/// `GET /reputation?ip=`
pub async fn reputation(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<ReputationReport> {
    let ip = required(query.ip, "IP address required")?;
    let report = state
        .intel
        .ip
        .reputation_only(&ip)
        .await
        .map_err(|e| ApiError::lookup("Reputation check failed", e))?;
    Ok(Json(report))
}

/// `GET /domain-whois?domain=`
pub async fn domain_whois(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<DomainRecord> {
    let domain = required(query.domain, "Domain required")?;
    let record = state
        .intel
        .whois
        .lookup(&domain)
        .await
        .map_err(|e| ApiError::lookup("WHOIS lookup failed", e))?;
    Ok(Json(record))
}

/// `GET /domain-reputation?domain=`
pub async fn domain_reputation(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<DomainReputation> {
    let domain = required(query.domain, "Domain required")?;
    let reputation = state
        .intel
        .feeds
        .reputation(&domain)
        .await
        .map_err(|e| ApiError::lookup("Unable to check reputation", e))?;
    Ok(Json(reputation))
}

/// `POST /hash-lookup`
pub async fn hash_lookup(
    State(state): State<AppState>,
    payload: Result<Json<HashRequest>, JsonRejection>,
) -> ApiResult<HashRecord> {
    let hash = required(body(payload)?.hash, "Hash is required")?;
    let record = state
        .intel
        .hashes
        .lookup(&hash)
        .await
        .map_err(|e| ApiError::lookup("Failed to analyze hash", e))?;
    Ok(Json(record))
}

/// `POST /email-check`
pub async fn email_check(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<EmailCheck> {
    let email = required(body(payload)?.email, "Email is required")?;
    let check = state
        .intel
        .email
        .check(&email)
        .await
        .map_err(|e| ApiError::lookup("Analysis failed", e))?;
    Ok(Json(check))
}

/// `GET /ssl-check?target=`
pub async fn ssl_check(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<CertificateReport> {
    let target = required(query.target, "Target domain is required")?;
    let report = state
        .intel
        .ssl
        .check(&target)
        .await
        .map_err(|e| ApiError::lookup("Failed to retrieve certificate", e))?;
    Ok(Json(report))
}

/// `GET /feeds`
pub async fn feeds(State(state): State<AppState>) -> Json<Vec<FeedItem>> {
    Json(state.intel.feeds.collect().await.items)
}

/// `GET /feeds/{feed}`: one feed on its own, without the merge limit
pub async fn feed(
    State(state): State<AppState>,
    Path(feed): Path<String>,
) -> ApiResult<Vec<FeedItem>> {
    let provider = match feed.as_str() {
        "urlhaus" => "URLHaus",
        "alienvault" => "AlienVault OTX",
        "phishtank" => "PhishTank",
        _ => return Err(ApiError::not_found("Unknown feed")),
    };
    state
        .intel
        .feeds
        .single(provider)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Unknown feed"))
}

/// `GET /latency-check?target=`
pub async fn latency_check(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<LatencyReport> {
    let target = required(query.target, "Target URL is required")?;
    let report = state
        .intel
        .latency
        .check(&target)
        .await
        .map_err(|e| ApiError::upstream("Latency check failed", e))?;
    Ok(Json(report))
}

/// `GET /news?q=`
pub async fn news(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<NewsDigest> {
    let digest = state
        .intel
        .news
        .search(query.q.as_deref())
        .await
        .map_err(|e| ApiError::lookup("Failed to fetch news", e))?;
    Ok(Json(digest))
}
