//! REST API handlers for ledger operations

use crate::service::SharedLedger;
use crate::token::{amount, format_units, Address, LedgerEvent, TokenInfo};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// Shared application state for API handlers
///
/// Persistence is owned by the ledger handle: attach storage with
/// [`SharedLedger::with_storage`] and every successful operation is saved
/// before the handler returns.
#[derive(Clone)]
pub struct ApiState {
    pub ledger: SharedLedger,
}

impl ApiState {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize, Debug)]
pub struct ApiError {
    pub error: String,
}

fn bad_request(error: impl ToString) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: error.to_string(),
        }),
    )
}

fn parse_address(field: &str, value: &str) -> Result<Address, (StatusCode, Json<ApiError>)> {
    Address::parse_account(value).map_err(|e| bad_request(format!("Invalid {}: {}", field, e)))
}

fn parse_amount(value: &str) -> Result<u128, (StatusCode, Json<ApiError>)> {
    value
        .trim()
        .parse()
        .map_err(|_| bad_request("Invalid amount: must be a non-negative integer"))
}

/// Token info response
#[derive(Serialize, Debug)]
pub struct TokenInfoResponse {
    #[serde(flatten)]
    pub info: TokenInfo,
    pub holder_count: usize,
}

#[derive(Serialize, Debug)]
pub struct BalanceResponse {
    pub address: Address,
    #[serde(with = "amount::as_string")]
    pub balance: u128,
    /// Balance in whole tokens
    pub balance_display: String,
}

#[derive(Deserialize)]
pub struct AllowanceQuery {
    pub owner: String,
    pub spender: String,
}

#[derive(Serialize, Debug)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "amount::as_string")]
    pub allowance: u128,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub owner: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct TransferFromRequest {
    /// Account spending the allowance
    pub caller: String,
    pub owner: String,
    pub to: String,
    pub amount: String,
}

#[derive(Serialize, Debug)]
pub struct TransferResponse {
    pub success: bool,
    pub from: Address,
    pub to: Address,
    #[serde(with = "amount::as_string")]
    pub amount: u128,
}

#[derive(Serialize, Debug)]
pub struct ApproveResponse {
    pub success: bool,
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "amount::as_string")]
    pub amount: u128,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/token - Token metadata and supply
pub async fn get_token_info(State(state): State<ApiState>) -> Json<TokenInfoResponse> {
    Json(TokenInfoResponse {
        info: state.ledger.info().await,
        holder_count: state.ledger.holder_count().await,
    })
}

/// GET /api/balances/{address} - Balance of an account
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<BalanceResponse> {
    let address = parse_address("address", &address)?;
    let balance = state.ledger.balance_of(address).await;
    let decimals = state.ledger.info().await.decimals;

    Ok(Json(BalanceResponse {
        address,
        balance,
        balance_display: format_units(balance, decimals),
    }))
}

/// GET /api/allowance?owner=&spender= - Remaining allowance
pub async fn get_allowance(
    State(state): State<ApiState>,
    Query(query): Query<AllowanceQuery>,
) -> ApiResult<AllowanceResponse> {
    let owner = parse_address("owner", &query.owner)?;
    let spender = parse_address("spender", &query.spender)?;

    Ok(Json(AllowanceResponse {
        owner,
        spender,
        allowance: state.ledger.allowance(owner, spender).await,
    }))
}

/// POST /api/transfer - Transfer tokens
pub async fn transfer(
    State(state): State<ApiState>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferResponse> {
    let from = parse_address("from", &req.from)?;
    let to = parse_address("to", &req.to)?;
    let amount = parse_amount(&req.amount)?;

    let event = state
        .ledger
        .transfer(from, to, amount)
        .await
        .map_err(bad_request)?;

    Ok(Json(TransferResponse {
        success: true,
        from: event.from,
        to: event.to,
        amount: event.value,
    }))
}

/// POST /api/approve - Set an allowance
pub async fn approve(
    State(state): State<ApiState>,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<ApproveResponse> {
    let owner = parse_address("owner", &req.owner)?;
    let spender = parse_address("spender", &req.spender)?;
    let amount = parse_amount(&req.amount)?;

    let event = state
        .ledger
        .approve(owner, spender, amount)
        .await
        .map_err(bad_request)?;

    Ok(Json(ApproveResponse {
        success: true,
        owner: event.owner,
        spender: event.spender,
        amount: event.value,
    }))
}

/// POST /api/transferFrom - Delegated transfer
pub async fn transfer_from(
    State(state): State<ApiState>,
    Json(req): Json<TransferFromRequest>,
) -> ApiResult<TransferResponse> {
    let caller = parse_address("caller", &req.caller)?;
    let owner = parse_address("owner", &req.owner)?;
    let to = parse_address("to", &req.to)?;
    let amount = parse_amount(&req.amount)?;

    let event = state
        .ledger
        .transfer_from(caller, owner, to, amount)
        .await
        .map_err(bad_request)?;

    Ok(Json(TransferResponse {
        success: true,
        from: event.from,
        to: event.to,
        amount: event.value,
    }))
}

/// GET /api/history - Recent ledger events
pub async fn get_history(State(state): State<ApiState>) -> Json<Vec<LedgerEvent>> {
    Json(state.ledger.history().await)
}
