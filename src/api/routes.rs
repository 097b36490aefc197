//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Account, Amount, EntryKind, LedgerEntry, NewAccount, OperationContext};
use crate::engine::{LedgerEngine, LedgerError, TransactionCommand};
use crate::error::AppError;
use crate::store::PgLedger;

use super::middleware::AuthenticatedOwner;

/// Currency assigned when the caller does not pick one.
const DEFAULT_CURRENCY: &str = "USD";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub balance: Decimal,
    pub currency: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id(),
            name: account.name().to_string(),
            balance: account.balance().to_decimal(),
            currency: account.currency().to_string(),
            active: account.is_active(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for EntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount.to_decimal(),
            balance_after: entry.balance_after.to_decimal(),
            description: entry.description,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction: EntryResponse,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub id: Uuid,
    pub balance: Decimal,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:account_id", get(get_account))
        .route(
            "/accounts/:account_id/transactions",
            post(create_transaction).get(list_transactions),
        )
        .route("/accounts/:account_id/balance", get(get_balance))
}

fn engine(pool: PgPool) -> LedgerEngine<PgLedger> {
    LedgerEngine::new(PgLedger::new(pool))
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Create a new account for the authenticated owner
async fn create_account(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Account name is required".to_string()));
    }

    let currency = request
        .currency
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
        .to_ascii_uppercase();
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(AppError::InvalidRequest(format!(
            "Currency must be a 3-letter ISO code (got {currency:?})"
        )));
    }

    let opening_balance = match request.initial_balance {
        None => None,
        Some(value) if value.is_zero() => None,
        Some(value) => Some(
            Amount::from_decimal(value)
                .map_err(|e| LedgerError::InvalidAmount(e.to_string()))?,
        ),
    };

    let account = engine(pool)
        .open_account(
            NewAccount {
                owner_id: owner.owner_id,
                name: name.to_string(),
                currency,
            },
            opening_balance,
            &context,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

// =========================================================================
// GET /accounts
// =========================================================================

/// List the authenticated owner's accounts, newest first
async fn list_accounts(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = engine(pool).accounts(owner.owner_id).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

// =========================================================================
// GET /accounts/:account_id
// =========================================================================

/// Get a single account
async fn get_account(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = engine(pool).account(account_id, owner.owner_id).await?;
    Ok(Json(account.into()))
}

// =========================================================================
// POST /accounts/:account_id/transactions
// =========================================================================

/// Apply a credit or debit to an account
async fn create_transaction(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Extension(context): Extension<OperationContext>,
    Path(account_id): Path<Uuid>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let amount = Amount::from_decimal(request.amount)
        .map_err(|e| LedgerError::InvalidAmount(e.to_string()))?;

    let command = TransactionCommand::new(
        account_id,
        owner.owner_id,
        request.kind,
        amount.minor_units(),
    )
    .with_description(request.description.unwrap_or_default());

    let receipt = engine(pool).apply(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            balance: receipt.account.balance().to_decimal(),
            transaction: receipt.entry.into(),
        }),
    ))
}

// =========================================================================
// GET /accounts/:account_id/transactions
// =========================================================================

/// List an account's ledger entries, newest first
async fn list_transactions(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<EntryResponse>>, AppError> {
    let entries = engine(pool)
        .entries(account_id, owner.owner_id, query.limit)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

// =========================================================================
// GET /accounts/:account_id/balance
// =========================================================================

/// Get the current balance of an account
async fn get_balance(
    State(pool): State<PgPool>,
    Extension(owner): Extension<AuthenticatedOwner>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = engine(pool).balance(account_id, owner.owner_id).await?;
    Ok(Json(BalanceResponse {
        id: balance.account_id,
        balance: balance.balance.to_decimal(),
        currency: balance.currency,
    }))
}
