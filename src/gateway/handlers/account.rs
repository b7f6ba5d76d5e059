//! Account handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use chrono::Utc;

use super::super::state::AppState;
use super::super::types::{
    ApiResult, CreateAccountRequest, LoginRequest, PageQuery, created, ok, rejected,
};
use crate::auth::AuthenticatedAccount;
use crate::repository::Backend;
use crate::usecase::{
    AccountSummary, BalanceOutput, CreateAccountInput, CreateAccountOutput, LoginInput,
    LoginOutput,
};

/// POST /accounts
pub async fn create_account<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<CreateAccountOutput> {
    let Json(req) = body.map_err(rejected)?;

    let out = state
        .create_account
        .execute(CreateAccountInput {
            id: req.id,
            name: req.name,
            cpf: req.cpf,
            secret: req.secret,
            balance: req.balance,
            created_at: Some(Utc::now()),
        })
        .await?;

    created(out)
}

/// GET /accounts?limit=&offset=
pub async fn list_accounts<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<AccountSummary>> {
    let Query(page) = query.map_err(rejected)?;
    ok(state.find_accounts.execute(page.limit, page.offset).await?)
}

/// GET /accounts/{account_id}/balance
///
/// Only the holder may read an account's balance.
pub async fn get_balance<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(account_id): Path<String>,
) -> ApiResult<BalanceOutput> {
    ok(state
        .find_balance
        .execute(&account_id, Some(&caller.account_id))
        .await?)
}

/// POST /login
pub async fn login<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginOutput> {
    let Json(req) = body.map_err(rejected)?;

    ok(state
        .login
        .execute(LoginInput {
            cpf: req.cpf,
            secret: req.secret,
        })
        .await?)
}
