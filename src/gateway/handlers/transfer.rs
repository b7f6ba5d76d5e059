//! Transfer handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use chrono::Utc;

use super::super::state::AppState;
use super::super::types::{ApiResult, PageQuery, TransferRequest, created, ok, rejected};
use crate::auth::AuthenticatedAccount;
use crate::repository::Backend;
use crate::usecase::{MakeTransferInput, MakeTransferOutput, TransferSummary};

/// POST /transfers
///
/// The origin is always the authenticated caller.
pub async fn create_transfer<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<MakeTransferOutput> {
    let Json(req) = body.map_err(rejected)?;

    let out = state
        .make_transfer
        .execute(MakeTransferInput {
            id: req.id,
            origin_account_id: caller.account_id,
            destination_account_id: req.destination_account_id,
            amount: req.amount,
            created_at: Some(Utc::now()),
        })
        .await?;

    created(out)
}

/// GET /transfers?limit=&offset=
pub async fn list_transfers<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<TransferSummary>> {
    let Query(page) = query.map_err(rejected)?;
    ok(state
        .find_transfers
        .execute(&caller.account_id, page.limit, page.offset)
        .await?)
}
