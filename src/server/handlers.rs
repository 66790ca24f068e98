use crate::db::GroupTotal;
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::model::{Amount, Expense, GroupBy, NewExpense, User};
use crate::server::AppState;
use crate::summary::{self, SummaryRow};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// The acknowledgement returned after an insert.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// The current month's aggregates, computed by the store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_chang: Amount,
    pub total_jie: Amount,
    pub categories: Vec<CategoryTotal>,
    pub payment_methods: Vec<PaymentMethodTotal>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodTotal {
    pub payment_method: String,
    pub total: Amount,
}

impl From<GroupTotal> for CategoryTotal {
    fn from(g: GroupTotal) -> Self {
        Self {
            category: g.value,
            total: g.total,
        }
    }
}

impl From<GroupTotal> for PaymentMethodTotal {
    fn from(g: GroupTotal) -> Self {
        Self {
            payment_method: g.value,
            total: g.total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TableParams {
    #[serde(default)]
    group: GroupBy,
}

pub(super) async fn list_expenses(State(state): State<AppState>) -> Result<Json<Vec<Expense>>> {
    let window = state.clock.month();
    let expenses = state
        .db
        .list_all(&window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    Ok(Json(expenses))
}

pub(super) async fn list_user_expenses(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<Expense>>> {
    let user = User::from_str(&user)?;
    let window = state.clock.month();
    let expenses = state
        .db
        .list_by_user(user.label(), &window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    Ok(Json(expenses))
}

pub(super) async fn create_expense(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewExpense>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(expense) = payload.map_err(|e| Error::msg(ErrorType::InvalidInput, e.body_text()))?;
    let id = state
        .db
        .insert(&expense)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    debug!("Created expense {id} for '{}'", expense.user);
    Ok(Json(SuccessResponse { success: true }))
}

pub(super) async fn summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>> {
    let window = state.clock.month();
    let db = &state.db;
    let store = ErrorType::StoreUnavailable;

    let total_chang = db
        .sum_by_user(User::Chang.label(), &window)
        .await
        .pub_result(store)?;
    let total_jie = db
        .sum_by_user(User::Jie.label(), &window)
        .await
        .pub_result(store)?;
    let categories = db
        .sum_grouped_by(GroupBy::Category, &window)
        .await
        .pub_result(store)?;
    let payment_methods = db
        .sum_grouped_by(GroupBy::PaymentMethod, &window)
        .await
        .pub_result(store)?;

    Ok(Json(SummaryResponse {
        total_chang,
        total_jie,
        categories: categories.into_iter().map(Into::into).collect(),
        payment_methods: payment_methods.into_iter().map(Into::into).collect(),
    }))
}

pub(super) async fn summary_table(
    State(state): State<AppState>,
    params: std::result::Result<Query<TableParams>, QueryRejection>,
) -> Result<Json<Vec<SummaryRow>>> {
    let Query(params) = params.map_err(|e| Error::msg(ErrorType::InvalidInput, e.body_text()))?;
    let window = state.clock.month();
    let chang = state
        .db
        .list_by_user(User::Chang.label(), &window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    let jie = state
        .db
        .list_by_user(User::Jie.label(), &window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    Ok(Json(summary::summarize(&chang, &jie, params.group)?))
}
