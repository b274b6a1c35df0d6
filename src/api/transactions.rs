//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{transaction::CreateTransactionRequest, Transaction, TransactionAction, TransactionDetails},
    AppState,
};

use super::CurrentUser;

/// Request to borrow a book
#[utoipa::path(
    post,
    path = "/transactions/request",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Request opened", body = Transaction),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Unavailable, own book or insufficient credits")
    )
)]
pub async fn request_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.services.lending.request(request.book_id, &user).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Transactions where the authenticated user is borrower or owner
#[utoipa::path(
    get,
    path = "/transactions/my-requests",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transactions with book and parties", body = Vec<TransactionDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    let transactions = state.services.lending.my_requests(user.id).await?;
    Ok(Json(transactions))
}

/// Approve, hand over or return a borrowed book
#[utoipa::path(
    put,
    path = "/transactions/{id}/{action}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transaction ID"),
        ("action" = String, Path, description = "approve, handover or return")
    ),
    responses(
        (status = 200, description = "Transaction updated", body = Transaction),
        (status = 400, description = "Unknown action"),
        (status = 403, description = "Not the book owner"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Borrower lost credits or invalid transition")
    )
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, action)): Path<(i32, String)>,
) -> AppResult<Json<Transaction>> {
    let action: TransactionAction = action.parse().map_err(AppError::Validation)?;

    let transaction = state.services.lending.act(id, action, &user).await?;
    Ok(Json(transaction))
}
