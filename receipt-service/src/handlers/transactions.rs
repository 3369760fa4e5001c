use crate::dtos::{
    CreateTransactionRequest, SendReceiptRequest, SendReceiptResponse, TransactionDetailResponse,
    TransactionResponse,
};
use crate::services::dispatcher::{attachment_name, RECEIPT_CONTENT_TYPE};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let request = json_body(payload)?;
    request.validate()?;

    let transaction = state.transactions.create_transaction(request.into()).await?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(transaction))))
}

#[tracing::instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionDetailResponse>, AppError> {
    let transaction = state.transactions.get_transaction(&transaction_id).await?;
    Ok(Json(transaction.into()))
}

#[tracing::instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionDetailResponse>>, AppError> {
    let transactions = state.transactions.list_transactions().await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn download_receipt(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.dispatcher.render(&transaction_id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, RECEIPT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", attachment_name(&transaction_id)),
            ),
        ],
        document,
    ))
}

#[tracing::instrument(skip(state, payload))]
pub async fn send_receipt(
    State(state): State<AppState>,
    payload: Result<Json<SendReceiptRequest>, JsonRejection>,
) -> Result<Json<SendReceiptResponse>, AppError> {
    let request = json_body(payload)?;
    request.validate()?;

    let delivery = state
        .dispatcher
        .send_receipt(&request.id, &request.recipient_address)
        .await?;

    Ok(Json(delivery.into()))
}
