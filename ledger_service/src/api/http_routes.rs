use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{Id, Money};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::entities::{TransferStatus, Wallet, WalletEvent, WalletProjection};
use crate::use_cases::{
    CompleteTransferUseCase, CreateWalletUseCase, CreditTransferUseCase, DebitTransferUseCase, GetWalletUseCase,
    RevertTransferUseCase,
};

use super::error::ApiErrorResponse;
use super::response::ApiResponse;

#[derive(Clone)]
pub struct AppState {
    pub create_wallet: Arc<CreateWalletUseCase>,
    pub get_wallet: Arc<GetWalletUseCase>,
    pub debit_transfer: Arc<DebitTransferUseCase>,
    pub credit_transfer: Arc<CreditTransferUseCase>,
    pub complete_transfer: Arc<CompleteTransferUseCase>,
    pub revert_transfer: Arc<RevertTransferUseCase>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/wallets/{wallet_id}", post(create_wallet).get(get_wallet))
        .route("/v1/wallets/{wallet_id}/transfers/debit", post(debit_transfer))
        .route("/v1/wallets/{wallet_id}/transfers/credit", post(credit_transfer))
        .route(
            "/v1/wallets/{wallet_id}/transfers/{transfer_id}/complete",
            post(complete_transfer),
        )
        .route(
            "/v1/wallets/{wallet_id}/transfers/{transfer_id}/revert",
            post(revert_transfer),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    pub reference_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub id: String,
    pub reference_id: String,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id().to_string(),
            reference_id: w.reference_id().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletBalanceResponse {
    pub id: String,
    pub reference_id: String,
    pub balance: Money,
    pub pending_debit: Money,
    pub pending_credit: Money,
}

impl WalletBalanceResponse {
    fn new(wallet: Wallet, projection: WalletProjection) -> Self {
        Self {
            id: wallet.id().to_string(),
            reference_id: wallet.reference_id().to_string(),
            balance: projection.balance,
            pending_debit: projection.pending_debit,
            pending_credit: projection.pending_credit,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub reference_id: String,
    pub transfer_id: Id,
    pub amount: Money,
    pub status: TransferStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferSettlementRequest {
    pub reference_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletEventResponse {
    pub id: String,
    pub wallet_id: String,
    pub transfer_id: String,
    pub reference_id: String,
    pub status: TransferStatus,
    pub amount: Money,
}

impl From<WalletEvent> for WalletEventResponse {
    fn from(e: WalletEvent) -> Self {
        Self {
            id: e.id.to_string(),
            wallet_id: e.wallet_id.to_string(),
            transfer_id: e.transfer_id.to_string(),
            reference_id: e.reference_id,
            status: e.status,
            amount: e.amount,
        }
    }
}

#[utoipa::path(post, path = "/v1/wallets/{wallet_id}", request_body = CreateWalletRequest,
    responses((status = 201, body = ApiResponse<WalletResponse>), (status = 409, description = "reference_id already in use")))]
pub async fn create_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<Id>,
    Json(payload): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WalletResponse>>), ApiErrorResponse> {
    let wallet = state.create_wallet.execute(wallet_id, payload.reference_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(wallet.into()))))
}

#[utoipa::path(get, path = "/v1/wallets/{wallet_id}",
    responses((status = 200, body = ApiResponse<WalletBalanceResponse>), (status = 404, description = "wallet not found")))]
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<Id>,
) -> Result<Json<ApiResponse<WalletBalanceResponse>>, ApiErrorResponse> {
    let (wallet, projection) = state.get_wallet.execute(wallet_id).await?;
    Ok(Json(ApiResponse::new(WalletBalanceResponse::new(wallet, projection))))
}

#[utoipa::path(post, path = "/v1/wallets/{wallet_id}/transfers/debit", request_body = TransferRequest,
    responses((status = 200, body = ApiResponse<WalletEventResponse>)))]
pub async fn debit_transfer(
    State(state): State<AppState>,
    Path(wallet_id): Path<Id>,
    Json(payload): Json<TransferRequest>,
) -> Result<Json<ApiResponse<WalletEventResponse>>, ApiErrorResponse> {
    let event = state
        .debit_transfer
        .execute(
            wallet_id,
            payload.transfer_id,
            payload.reference_id,
            payload.amount,
            payload.status,
        )
        .await?;
    Ok(Json(ApiResponse::new(event.into())))
}

#[utoipa::path(post, path = "/v1/wallets/{wallet_id}/transfers/credit", request_body = TransferRequest,
    responses((status = 200, body = ApiResponse<WalletEventResponse>)))]
pub async fn credit_transfer(
    State(state): State<AppState>,
    Path(wallet_id): Path<Id>,
    Json(payload): Json<TransferRequest>,
) -> Result<Json<ApiResponse<WalletEventResponse>>, ApiErrorResponse> {
    let event = state
        .credit_transfer
        .execute(
            wallet_id,
            payload.transfer_id,
            payload.reference_id,
            payload.amount,
            payload.status,
        )
        .await?;
    Ok(Json(ApiResponse::new(event.into())))
}

#[utoipa::path(post, path = "/v1/wallets/{wallet_id}/transfers/{transfer_id}/complete", request_body = TransferSettlementRequest,
    responses((status = 200, body = ApiResponse<WalletEventResponse>)))]
pub async fn complete_transfer(
    State(state): State<AppState>,
    Path((wallet_id, transfer_id)): Path<(Id, Id)>,
    Json(payload): Json<TransferSettlementRequest>,
) -> Result<Json<ApiResponse<WalletEventResponse>>, ApiErrorResponse> {
    let event = state
        .complete_transfer
        .execute(wallet_id, transfer_id, payload.reference_id)
        .await?;
    Ok(Json(ApiResponse::new(event.into())))
}

#[utoipa::path(post, path = "/v1/wallets/{wallet_id}/transfers/{transfer_id}/revert", request_body = TransferSettlementRequest,
    responses((status = 200, body = ApiResponse<WalletEventResponse>)))]
pub async fn revert_transfer(
    State(state): State<AppState>,
    Path((wallet_id, transfer_id)): Path<(Id, Id)>,
    Json(payload): Json<TransferSettlementRequest>,
) -> Result<Json<ApiResponse<WalletEventResponse>>, ApiErrorResponse> {
    let event = state
        .revert_transfer
        .execute(wallet_id, transfer_id, payload.reference_id)
        .await?;
    Ok(Json(ApiResponse::new(event.into())))
}
