//! Card submission and deletion handlers.
//!
//! These are the routes a driver installs when opened. They carry no
//! authentication; the host is expected to put them behind its own.

use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tender_core::{CardId, CardParams, PaymentError, ServiceToken, UserId};

use crate::error::{ApiError, ApiResult};
use crate::state::CardState;

/// Path the card routes are mounted on.
pub const CARDS_PATH: &str = "/api/cards";

/// Build the card router.
pub fn router(state: CardState) -> Router {
    Router::new()
        .route(CARDS_PATH, post(submit_card).delete(delete_card))
        .with_state(state)
}

/// `Json` whose rejections are reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of a card submission.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCardRequest {
    /// Owner of the card.
    #[serde(alias = "userID", alias = "UserID")]
    pub user_id: UserId,
    /// Client-side token from the payment service's browser library.
    #[serde(alias = "stripeToken")]
    pub service_token: ServiceToken,
    /// Name on the card.
    pub cardholder_name: String,
    /// Last four digits.
    pub last4: String,
    /// Card brand.
    pub brand: String,
    /// Expiry month.
    pub exp_month: u8,
    /// Expiry year.
    pub exp_year: u16,
    /// Billing postal code; only a hash of its prefix is kept.
    pub address_zip: String,
}

impl SubmitCardRequest {
    fn into_parts(self) -> (UserId, CardParams) {
        let params = CardParams {
            service_token: self.service_token,
            cardholder_name: self.cardholder_name,
            last4: self.last4,
            brand: self.brand,
            exp_month: self.exp_month,
            exp_year: self.exp_year,
            address_zip: self.address_zip,
        };
        (self.user_id, params)
    }
}

/// Response to a card submission.
#[derive(Debug, Serialize)]
pub struct SubmitCardResponse {
    /// ID of the stored card.
    pub id: CardId,
}

/// Body of a card deletion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCardRequest {
    /// Card to delete.
    #[serde(alias = "ID")]
    pub id: CardId,
    /// Claimed owner.
    #[serde(alias = "userID", alias = "UserID")]
    pub user_id: UserId,
}

// ============================================================================
// Handlers
// ============================================================================

/// Save a card.
///
/// POST /api/cards
pub async fn submit_card(
    State(state): State<CardState>,
    ApiJson(request): ApiJson<SubmitCardRequest>,
) -> ApiResult<Json<SubmitCardResponse>> {
    let (user_id, params) = request.into_parts();

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or(PaymentError::UserNotFound { user_id })?;

    let id = state.conn.save_card(&params, &user).await?;

    Ok(Json(SubmitCardResponse { id }))
}

/// Delete a card.
///
/// DELETE /api/cards
pub async fn delete_card(
    State(state): State<CardState>,
    ApiJson(request): ApiJson<DeleteCardRequest>,
) -> ApiResult<StatusCode> {
    state.conn.delete_card(request.id, request.user_id).await?;
    Ok(StatusCode::OK)
}
