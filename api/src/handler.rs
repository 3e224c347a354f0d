use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::Error as CommonError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::service::{self, CartTotal, CurrencyBoard, ProductLine, SharedService};

// Create a wrapper for our common::Error type
pub struct ApiError(CommonError);

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError(err)
    }
}

// Convert our API error wrapper to an Axum response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CommonError::ParseError(msg) => (StatusCode::BAD_REQUEST, msg),
            CommonError::RateFetch(e) => {
                error!("Rate fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.user_notice())
            }
            CommonError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// Return the catalog with prices in the selected currency
pub async fn list_products(State(service): State<SharedService>) -> Json<Vec<ProductLine>> {
    let service = service.read().await;
    Json(service.products())
}

#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

// Set how many units of a product are in the cart
pub async fn update_quantity(
    State(service): State<SharedService>,
    Path(name): Path<String>,
    Json(update): Json<QuantityUpdate>,
) -> Result<Json<ProductLine>, ApiError> {
    let quantity = u32::try_from(update.quantity).map_err(|_| {
        CommonError::ParseError(format!(
            "Invalid quantity: {}. Quantities must be between 0 and {}",
            update.quantity,
            u32::MAX
        ))
    })?;

    let mut service = service.write().await;
    let line = service.set_quantity(&name, quantity)?;
    Ok(Json(line))
}

// Cart total in the selected currency
pub async fn get_cart_total(State(service): State<SharedService>) -> Json<CartTotal> {
    let service = service.read().await;
    Json(service.cart_total())
}

// Fetch live rates and list every currency that can be selected
pub async fn list_currencies(
    State(service): State<SharedService>,
) -> Result<Json<CurrencyBoard>, ApiError> {
    debug!("Refreshing exchange rates for the currency list");
    let board = service::refresh_rates(&service).await?;
    Ok(Json(board))
}

#[derive(Debug, Deserialize)]
pub struct CurrencySelection {
    pub code: String,
}

// Select the currency all prices are shown in
pub async fn select_currency(
    State(service): State<SharedService>,
    Json(selection): Json<CurrencySelection>,
) -> Result<Json<CartTotal>, ApiError> {
    let mut service = service.write().await;
    let total = service.select_currency(&selection.code)?;
    Ok(Json(total))
}
