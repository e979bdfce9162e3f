use actix_web::{post, web, HttpResponse, Responder};
use crate::error::CheckoutError;
use crate::models::{AppState, CheckoutRequest, CheckoutResponse, ErrorResponse};
use crate::services::checkout::CheckoutSession;
use log::{info, warn};

fn error_response(err: &CheckoutError) -> HttpResponse {
    let body = ErrorResponse { error: err.to_string() };
    match err {
        CheckoutError::InvalidRequest(_) => HttpResponse::BadRequest().json(body),
        CheckoutError::NotConfigured | CheckoutError::Provider(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[post("/create-checkout-session")]
pub async fn create_checkout_session(
    data: web::Data<AppState>,
    req: web::Json<CheckoutRequest>,
) -> impl Responder {
    let session = match CheckoutSession::from_request(&req, &data.checkout_settings) {
        Ok(s) => s,
        Err(e) => {
            info!("Rejected checkout request: {}", e);
            return error_response(&e);
        }
    };

    match data.checkout.create_session(&session).await {
        Ok(id) => HttpResponse::Ok().json(CheckoutResponse { id }),
        Err(e) => {
            warn!("Checkout session failed: {}", e);
            error_response(&e)
        }
    }
}
