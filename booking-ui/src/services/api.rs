//! REST client for the booking backend. HTTP only, no booking logic.

use booking_api::{parse_centers_value, parse_vaccines_value, PaypalReturn};
use booking_core::{
    BookingBackend, BookingConfig, BookingPayload, BookingResponse, Center, Vaccine,
    WalletConfirmation,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BookingConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
        }
    }

    pub async fn fetch_vaccines(&self) -> Result<Vec<Vaccine>, String> {
        let value: Value = self.get_json("/vaccines").await?;
        parse_vaccines_value(&value).map_err(|e| format!("Parse error: {}", e))
    }

    pub async fn fetch_centers(&self) -> Result<Vec<Center>, String> {
        let value: Value = self.get_json("/centers").await?;
        parse_centers_value(&value).map_err(|e| format!("Parse error: {}", e))
    }

    /// Report an approved PayPal payment after the redirect back.
    pub async fn confirm_paypal_payment(&self, paypal: &PaypalReturn) -> Result<(), String> {
        log::info!("confirming PayPal payment {}", paypal.payment_id);
        self.post_json("/payments/paypal/confirm", paypal).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        let response = ensure_ok(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = Request::post(&url)
            .json(body)
            .map_err(|e| format!("Serialization error: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        ensure_ok(response).await
    }
}

impl BookingBackend for HttpBackend {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<BookingResponse, String> {
        let response = self.post_json("/bookings", payload).await?;
        let value = response
            .json::<Value>()
            .await
            .map_err(|e| format!("Parse error: {}", e))?;
        booking_api::parse_booking_response_value(&value).map_err(|e| format!("Parse error: {}", e))
    }

    async fn confirm_wallet_payment(&self, confirmation: &WalletConfirmation) -> Result<(), String> {
        self.post_json("/payments/metamask/confirm", confirmation)
            .await?;
        Ok(())
    }
}

async fn ensure_ok(response: Response) -> Result<Response, String> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| response.status_text());
    Err(format!("HTTP {}: {}", status, extract_message(&body)))
}

/// Backend errors usually carry `{ "message": ... }`.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
