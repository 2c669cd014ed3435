//! Framework-neutral WASM <-> JavaScript bridge for the booking core.

use booking_core::{
    derive_dose_dates as core_derive_dose_dates, BookingConfig, BookingPayload, BookingResponse,
    BookingStep, BookingSummary, PaymentMethod, SuccessView,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsBookingConfig {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    treasury_address: Option<String>,
    #[serde(default)]
    native_decimals: Option<u32>,
    #[serde(default)]
    success_path: Option<String>,
}

impl From<JsBookingConfig> for BookingConfig {
    fn from(cfg: JsBookingConfig) -> Self {
        let mut base = BookingConfig::default();
        if let Some(url) = cfg.api_base_url {
            base.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(address) = cfg.treasury_address {
            base.treasury_address = address;
        }
        if let Some(decimals) = cfg.native_decimals {
            base.native_decimals = decimals;
        }
        if let Some(path) = cfg.success_path {
            base.success_path = path;
        }
        base
    }
}

/// Where a creation response leads, without performing it.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ResponsePlan {
    Navigate {
        route: String,
    },
    Redirect {
        url: String,
    },
    WalletTransfer {
        to: String,
        value_hex: String,
        booking_id: String,
        payment_id: Option<String>,
    },
}

/// Follow-up dose dates as `YYYY-MM-DD` strings.
#[wasm_bindgen]
pub fn derive_dose_dates(
    first_dose_date: &str,
    dose_count: u32,
    interval_days: u32,
) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let first = NaiveDate::parse_from_str(first_dose_date.trim(), "%Y-%m-%d")
        .map_err(|err| JsValue::from_str(&format!("Invalid first dose date: {err}")))?;

    let dates: Vec<String> = core_derive_dose_dates(first, dose_count, interval_days)
        .into_iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();

    to_value(&dates).map_err(|err| JsValue::from_str(&format!("Could not serialize dates: {err}")))
}

/// Check one wizard step (0-based). Resolves to `null` when it passes and to
/// the user-facing message otherwise.
#[wasm_bindgen]
pub fn validate_booking_step(step: usize, summary: JsValue) -> Result<Option<String>, JsValue> {
    init_panic_hook();

    let step = BookingStep::from_index(step)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown wizard step {step}")))?;
    let summary = read_summary(summary)?;

    Ok(step.validate(&summary).err().map(|err| err.to_string()))
}

/// Build the creation request from a complete summary.
#[wasm_bindgen]
pub fn build_booking_payload(summary: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let summary = read_summary(summary)?;
    let payload = BookingPayload::from_summary(&summary)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    to_json_value(&payload)
}

/// Describe the next action for a creation response.
#[wasm_bindgen]
pub fn plan_booking_response(
    response: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let raw = from_value::<serde_json::Value>(response)
        .map_err(|err| JsValue::from_str(&format!("Could not read response JSON: {err}")))?;
    let response = booking_api::parse_booking_response_value(&raw)
        .map_err(|err| JsValue::from_str(&format!("Booking error: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsBookingConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            BookingConfig::from(cfg)
        }
        None => BookingConfig::default(),
    };

    let plan = plan_response(response, &cfg).map_err(|err| JsValue::from_str(&err))?;
    to_json_value(&plan)
}

/// Payment methods in display order, as `{ value, label }`.
#[wasm_bindgen]
pub fn payment_methods() -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    struct MethodOption {
        value: &'static str,
        label: &'static str,
    }

    let options: Vec<MethodOption> = PaymentMethod::ALL
        .into_iter()
        .map(|method| MethodOption {
            value: method.as_str(),
            label: method.label(),
        })
        .collect();
    to_json_value(&options)
}

fn plan_response(response: BookingResponse, cfg: &BookingConfig) -> Result<ResponsePlan, String> {
    match response.method {
        PaymentMethod::Cash | PaymentMethod::BankTransfer => {
            let view = SuccessView {
                booking_id: response.booking_id,
                payment_id: response.payment_id,
            };
            Ok(ResponsePlan::Navigate {
                route: view.route(&cfg.success_path),
            })
        }
        PaymentMethod::Paypal => response
            .payment_url
            .map(|url| ResponsePlan::Redirect { url })
            .ok_or_else(|| "PayPal payment URL missing from response".to_string()),
        PaymentMethod::Metamask => {
            let amount = response
                .amount
                .ok_or_else(|| "Payment amount missing from response".to_string())?;
            let amount_wei = booking_core::amount_to_wei(amount, cfg.native_decimals)
                .ok_or_else(|| format!("Invalid payment amount {amount}"))?;
            Ok(ResponsePlan::WalletTransfer {
                to: cfg.treasury_address.clone(),
                value_hex: format!("{amount_wei:#x}"),
                booking_id: response.booking_id,
                payment_id: response.payment_id,
            })
        }
    }
}

fn read_summary(summary: JsValue) -> Result<BookingSummary, JsValue> {
    // Through serde_json so the `HH:MM` time format and camelCase names apply.
    let raw = from_value::<serde_json::Value>(summary)
        .map_err(|err| JsValue::from_str(&format!("Could not read summary JSON: {err}")))?;
    serde_json::from_value(raw)
        .map_err(|err| JsValue::from_str(&format!("Invalid booking summary: {err}")))
}

fn to_json_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(method: PaymentMethod) -> BookingResponse {
        BookingResponse {
            method,
            booking_id: "b1".into(),
            payment_id: Some("p1".into()),
            amount: Some(0.5),
            payment_url: None,
        }
    }

    #[test]
    fn cash_plans_success_route() {
        let plan = plan_response(response(PaymentMethod::Cash), &BookingConfig::default()).unwrap();
        assert_eq!(
            plan,
            ResponsePlan::Navigate {
                route: "/booking/success?bookingId=b1&paymentId=p1".into()
            }
        );
    }

    #[test]
    fn metamask_plans_transfer_to_treasury() {
        let cfg = BookingConfig::from(JsBookingConfig {
            api_base_url: Some("https://api.example/".into()),
            treasury_address: Some("0xfeed".into()),
            native_decimals: None,
            success_path: None,
        });
        assert_eq!(cfg.api_base_url, "https://api.example");

        let plan = plan_response(response(PaymentMethod::Metamask), &cfg).unwrap();
        assert_eq!(
            plan,
            ResponsePlan::WalletTransfer {
                to: "0xfeed".into(),
                value_hex: "0x6f05b59d3b20000".into(),
                booking_id: "b1".into(),
                payment_id: Some("p1".into()),
            }
        );
    }

    #[test]
    fn paypal_without_url_cannot_be_planned() {
        assert!(plan_response(response(PaymentMethod::Paypal), &BookingConfig::default()).is_err());
    }
}
