//! Backend JSON to booking domain types.
//!
//! The REST backend is loose about shapes: lists may come bare or wrapped in
//! `data`, ids as `_id` or `id`, numbers as strings. Everything is read through
//! `serde_json::Value` and normalized here.

use booking_core::{BookingError, BookingResponse, Center, PaymentMethod, Vaccine};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parse the vaccine listing from a JSON string.
pub fn parse_vaccines_str(json: &str) -> Result<Vec<Vaccine>, BookingError> {
    let value: Value = serde_json::from_str(json).map_err(|err| BookingError::Parse(err.to_string()))?;
    parse_vaccines_value(&value)
}

/// Parse the vaccine listing. Entries without id or name, or with a dose
/// count outside `1..=Vaccine::MAX_DOSES`, are skipped.
pub fn parse_vaccines_value(value: &Value) -> Result<Vec<Vaccine>, BookingError> {
    let entries = list_entries(value)?;
    let vaccines: Vec<Vaccine> = entries.iter().filter_map(vaccine_from_value).collect();

    if vaccines.len() < entries.len() {
        log::warn!(
            "skipped {} malformed vaccine entries",
            entries.len() - vaccines.len()
        );
    }
    Ok(vaccines)
}

/// Parse the center listing from a JSON string.
pub fn parse_centers_str(json: &str) -> Result<Vec<Center>, BookingError> {
    let value: Value = serde_json::from_str(json).map_err(|err| BookingError::Parse(err.to_string()))?;
    parse_centers_value(&value)
}

pub fn parse_centers_value(value: &Value) -> Result<Vec<Center>, BookingError> {
    let entries = list_entries(value)?;
    let centers: Vec<Center> = entries.iter().filter_map(center_from_value).collect();

    if centers.len() < entries.len() {
        log::warn!(
            "skipped {} malformed center entries",
            entries.len() - centers.len()
        );
    }
    Ok(centers)
}

/// Parse the reply of the booking creation endpoint.
pub fn parse_booking_response_str(json: &str) -> Result<BookingResponse, BookingError> {
    let value: Value = serde_json::from_str(json).map_err(|err| BookingError::Parse(err.to_string()))?;
    parse_booking_response_value(&value)
}

pub fn parse_booking_response_value(value: &Value) -> Result<BookingResponse, BookingError> {
    let body = unwrap_data(value);

    let method = body
        .get("method")
        .or_else(|| body.get("paymentMethod"))
        .and_then(Value::as_str)
        .ok_or(BookingError::MissingData)?
        .parse::<PaymentMethod>()?;

    let booking_id = id_field(body, &["bookingId", "booking_id"])
        .or_else(|| body.get("booking").and_then(extract_id))
        .ok_or(BookingError::MissingData)?;

    let payment_id = id_field(body, &["paymentId", "payment_id"])
        .or_else(|| body.get("payment").and_then(extract_id));

    let amount = body.get("amount").and_then(as_number);

    let payment_url = ["paymentURL", "paymentUrl", "payment_url"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string);

    Ok(BookingResponse {
        method,
        booking_id,
        payment_id,
        amount,
        payment_url,
    })
}

/// Identifiers PayPal appends to the return URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaypalReturn {
    pub payment_id: String,
    pub payer_id: String,
    pub booking_id: Option<String>,
}

/// Read `paymentId`, `PayerID` and `bookingId` from a return query string.
///
/// Accepts the query with or without its leading `?`.
pub fn parse_paypal_return(query: &str) -> Result<PaypalReturn, BookingError> {
    let mut payment_id = None;
    let mut payer_id = None;
    let mut booking_id = None;

    for pair in query.trim_start_matches('?').split('&') {
        let Some((key, raw)) = pair.split_once('=') else {
            continue;
        };
        let value = percent_decode(raw);
        if value.is_empty() {
            continue;
        }
        match key {
            "paymentId" => payment_id = Some(value),
            "PayerID" => payer_id = Some(value),
            "bookingId" => booking_id = Some(value),
            _ => {}
        }
    }

    Ok(PaypalReturn {
        payment_id: payment_id.ok_or(BookingError::MissingData)?,
        payer_id: payer_id.ok_or(BookingError::MissingData)?,
        booking_id,
    })
}

fn list_entries(value: &Value) -> Result<&Vec<Value>, BookingError> {
    unwrap_data(value)
        .as_array()
        .ok_or_else(|| BookingError::Parse("expected a JSON array".to_string()))
}

fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if inner.is_array() || inner.is_object() => inner,
        _ => value,
    }
}

fn vaccine_from_value(value: &Value) -> Option<Vaccine> {
    let id = extract_id(value)?;
    let name = text_field(value, &["name", "vaccineName"])?;

    let vaccine = Vaccine {
        id,
        name,
        price: value.get("price").and_then(as_number).unwrap_or(0.0),
        dosage: count_field(value, &["dosage", "doses"])?.unwrap_or(1),
        duration: count_field(value, &["duration", "interval"])?.unwrap_or(0),
        description: text_field(value, &["description"]),
    };
    if !vaccine.has_valid_dosage() {
        log::warn!("vaccine {} has unsupported dosage {}", vaccine.id, vaccine.dosage);
        return None;
    }
    Some(vaccine)
}

fn center_from_value(value: &Value) -> Option<Center> {
    Some(Center {
        id: extract_id(value)?,
        name: text_field(value, &["name", "centerName"])?,
        address: text_field(value, &["address", "location"]),
    })
}

fn extract_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::Object(_) => id_field(value, &["_id", "id"]),
        _ => None,
    }
}

fn id_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// `Some(None)` when no key is present, `None` when the value is not a
/// non-negative number that fits in `u32` once rounded.
fn count_field(value: &Value, keys: &[&str]) -> Option<Option<u32>> {
    let Some(raw) = keys.iter().find_map(|key| value.get(*key)) else {
        return Some(None);
    };
    let number = as_number(raw)?.round();
    if !(0.0..=f64::from(u32::MAX)).contains(&number) {
        return None;
    }
    Some(Some(number as u32))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            b'+' => out.push(b' '),
            b'%' if index + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[index + 1..index + 3]).ok();
                match hex.and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        index += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        index += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
