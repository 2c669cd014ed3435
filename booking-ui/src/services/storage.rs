//! Cart persistence in `localStorage`.

use booking_core::BookingSummary;
use web_sys::{window, Storage};

const STORAGE_KEY_CART: &str = "booking.cart";

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

pub fn save_cart(summary: &BookingSummary) -> Result<(), String> {
    let storage = local_storage().ok_or("localStorage is not available")?;
    let json = serde_json::to_string(summary).map_err(|e| format!("Serialization error: {}", e))?;
    storage
        .set_item(STORAGE_KEY_CART, &json)
        .map_err(|_| "Could not write to localStorage".to_string())
}

/// Stored cart, if any. Unreadable entries are dropped.
pub fn load_cart() -> Option<BookingSummary> {
    let storage = local_storage()?;
    let json = storage.get_item(STORAGE_KEY_CART).ok()??;
    match serde_json::from_str(&json) {
        Ok(summary) => Some(summary),
        Err(err) => {
            log::warn!("discarding stored cart: {err}");
            let _ = storage.remove_item(STORAGE_KEY_CART);
            None
        }
    }
}

pub fn clear_cart() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(STORAGE_KEY_CART);
    }
}
