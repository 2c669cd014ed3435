//! Booking wizard UI for the WebAssembly target.

pub mod config;

#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod services;
#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::components::{BookingWizard, BookingWizardProps};
    use crate::config::{resolve_config, ConfigOverrides};
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Window};

    /// Mount the wizard on the first element matching `selector`.
    #[wasm_bindgen]
    pub fn mount_booking_wizard(selector: &str, config: Option<JsValue>) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());

        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Document is not accessible"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let overrides: ConfigOverrides = match config {
            Some(value) if !value.is_undefined() && !value.is_null() => from_value(value)?,
            _ => ConfigOverrides::default(),
        };
        let config = resolve_config(overrides);
        log::info!("mounting booking wizard against {}", config.api_base_url);

        yew::Renderer::<BookingWizard>::with_root_and_props(target, BookingWizardProps { config })
            .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_booking_wizard;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_booking_wizard(
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "booking-ui only supports the wasm32 target",
    ))
}
