use booking_core::{Navigator, SuccessView};

/// Navigates the current tab. Success stays inside the app (history entry
/// only); external payment pages replace the document.
pub struct BrowserNavigator {
    success_path: String,
}

impl BrowserNavigator {
    pub fn new(success_path: impl Into<String>) -> Self {
        Self {
            success_path: success_path.into(),
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate_success(&self, view: &SuccessView) {
        let route = view.route(&self.success_path);
        let Some(window) = web_sys::window() else {
            return;
        };
        match window.history() {
            Ok(history) => {
                if let Err(err) =
                    history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&route))
                {
                    log::warn!("could not push {route}: {err:?}");
                }
            }
            Err(err) => log::warn!("history unavailable: {err:?}"),
        }
    }

    fn redirect(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.location().set_href(url) {
                log::error!("redirect to {url} failed: {err:?}");
            }
        }
    }
}
