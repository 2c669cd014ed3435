#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-booking-ui]";

/// Default CSS for the wizard along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --booking-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --booking-bg: #ffffff;
  --booking-surface: #f8fafc;
  --booking-border: rgba(148, 163, 184, 0.32);
  --booking-radius: 14px;
  --booking-text: #1f2933;
  --booking-muted: #52606d;
  --booking-accent: #0f766e;
  --booking-accent-bg: rgba(15, 118, 110, 0.1);
  --booking-error: #b42318;
  --booking-error-bg: rgba(180, 35, 24, 0.1);
  --booking-warning: #b54708;
  --booking-warning-bg: rgba(220, 104, 3, 0.12);
  --booking-success: #067647;
  --booking-success-bg: rgba(6, 118, 71, 0.12);
}

.booking-root {
  font-family: var(--booking-font-family);
  background: var(--booking-bg);
  color: var(--booking-text);
  border-radius: var(--booking-radius);
  box-shadow: 0 24px 48px rgba(15, 23, 42, 0.1);
  padding: 28px;
  display: flex;
  flex-direction: column;
  gap: 22px;
  max-width: 880px;
}

.booking-steps {
  display: flex;
  gap: 12px;
  list-style: none;
  margin: 0;
  padding: 0;
}

.booking-steps li {
  flex: 1;
  padding: 10px 14px;
  border-radius: 10px;
  background: var(--booking-surface);
  color: var(--booking-muted);
  font-size: 0.9rem;
}

.booking-steps li.is-active {
  background: var(--booking-accent-bg);
  color: var(--booking-accent);
  font-weight: 600;
}

.booking-steps li.is-done {
  color: var(--booking-success);
}

.vaccine-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 14px;
}

.vaccine-card {
  text-align: left;
  border: 1px solid var(--booking-border);
  border-radius: var(--booking-radius);
  background: var(--booking-bg);
  padding: 16px;
  cursor: pointer;
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.vaccine-card.is-selected {
  border-color: var(--booking-accent);
  background: var(--booking-accent-bg);
}

.vaccine-meta {
  color: var(--booking-muted);
  font-size: 0.85rem;
}

.booking-form {
  display: grid;
  grid-template-columns: repeat(3, minmax(0, 1fr));
  gap: 14px;
}

.booking-field {
  display: flex;
  flex-direction: column;
  gap: 6px;
  font-size: 0.9rem;
}

.booking-field input,
.booking-field select {
  border: 1px solid var(--booking-border);
  border-radius: 8px;
  padding: 8px 10px;
  font: inherit;
}

.dose-table {
  width: 100%;
  border-collapse: collapse;
}

.dose-table th,
.dose-table td {
  text-align: left;
  padding: 8px;
  border-bottom: 1px solid var(--booking-border);
}

.payment-options {
  display: flex;
  flex-direction: column;
  gap: 10px;
}

.payment-option {
  display: flex;
  align-items: center;
  gap: 10px;
  padding: 12px 14px;
  border: 1px solid var(--booking-border);
  border-radius: 10px;
  cursor: pointer;
}

.payment-option.is-selected {
  border-color: var(--booking-accent);
  background: var(--booking-accent-bg);
}

.booking-total {
  font-size: 1.1rem;
  font-weight: 600;
}

.booking-notice {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 10px 14px;
  border-radius: 10px;
}

.booking-notice[data-level="error"] {
  background: var(--booking-error-bg);
  color: var(--booking-error);
}

.booking-notice[data-level="warning"] {
  background: var(--booking-warning-bg);
  color: var(--booking-warning);
}

.booking-notice[data-level="success"] {
  background: var(--booking-success-bg);
  color: var(--booking-success);
}

.booking-notice button {
  background: none;
  border: none;
  color: inherit;
  cursor: pointer;
  font-size: 1.1rem;
}

.booking-actions {
  display: flex;
  justify-content: space-between;
}

.booking-actions button {
  border-radius: 8px;
  padding: 10px 18px;
  font: inherit;
  cursor: pointer;
  border: 1px solid var(--booking-border);
  background: var(--booking-bg);
}

.booking-actions button.primary {
  background: var(--booking-accent);
  border-color: var(--booking-accent);
  color: #ffffff;
}

.booking-actions button:disabled {
  opacity: 0.6;
  cursor: progress;
}

.booking-empty {
  color: var(--booking-muted);
}

@media (max-width: 720px) {
  .booking-form {
    grid-template-columns: 1fr;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-booking-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
