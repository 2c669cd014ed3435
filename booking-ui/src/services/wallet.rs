//! EIP-1193 wallet (`window.ethereum`) client.

use booking_core::{TransferRequest, WalletClient, WalletError};
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Default)]
pub struct BrowserWallet;

#[derive(Serialize)]
struct TransactionParams<'a> {
    from: &'a str,
    to: &'a str,
    value: String,
}

impl BrowserWallet {
    fn provider() -> Result<JsValue, WalletError> {
        let window = web_sys::window().ok_or(WalletError::Unavailable)?;
        let ethereum =
            Reflect::get(&window, &JsValue::from_str("ethereum")).map_err(|_| WalletError::Unavailable)?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return Err(WalletError::Unavailable);
        }
        Ok(ethereum)
    }

    async fn request(provider: &JsValue, method: &str, params: JsValue) -> Result<JsValue, WalletError> {
        let request: Function = Reflect::get(provider, &JsValue::from_str("request"))
            .ok()
            .and_then(|value| value.dyn_into().ok())
            .ok_or(WalletError::Unavailable)?;

        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(provider_error)?;
        if !params.is_undefined() {
            Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(provider_error)?;
        }

        let promise: Promise = request
            .call1(provider, &args)
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| WalletError::Other(format!("{method} did not return a promise")))?;

        JsFuture::from(promise).await.map_err(provider_error)
    }
}

impl WalletClient for BrowserWallet {
    async fn send_transfer(&self, request: &TransferRequest) -> Result<String, WalletError> {
        let provider = Self::provider()?;

        let accounts = Self::request(&provider, "eth_requestAccounts", JsValue::UNDEFINED).await?;
        let from = Array::from(&accounts)
            .get(0)
            .as_string()
            .ok_or_else(|| WalletError::Other("no account connected".to_string()))?;

        let params = TransactionParams {
            from: &from,
            to: &request.to,
            value: request.value_hex(),
        };
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let tx = params
            .serialize(&serializer)
            .map_err(|err| WalletError::Other(err.to_string()))?;

        log::info!("sending {} wei from {from} to {}", request.amount_wei, request.to);
        let hash = Self::request(&provider, "eth_sendTransaction", Array::of1(&tx).into()).await?;
        hash.as_string()
            .ok_or_else(|| WalletError::Other("wallet returned no transaction hash".to_string()))
    }
}

fn provider_error(err: JsValue) -> WalletError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|value| value.as_f64())
        .map(|code| code as i64);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    WalletError::from_provider(code, &message)
}
