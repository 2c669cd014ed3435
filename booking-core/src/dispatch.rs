//! Booking submission and the payment branch that follows it.
//!
//! The dispatcher talks to the outside world through three seams: the REST
//! backend, the browser wallet and the page navigator. Each UI (or test)
//! supplies its own implementation.

#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};

use crate::payload::BookingPayload;
use crate::wizard::ValidationError;
use crate::{BookingConfig, BookingResponse, BookingSummary, PaymentMethod};

/// REST endpoints used during submission.
pub trait BookingBackend {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<BookingResponse, String>;

    async fn confirm_wallet_payment(&self, confirmation: &WalletConfirmation)
        -> Result<(), String>;
}

/// Browser wallet able to send a value transfer.
pub trait WalletClient {
    /// Resolves to the transaction hash once the user approves the prompt.
    async fn send_transfer(&self, request: &TransferRequest) -> Result<String, WalletError>;
}

/// Page navigation after a successful submission.
pub trait Navigator {
    fn navigate_success(&self, view: &SuccessView);

    /// Full-page redirect to an external payment page.
    fn redirect(&self, url: &str);
}

/// Value transfer to the treasury wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to: String,
    pub amount_wei: u128,
}

impl TransferRequest {
    /// Hex quantity as expected by `eth_sendTransaction`.
    pub fn value_hex(&self) -> String {
        format!("{:#x}", self.amount_wei)
    }
}

/// Body of the wallet payment confirmation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfirmation {
    pub booking_id: String,
    pub payment_id: Option<String>,
    pub transaction_hash: String,
}

/// Identifiers shown on the success view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuccessView {
    pub booking_id: String,
    pub payment_id: Option<String>,
}

impl SuccessView {
    /// Client route of the success view, identifiers in the query string.
    pub fn route(&self, success_path: &str) -> String {
        let booking_id = encode_query_value(&self.booking_id);
        match &self.payment_id {
            Some(payment_id) => format!(
                "{success_path}?bookingId={booking_id}&paymentId={}",
                encode_query_value(payment_id)
            ),
            None => format!("{success_path}?bookingId={booking_id}"),
        }
    }
}

/// Percent-encode everything but RFC 3986 unreserved characters.
pub fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte))
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The booking is done and the success view was shown.
    Completed(SuccessView),
    /// The browser left for an external payment page.
    Redirected { url: String },
}

/// Wallet interaction failures.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("The transaction was rejected in the wallet")]
    Rejected,
    #[error("Insufficient funds in the wallet for this payment")]
    InsufficientFunds,
    #[error("No wallet extension was found in this browser")]
    Unavailable,
    #[error("Wallet error: {0}")]
    Other(String),
}

impl WalletError {
    /// Classify an EIP-1193 provider error.
    pub fn from_provider(code: Option<i64>, message: &str) -> Self {
        if code == Some(4001) {
            return WalletError::Rejected;
        }
        if message.to_lowercase().contains("insufficient funds") {
            return WalletError::InsufficientFunds;
        }
        WalletError::Other(message.to_string())
    }
}

/// Anything that stops a submission. The summary is left untouched.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Booking service error: {0}")]
    Backend(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Drives one submission from payload to navigation.
pub struct Dispatcher<B, W, N> {
    backend: B,
    wallet: W,
    navigator: N,
    config: BookingConfig,
}

impl<B, W, N> Dispatcher<B, W, N>
where
    B: BookingBackend,
    W: WalletClient,
    N: Navigator,
{
    pub fn new(backend: B, wallet: W, navigator: N, config: BookingConfig) -> Self {
        Self {
            backend,
            wallet,
            navigator,
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Create the booking and follow the payment method the backend answers with.
    pub async fn submit(&self, summary: &BookingSummary) -> Result<BookingOutcome, SubmitError> {
        let payload = BookingPayload::from_summary(summary)?;
        log::info!(
            "creating booking for vaccine {} at center {} ({})",
            payload.vaccine_id,
            payload.center_id,
            payload.payment_method
        );

        let response = self
            .backend
            .create_booking(&payload)
            .await
            .map_err(|err| {
                log::error!("booking creation failed: {err}");
                SubmitError::Backend(err)
            })?;

        self.dispatch(response).await
    }

    /// Follow up on a creation response.
    pub async fn dispatch(&self, response: BookingResponse) -> Result<BookingOutcome, SubmitError> {
        match response.method {
            PaymentMethod::Cash | PaymentMethod::BankTransfer => {
                log::info!(
                    "booking {} settles offline ({})",
                    response.booking_id,
                    response.method
                );
                Ok(self.complete(response.booking_id, response.payment_id))
            }
            PaymentMethod::Paypal => {
                let url = response.payment_url.ok_or_else(|| {
                    SubmitError::Backend("PayPal payment URL missing from response".to_string())
                })?;
                log::info!("redirecting booking {} to PayPal", response.booking_id);
                self.navigator.redirect(&url);
                Ok(BookingOutcome::Redirected { url })
            }
            PaymentMethod::Metamask => self.pay_with_wallet(response).await,
        }
    }

    async fn pay_with_wallet(&self, response: BookingResponse) -> Result<BookingOutcome, SubmitError> {
        let amount = response.amount.ok_or_else(|| {
            SubmitError::Backend("payment amount missing from response".to_string())
        })?;
        let amount_wei = amount_to_wei(amount, self.config.native_decimals)
            .ok_or_else(|| SubmitError::Backend(format!("invalid payment amount {amount}")))?;

        let request = TransferRequest {
            to: self.config.treasury_address.clone(),
            amount_wei,
        };
        log::info!(
            "requesting wallet transfer of {} wei for booking {}",
            request.amount_wei,
            response.booking_id
        );

        let transaction_hash = self.wallet.send_transfer(&request).await.map_err(|err| {
            log::error!("wallet transfer failed: {err}");
            SubmitError::Wallet(err)
        })?;

        let confirmation = WalletConfirmation {
            booking_id: response.booking_id,
            payment_id: response.payment_id,
            transaction_hash,
        };
        self.backend
            .confirm_wallet_payment(&confirmation)
            .await
            .map_err(|err| {
                log::error!("payment confirmation failed: {err}");
                SubmitError::Backend(err)
            })?;

        Ok(self.complete(confirmation.booking_id, confirmation.payment_id))
    }

    fn complete(&self, booking_id: String, payment_id: Option<String>) -> BookingOutcome {
        let view = SuccessView {
            booking_id,
            payment_id,
        };
        self.navigator.navigate_success(&view);
        BookingOutcome::Completed(view)
    }
}

/// Convert a decimal amount of the native asset to integer base units.
///
/// Digits beyond `decimals` are truncated. `None` for negative, non-finite or
/// overflowing amounts.
pub fn amount_to_wei(amount: f64, decimals: u32) -> Option<u128> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }

    // f64 Display never uses exponent notation.
    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let scale = 10u128.checked_pow(decimals)?;
    let whole: u128 = whole.parse().ok()?;

    let mut fraction_digits: String = fraction.chars().take(decimals as usize).collect();
    while fraction_digits.len() < decimals as usize {
        fraction_digits.push('0');
    }
    let fraction: u128 = if fraction_digits.is_empty() {
        0
    } else {
        fraction_digits.parse().ok()?
    };

    whole.checked_mul(scale)?.checked_add(fraction)
}
