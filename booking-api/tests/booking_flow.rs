use std::cell::RefCell;
use std::fs;

use booking_api::parse_booking_response_str;
use booking_core::{
    BookingBackend, BookingConfig, BookingOutcome, BookingPayload, BookingResponse, Dispatcher,
    Navigator, SuccessView, TransferRequest, WalletClient, WalletConfirmation, WalletError,
};
use futures::executor::block_on;

fn fixture(name: &str) -> BookingResponse {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    let json = fs::read_to_string(path).expect("could not read fixture");
    parse_booking_response_str(&json).expect("could not parse booking response")
}

struct ConfirmOnlyBackend {
    confirmations: RefCell<Vec<WalletConfirmation>>,
}

impl BookingBackend for ConfirmOnlyBackend {
    async fn create_booking(&self, _: &BookingPayload) -> Result<BookingResponse, String> {
        Err("not used".to_string())
    }

    async fn confirm_wallet_payment(&self, confirmation: &WalletConfirmation) -> Result<(), String> {
        self.confirmations.borrow_mut().push(confirmation.clone());
        Ok(())
    }
}

struct FixedHashWallet {
    requests: RefCell<Vec<TransferRequest>>,
}

impl WalletClient for FixedHashWallet {
    async fn send_transfer(&self, request: &TransferRequest) -> Result<String, WalletError> {
        self.requests.borrow_mut().push(request.clone());
        Ok("0x5f3c".to_string())
    }
}

#[derive(Default)]
struct RecordingNavigator {
    routes: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate_success(&self, view: &SuccessView) {
        self.routes.borrow_mut().push(view.route("/booking/success"));
    }

    fn redirect(&self, url: &str) {
        self.routes.borrow_mut().push(url.to_string());
    }
}

fn dispatcher() -> Dispatcher<ConfirmOnlyBackend, FixedHashWallet, RecordingNavigator> {
    Dispatcher::new(
        ConfirmOnlyBackend {
            confirmations: RefCell::new(Vec::new()),
        },
        FixedHashWallet {
            requests: RefCell::new(Vec::new()),
        },
        RecordingNavigator::default(),
        BookingConfig {
            treasury_address: "0x8ba1f109551bD432803012645Ac136ddd64DBA72".to_string(),
            ..BookingConfig::default()
        },
    )
}

#[test]
fn metamask_response_pays_and_confirms() {
    let dispatcher = dispatcher();
    let outcome = block_on(dispatcher.dispatch(fixture("booking_metamask_response.json")))
        .expect("dispatch failed");

    assert!(matches!(outcome, BookingOutcome::Completed(_)));

    let requests = dispatcher.wallet().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_wei, 12_500_000_000_000_000);
    assert_eq!(requests[0].to, "0x8ba1f109551bD432803012645Ac136ddd64DBA72");

    let confirmations = dispatcher.backend().confirmations.borrow();
    assert_eq!(confirmations[0].transaction_hash, "0x5f3c");
    assert_eq!(
        confirmations[0].payment_id.as_deref(),
        Some("66a0b1c2d3e4f5a6b7c8d9e1")
    );

    assert_eq!(
        *dispatcher.navigator().routes.borrow(),
        vec!["/booking/success?bookingId=66a0b1c2d3e4f5a6b7c8d9e0&paymentId=66a0b1c2d3e4f5a6b7c8d9e1"]
    );
}

#[test]
fn paypal_response_redirects() {
    let dispatcher = dispatcher();
    let outcome = block_on(dispatcher.dispatch(fixture("booking_paypal_response.json")))
        .expect("dispatch failed");

    let url = "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T";
    assert_eq!(outcome, BookingOutcome::Redirected { url: url.to_string() });
    assert!(dispatcher.wallet().requests.borrow().is_empty());
    assert_eq!(*dispatcher.navigator().routes.borrow(), vec![url]);
}
