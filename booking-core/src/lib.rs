//! Core logic for the vaccination booking wizard: domain types, dose schedule
//! derivation, step validation and submission dispatch.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub mod dispatch;
pub mod payload;
pub mod schedule;
pub mod wizard;

pub use dispatch::{
    amount_to_wei, encode_query_value, BookingBackend, BookingOutcome, Dispatcher, Navigator,
    SubmitError, SuccessView, TransferRequest, WalletClient, WalletConfirmation, WalletError,
};
pub use payload::{BookingPayload, DosePayload};
pub use schedule::{derive_dose_dates, derive_dose_schedule, next_weekday};
pub use wizard::{BookingStep, ValidationError, Wizard};

/// Settings shared by the wizard, the dispatcher and the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfig {
    /// Base URL of the REST backend, without trailing slash.
    pub api_base_url: String,
    /// Destination of every wallet payment.
    pub treasury_address: String,
    /// Decimals of the chain's native asset (18 for ether).
    pub native_decimals: u32,
    /// Client-side route of the success view.
    pub success_path: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            treasury_address: "0x0000000000000000000000000000000000000000".to_string(),
            native_decimals: 18,
            success_path: "/booking/success".to_string(),
        }
    }
}

/// A vaccine offered for booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub id: String,
    pub name: String,
    /// Price of a single dose.
    pub price: f64,
    /// Number of doses in the full course.
    pub dosage: u32,
    /// Days between two consecutive doses.
    pub duration: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl Vaccine {
    /// Largest course length accepted from the backend.
    pub const MAX_DOSES: u32 = 10;

    /// At least one dose and no more than [`Vaccine::MAX_DOSES`].
    pub fn has_valid_dosage(&self) -> bool {
        (1..=Self::MAX_DOSES).contains(&self.dosage)
    }

    /// Follow-up doses expected after the first one.
    pub fn follow_up_count(&self) -> usize {
        self.dosage.saturating_sub(1) as usize
    }

    pub fn is_multi_dose(&self) -> bool {
        self.dosage > 1
    }

    /// Price of the whole course.
    pub fn course_price(&self) -> f64 {
        self.price * f64::from(self.dosage)
    }
}

/// A vaccination center.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Center {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Payment methods accepted by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Metamask,
    Paypal,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Metamask,
        PaymentMethod::Paypal,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cash,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Metamask => "METAMASK",
            PaymentMethod::Paypal => "PAYPAL",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cash => "CASH",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Metamask => "MetaMask wallet",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Cash => "Cash at the center",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = BookingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| BookingError::Parse(format!("unknown payment method `{value}`")))
    }
}

/// Appointment for one dose after the first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DoseSchedule {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm")]
    pub time: Option<NaiveTime>,
    pub center_id: Option<String>,
}

impl DoseSchedule {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

/// Client-held aggregate of the wizard selections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub vaccine: Option<Vaccine>,
    pub first_dose_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm")]
    pub time: Option<NaiveTime>,
    pub center: Option<Center>,
    pub payment: Option<PaymentMethod>,
    #[serde(default)]
    pub dose_schedules: Vec<DoseSchedule>,
}

impl BookingSummary {
    /// Attach a vaccine and re-derive the follow-up doses.
    pub fn select_vaccine(&mut self, vaccine: Vaccine) {
        self.vaccine = Some(vaccine);
        self.refresh_dose_schedules();
    }

    /// Change the first dose date and re-derive the follow-up doses.
    pub fn set_first_dose_date(&mut self, date: Option<NaiveDate>) {
        self.first_dose_date = date;
        self.refresh_dose_schedules();
    }

    /// Set the appointment time. Follow-up doses that are empty or still on
    /// the previous time follow it; user overrides are kept.
    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        let previous = std::mem::replace(&mut self.time, time);
        for dose in self
            .dose_schedules
            .iter_mut()
            .filter(|dose| dose.time.is_none() || dose.time == previous)
        {
            dose.time = time;
        }
    }

    /// Set the center. Follow-up doses that are empty or still on the
    /// previous center follow it.
    pub fn set_center(&mut self, center: Option<Center>) {
        let center_id = center.as_ref().map(|center| center.id.clone());
        let previous = self.center.as_ref().map(|center| center.id.clone());
        self.center = center;
        for dose in self
            .dose_schedules
            .iter_mut()
            .filter(|dose| dose.center_id.is_none() || dose.center_id == previous)
        {
            dose.center_id = center_id.clone();
        }
    }

    pub fn refresh_dose_schedules(&mut self) {
        self.dose_schedules = schedule::derive_dose_schedule(self);
    }

    /// Replace one follow-up dose with a user-chosen value.
    pub fn override_dose(&mut self, index: usize, dose: DoseSchedule) -> Result<(), BookingError> {
        let slot = self.dose_schedules.get_mut(index).ok_or_else(|| {
            BookingError::Other(format!("dose schedule {index} does not exist"))
        })?;
        *slot = dose;
        Ok(())
    }
}

/// Reply of the booking creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub method: PaymentMethod,
    pub booking_id: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, rename = "paymentURL", alias = "paymentUrl")]
    pub payment_url: Option<String>,
}

/// Errors raised while reading or transforming booking data.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("Input is missing required booking data")]
    MissingData,
    #[error("Could not read data: {0}")]
    Parse(String),
    #[error("{0}")]
    Other(String),
}

/// `HH:MM` serialization for optional times, matching the backend slots.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_some(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse(value).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Accepts `HH:MM` and `HH:MM:SS`.
    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    /// Same format for non-optional fields.
    pub mod required {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&time.format(super::FORMAT).to_string())
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            super::parse(raw.trim()).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vaccine(dosage: u32) -> Vaccine {
        Vaccine {
            id: "vac-1".into(),
            name: "Hepatitis B".into(),
            price: 120.0,
            dosage,
            duration: 30,
            description: None,
        }
    }

    #[test]
    fn payment_method_parses_case_insensitively() {
        assert_eq!("cash".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert_eq!(
            "BANK_TRANSFER".parse::<PaymentMethod>(),
            Ok(PaymentMethod::BankTransfer)
        );
        assert!("BITCOIN".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn payment_method_serializes_in_screaming_case() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"BANK_TRANSFER\"");
    }

    #[test]
    fn selecting_vaccine_derives_follow_up_doses() {
        let mut summary = BookingSummary::default();
        summary.set_first_dose_date(NaiveDate::from_ymd_opt(2024, 3, 4));
        summary.select_vaccine(vaccine(3));
        assert_eq!(summary.dose_schedules.len(), 2);

        summary.set_time(NaiveTime::from_hms_opt(9, 30, 0));
        assert!(summary.dose_schedules.iter().all(DoseSchedule::is_complete));
    }

    #[test]
    fn changing_time_moves_doses_that_were_not_overridden() {
        let mut summary = BookingSummary::default();
        summary.set_first_dose_date(NaiveDate::from_ymd_opt(2024, 3, 4));
        summary.select_vaccine(vaccine(3));
        summary.set_time(NaiveTime::from_hms_opt(9, 0, 0));

        let custom = NaiveTime::from_hms_opt(15, 0, 0);
        let mut overridden = summary.dose_schedules[1].clone();
        overridden.time = custom;
        summary.override_dose(1, overridden).unwrap();

        summary.set_time(NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(summary.dose_schedules[0].time, NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(summary.dose_schedules[1].time, custom);
    }

    #[test]
    fn changing_center_moves_doses_that_were_not_overridden() {
        let center = |id: &str| Center {
            id: id.into(),
            name: id.into(),
            address: None,
        };
        let mut summary = BookingSummary::default();
        summary.set_first_dose_date(NaiveDate::from_ymd_opt(2024, 3, 4));
        summary.select_vaccine(vaccine(3));
        summary.set_center(Some(center("a")));

        let mut overridden = summary.dose_schedules[0].clone();
        overridden.center_id = Some("b".into());
        summary.override_dose(0, overridden).unwrap();

        summary.set_center(Some(center("c")));
        assert_eq!(summary.dose_schedules[0].center_id.as_deref(), Some("b"));
        assert_eq!(summary.dose_schedules[1].center_id.as_deref(), Some("c"));
    }

    #[test]
    fn dosage_bounds() {
        assert!(!vaccine(0).has_valid_dosage());
        assert!(vaccine(1).has_valid_dosage());
        assert!(vaccine(Vaccine::MAX_DOSES).has_valid_dosage());
        assert!(!vaccine(Vaccine::MAX_DOSES + 1).has_valid_dosage());
        assert_eq!(vaccine(3).follow_up_count(), 2);
    }

    #[test]
    fn override_dose_rejects_unknown_index() {
        let mut summary = BookingSummary::default();
        assert!(summary.override_dose(0, DoseSchedule::default()).is_err());
    }

    #[test]
    fn summary_time_round_trips_as_hours_and_minutes() {
        let summary = BookingSummary {
            time: NaiveTime::from_hms_opt(14, 5, 0),
            ..BookingSummary::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["time"], "14:05");

        let back: BookingSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.time, summary.time);
    }

    #[test]
    fn response_accepts_both_payment_url_spellings() {
        let response: BookingResponse = serde_json::from_str(
            r#"{"method":"PAYPAL","bookingId":"b1","paymentUrl":"https://pay.example/x"}"#,
        )
        .unwrap();
        assert_eq!(response.payment_url.as_deref(), Some("https://pay.example/x"));
    }
}
