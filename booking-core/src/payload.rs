//! Request body of the booking creation endpoint.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::wizard::{ValidationError, Wizard};
use crate::{hhmm, BookingSummary, PaymentMethod};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub vaccine_id: String,
    pub center_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm::required")]
    pub time: NaiveTime,
    pub payment_method: PaymentMethod,
    /// Price of the full course: unit price times dose count.
    pub price: f64,
    pub dose_schedules: Vec<DosePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DosePayload {
    pub date: NaiveDate,
    #[serde(with = "hhmm::required")]
    pub time: NaiveTime,
    pub center_id: String,
}

impl BookingPayload {
    /// Build the request from a summary that passes every wizard step.
    pub fn from_summary(summary: &BookingSummary) -> Result<Self, ValidationError> {
        Wizard::validate_all(summary)?;

        let (Some(vaccine), Some(center), Some(date), Some(time), Some(payment_method)) = (
            summary.vaccine.as_ref(),
            summary.center.as_ref(),
            summary.first_dose_date,
            summary.time,
            summary.payment,
        ) else {
            // validate_all covers every field above
            return Err(ValidationError::MissingVaccine);
        };

        let dose_schedules = if vaccine.is_multi_dose() {
            summary
                .dose_schedules
                .iter()
                .take(vaccine.follow_up_count())
                .enumerate()
                .map(|(index, dose)| match (dose.date, dose.time) {
                    (Some(date), Some(time)) => Ok(DosePayload {
                        date,
                        time,
                        center_id: dose.center_id.clone().unwrap_or_else(|| center.id.clone()),
                    }),
                    _ => Err(ValidationError::IncompleteDose { dose: index + 2 }),
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            vaccine_id: vaccine.id.clone(),
            center_id: center.id.clone(),
            date,
            time,
            payment_method,
            price: vaccine.course_price(),
            dose_schedules,
        })
    }
}
