//! Three-step booking wizard and its per-step checks.

use serde::{Deserialize, Serialize};

use crate::BookingSummary;

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    VaccineSelection,
    Confirmation,
    PaymentMethod,
}

impl BookingStep {
    pub const ALL: [BookingStep; 3] = [
        BookingStep::VaccineSelection,
        BookingStep::Confirmation,
        BookingStep::PaymentMethod,
    ];

    pub fn index(self) -> usize {
        match self {
            BookingStep::VaccineSelection => 0,
            BookingStep::Confirmation => 1,
            BookingStep::PaymentMethod => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            BookingStep::VaccineSelection => "Choose a vaccine",
            BookingStep::Confirmation => "Date, time and center",
            BookingStep::PaymentMethod => "Payment",
        }
    }

    pub fn is_last(self) -> bool {
        self == BookingStep::PaymentMethod
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Check the fields this step is responsible for.
    pub fn validate(self, summary: &BookingSummary) -> Result<(), ValidationError> {
        match self {
            BookingStep::VaccineSelection => {
                let vaccine = summary.vaccine.as_ref().ok_or(ValidationError::MissingVaccine)?;
                if !vaccine.has_valid_dosage() {
                    return Err(ValidationError::InvalidDosage {
                        dosage: vaccine.dosage,
                    });
                }
            }
            BookingStep::Confirmation => {
                if summary.first_dose_date.is_none() {
                    return Err(ValidationError::MissingDate);
                }
                if summary.time.is_none() {
                    return Err(ValidationError::MissingTime);
                }
                if summary.center.is_none() {
                    return Err(ValidationError::MissingCenter);
                }
                let follow_ups = summary
                    .vaccine
                    .as_ref()
                    .map_or(0, |vaccine| vaccine.follow_up_count());
                let scheduled = &summary.dose_schedules;
                // Dose numbering starts at the second dose.
                if let Some(position) = scheduled
                    .iter()
                    .take(follow_ups)
                    .position(|dose| !dose.is_complete())
                {
                    return Err(ValidationError::IncompleteDose { dose: position + 2 });
                }
                if scheduled.len() < follow_ups {
                    return Err(ValidationError::IncompleteDose {
                        dose: scheduled.len() + 2,
                    });
                }
            }
            BookingStep::PaymentMethod => {
                if summary.payment.is_none() {
                    return Err(ValidationError::MissingPayment);
                }
            }
        }
        Ok(())
    }
}

/// User-facing reasons a step cannot be left.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a vaccine")]
    MissingVaccine,
    #[error("This vaccine has an unsupported number of doses ({dosage})")]
    InvalidDosage { dosage: u32 },
    #[error("Please pick a date for the first dose")]
    MissingDate,
    #[error("Please pick an appointment time")]
    MissingTime,
    #[error("Please select a vaccination center")]
    MissingCenter,
    #[error("Please fill in the date and time of dose {dose}")]
    IncompleteDose { dose: usize },
    #[error("Please choose a payment method")]
    MissingPayment,
}

/// Wizard position plus the summary it is filling in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wizard {
    step: BookingStep,
    summary: BookingSummary,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(BookingSummary::default())
    }
}

impl Wizard {
    pub fn new(summary: BookingSummary) -> Self {
        Self {
            step: BookingStep::VaccineSelection,
            summary,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn summary(&self) -> &BookingSummary {
        &self.summary
    }

    pub fn summary_mut(&mut self) -> &mut BookingSummary {
        &mut self.summary
    }

    /// Advance when the current step is complete. On failure the step is kept.
    pub fn next(&mut self) -> Result<BookingStep, ValidationError> {
        if let Err(err) = self.step.validate(&self.summary) {
            log::warn!("step {:?} blocked: {err}", self.step);
            return Err(err);
        }
        if let Some(next) = self.step.next() {
            log::info!("wizard step {:?} -> {:?}", self.step, next);
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step. No-op on the first step.
    pub fn back(&mut self) -> BookingStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    pub fn reset(&mut self) {
        self.step = BookingStep::VaccineSelection;
        self.summary = BookingSummary::default();
    }

    /// Run every step's check in order; the guard before submission.
    pub fn validate_all(summary: &BookingSummary) -> Result<(), ValidationError> {
        BookingStep::ALL
            .into_iter()
            .try_for_each(|step| step.validate(summary))
    }

    pub fn is_complete(&self) -> bool {
        Self::validate_all(&self.summary).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Center, DoseSchedule, PaymentMethod, Vaccine};
    use chrono::{NaiveDate, NaiveTime};

    fn vaccine(dosage: u32) -> Vaccine {
        Vaccine {
            id: "v1".into(),
            name: "Influenza".into(),
            price: 30.0,
            dosage,
            duration: 14,
            description: None,
        }
    }

    fn center() -> Center {
        Center {
            id: "c1".into(),
            name: "Central clinic".into(),
            address: None,
        }
    }

    fn confirmed_wizard(dosage: u32) -> Wizard {
        let mut wizard = Wizard::default();
        let summary = wizard.summary_mut();
        summary.select_vaccine(vaccine(dosage));
        summary.set_first_dose_date(NaiveDate::from_ymd_opt(2024, 6, 3));
        summary.set_center(Some(center()));
        summary.set_time(NaiveTime::from_hms_opt(10, 0, 0));
        wizard
    }

    #[test]
    fn first_step_requires_vaccine() {
        let mut wizard = Wizard::default();
        assert_eq!(wizard.next(), Err(ValidationError::MissingVaccine));
        assert_eq!(wizard.step(), BookingStep::VaccineSelection);
    }

    #[test]
    fn confirmation_rejects_missing_time() {
        let mut wizard = Wizard::default();
        let summary = wizard.summary_mut();
        summary.select_vaccine(vaccine(1));
        summary.set_first_dose_date(NaiveDate::from_ymd_opt(2024, 6, 3));
        summary.set_center(Some(center()));

        assert_eq!(wizard.next(), Ok(BookingStep::Confirmation));
        assert_eq!(wizard.next(), Err(ValidationError::MissingTime));
        assert_eq!(wizard.step(), BookingStep::Confirmation);
    }

    #[test]
    fn confirmation_accepts_complete_fields() {
        let mut wizard = confirmed_wizard(2);
        assert_eq!(wizard.next(), Ok(BookingStep::Confirmation));
        assert_eq!(wizard.next(), Ok(BookingStep::PaymentMethod));
    }

    #[test]
    fn confirmation_checks_every_follow_up_dose() {
        let mut wizard = confirmed_wizard(3);
        wizard
            .summary_mut()
            .override_dose(1, DoseSchedule {
                date: NaiveDate::from_ymd_opt(2024, 7, 1),
                time: None,
                center_id: Some("c1".into()),
            })
            .unwrap();

        wizard.next().unwrap();
        assert_eq!(wizard.next(), Err(ValidationError::IncompleteDose { dose: 3 }));
    }

    #[test]
    fn confirmation_requires_every_follow_up_dose_to_exist() {
        let mut wizard = confirmed_wizard(3);
        wizard.summary_mut().dose_schedules.truncate(1);
        wizard.next().unwrap();
        assert_eq!(wizard.next(), Err(ValidationError::IncompleteDose { dose: 3 }));

        wizard.summary_mut().dose_schedules.clear();
        assert_eq!(
            Wizard::validate_all(wizard.summary()),
            Err(ValidationError::IncompleteDose { dose: 2 })
        );
    }

    #[test]
    fn summary_from_json_without_doses_is_incomplete() {
        let summary: BookingSummary = serde_json::from_str(
            r#"{
                "vaccine": {"id": "v", "name": "HepB", "price": 10.0, "dosage": 3, "duration": 30},
                "firstDoseDate": "2024-06-03",
                "time": "09:00",
                "center": {"id": "c1", "name": "Central"},
                "payment": "CASH",
                "doseSchedules": []
            }"#,
        )
        .unwrap();

        assert_eq!(
            BookingStep::Confirmation.validate(&summary),
            Err(ValidationError::IncompleteDose { dose: 2 })
        );
    }

    #[test]
    fn vaccine_without_doses_is_rejected() {
        let mut wizard = Wizard::default();
        wizard.summary_mut().select_vaccine(vaccine(0));
        assert_eq!(wizard.next(), Err(ValidationError::InvalidDosage { dosage: 0 }));
        assert_eq!(wizard.step(), BookingStep::VaccineSelection);
    }

    #[test]
    fn single_dose_ignores_stale_schedule_entries() {
        let mut wizard = confirmed_wizard(1);
        wizard.summary_mut().dose_schedules.push(DoseSchedule::default());
        wizard.next().unwrap();
        assert_eq!(wizard.next(), Ok(BookingStep::PaymentMethod));
    }

    #[test]
    fn payment_step_requires_method() {
        let mut wizard = confirmed_wizard(1);
        wizard.next().unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.next(), Err(ValidationError::MissingPayment));

        wizard.summary_mut().payment = Some(PaymentMethod::Cash);
        assert_eq!(wizard.next(), Ok(BookingStep::PaymentMethod));
        assert!(wizard.is_complete());
    }

    #[test]
    fn back_and_reset() {
        let mut wizard = confirmed_wizard(1);
        assert_eq!(wizard.back(), BookingStep::VaccineSelection);
        wizard.next().unwrap();
        assert_eq!(wizard.back(), BookingStep::VaccineSelection);

        wizard.next().unwrap();
        wizard.reset();
        assert_eq!(wizard.step(), BookingStep::VaccineSelection);
        assert_eq!(wizard.summary(), &BookingSummary::default());
    }
}
