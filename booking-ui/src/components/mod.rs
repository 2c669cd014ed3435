mod notice;
mod steps;
mod wizard;

pub use wizard::{BookingWizard, BookingWizardProps};
