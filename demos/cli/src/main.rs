use std::path::{Path, PathBuf};

use anyhow::Context;
use booking_core::{
    amount_to_wei, derive_dose_dates, BookingConfig, BookingPayload, BookingResponse, BookingStep,
    BookingSummary, PaymentMethod, SuccessView, TransferRequest,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "booking-cli",
    about = "Inspect vaccination bookings: dose schedules, step checks, request payloads and backend replies."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the follow-up dose dates for a vaccine course.
    Schedule {
        /// First dose date (YYYY-MM-DD).
        #[arg(long)]
        first_dose: NaiveDate,
        /// Number of doses in the course.
        #[arg(long)]
        dosage: u32,
        /// Days between doses.
        #[arg(long)]
        duration: u32,
    },
    /// Run every wizard step check against a booking summary JSON file.
    Validate {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the creation request built from a booking summary JSON file.
    Payload {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Show what the client does with a booking creation reply.
    Plan {
        /// Backend reply JSON file.
        #[arg(short, long)]
        response: PathBuf,
        /// Wallet payment destination.
        #[arg(long)]
        treasury: Option<String>,
        /// Client route of the success view.
        #[arg(long)]
        success_path: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Schedule {
            first_dose,
            dosage,
            duration,
        } => {
            if dosage == 0 {
                anyhow::bail!("dosage must be at least 1");
            }
            println!("Dose 1: {} ({})", first_dose, first_dose.format("%A"));
            for (index, date) in derive_dose_dates(first_dose, dosage, duration)
                .into_iter()
                .enumerate()
            {
                println!("Dose {}: {} ({})", index + 2, date, date.format("%A"));
            }
        }
        Command::Validate { input } => {
            let summary = read_summary(&input)?;
            let mut failed = false;
            for step in BookingStep::ALL {
                match step.validate(&summary) {
                    Ok(()) => println!("[ok]   {}", step.title()),
                    Err(err) => {
                        failed = true;
                        println!("[fail] {}: {err}", step.title());
                    }
                }
            }
            if failed {
                anyhow::bail!("booking summary is incomplete");
            }
        }
        Command::Payload { input } => {
            let summary = read_summary(&input)?;
            let payload = BookingPayload::from_summary(&summary)
                .context("Booking summary cannot be submitted")?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Plan {
            response,
            treasury,
            success_path,
        } => {
            let data = std::fs::read_to_string(&response)
                .with_context(|| format!("Could not read file {:?}", response))?;
            let reply = booking_api::parse_booking_response_str(&data)
                .with_context(|| format!("Invalid booking response in {:?}", response))?;

            let mut config = BookingConfig::default();
            if let Some(treasury) = treasury {
                config.treasury_address = treasury;
            }
            if let Some(success_path) = success_path {
                config.success_path = success_path;
            }
            println!("{}", describe_plan(reply, &config)?);
        }
    }

    Ok(())
}

fn describe_plan(response: BookingResponse, config: &BookingConfig) -> anyhow::Result<String> {
    tracing::debug!(method = %response.method, booking = %response.booking_id, "planning reply");
    match response.method {
        PaymentMethod::Cash | PaymentMethod::BankTransfer => {
            let view = SuccessView {
                booking_id: response.booking_id,
                payment_id: response.payment_id,
            };
            Ok(format!("navigate {}", view.route(&config.success_path)))
        }
        PaymentMethod::Paypal => {
            let url = response
                .payment_url
                .context("PayPal payment URL missing from response")?;
            Ok(format!("redirect {url}"))
        }
        PaymentMethod::Metamask => {
            let amount = response
                .amount
                .context("Payment amount missing from response")?;
            let transfer = TransferRequest {
                to: config.treasury_address.clone(),
                amount_wei: amount_to_wei(amount, config.native_decimals)
                    .with_context(|| format!("Invalid payment amount {amount}"))?,
            };
            Ok(format!(
                "wallet transfer of {amount} ({} wei) to {}",
                transfer.value_hex(),
                transfer.to
            ))
        }
    }
}

fn read_summary(path: &Path) -> anyhow::Result<BookingSummary> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read file {:?}", path))?;
    let mut summary: BookingSummary = serde_json::from_str(&data)
        .with_context(|| format!("Invalid booking summary in {:?}", path))?;

    if summary.dose_schedules.is_empty() {
        summary.refresh_dose_schedules();
        tracing::debug!(doses = summary.dose_schedules.len(), "derived dose schedule");
    }
    Ok(summary)
}
