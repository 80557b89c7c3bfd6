//! Capacity command - report how much a carrier can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stegkit::CarrierKind;

use super::{load_carrier, resolve_kind, CommandExecutor, Session};

/// Show the payload capacity of a carrier.
///
/// Without --carrier, reports the configured budget of a generated emoji or
/// network carrier.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier kind (inferred from the carrier extension when omitted)
    #[arg(short, long, value_enum)]
    pub kind: Option<CarrierKind>,

    /// Cover file to measure
    #[arg(short, long)]
    pub carrier: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, session: &Session) -> Result<()> {
        let kind = resolve_kind(self.kind, self.carrier.as_deref())?;
        let carrier = load_carrier(kind, self.carrier.as_deref(), session)?;
        let report = carrier.capacity_report();

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
            return Ok(());
        }

        println!("Carrier:          {}", report.kind);
        println!(
            "Usable units:     {} x {} bit(s) = {} bits",
            report.usable_units, report.bits_per_unit, report.usable_bits
        );
        println!("Frame header:     {} bytes", report.header_overhead);
        println!("Capacity:         {} bytes", report.capacity_bytes);
        println!("With password:    {} bytes", report.encrypted_capacity_bytes);
        Ok(())
    }
}
