//! Output formatting for fetched results.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use metarmap_lib::prelude::*;

/// Output format for the fetch command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// One line per station.
    Text,
    /// The full merged result as JSON.
    Json,
}

/// Writes the merged result in the chosen format.
pub(crate) fn write_result(out: &mut impl Write, result: &MergedResult, format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for record in result.records() {
                let time = record
                    .observation_time
                    .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
                writeln!(out, "{:<8} {}", record.station, time)?;
            }
            writeln!(
                out,
                "{} {} record(s)",
                result.num_results(),
                result.report_type()
            )?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
