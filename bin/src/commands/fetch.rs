//! Fetch command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use metarmap_lib::prelude::*;

use crate::display::{Format, write_result};

/// Fetch reports for the given stations and print the merged result.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn fetch(
    stations: &[String],
    report: &str,
    hours: Option<f64>,
    format: Format,
    timeout_secs: Option<u64>,
    retries: Option<u32>,
    deadline_secs: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let report_type = report
        .parse::<ReportType>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // Environment overrides first, explicit flags on top.
    let mut config = ClientConfig::from_env();
    if let Some(secs) = timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = retries {
        config.retries = retries.max(1);
    }

    let fetcher = WeatherFetcher::new(config).context("failed to build fetcher")?;

    let spinner = if quiet || !matches!(format, Format::Text) {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
        );
        pb.set_message(format!(
            "fetching {} for {} station(s)",
            report_type,
            stations.len()
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let deadline = deadline_secs.map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let result = fetcher
        .fetch_with_options(stations, report_type, hours, deadline)
        .await?;

    spinner.finish_and_clear();

    write_result(&mut std::io::stdout().lock(), &result, format)?;
    Ok(())
}
