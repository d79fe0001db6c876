//! Connection check command.

use anyhow::{Context, Result, bail};
use metarmap_lib::prelude::*;

/// Probe the remote service; exits non-zero if unreachable.
pub(crate) async fn check() -> Result<()> {
    let fetcher = WeatherFetcher::from_env().context("failed to build fetcher")?;

    if fetcher.check_connection().await {
        println!("ok: {}", fetcher.config().base_url);
        Ok(())
    } else {
        bail!("data service unreachable: {}", fetcher.config().base_url);
    }
}
