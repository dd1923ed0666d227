//! `emporia` - command line client for the Emporia Energy cloud
//!
//! Loads the account configuration, logs in on the first request and prints
//! every answer as pretty JSON on stdout. Logs go to stderr.
//!
//! ```bash
//! emporia --config config.json chart --device-gid 280643 --period 1h30m
//! emporia usages --device-gids 292237,280643 --scale MONTH --energy-unit DOLLARS
//! emporia set-charger --on
//! emporia stream
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{SubsecRound, Utc};
use clap::Parser;
use emporia_core::usage::period_window;
use emporia_domain::{Config, StreamEvent};
use emporia_infra::{config, EmporiaApi};
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod args;

use args::{ChartArgs, Cli, Command};

/// Number of chart buckets shown without `--debug`
const CHART_PREVIEW_LEN: usize = 10;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    dotenv_outcome(dotenvy::dotenv())?;

    let config = match &cli.config {
        Some(path) => config::load_from_file(Some(path.clone())),
        None => config::load(),
    };
    config.context("Failed to load configuration")
}

/// A missing `.env` is fine, an unreadable or malformed one is not
fn dotenv_outcome<T>(result: Result<T, dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("Failed to load .env"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let api = EmporiaApi::from_config(&config)?;

    match cli.command {
        Command::Chart(args) => chart(&api, args, cli.debug).await,
        Command::Peak { device_gid, channels, energy_unit } => {
            print_json(&api.current_month_peak_demand(device_gid, &channels, energy_unit).await?)
        }
        Command::Usages { device_gids, instant, scale, energy_unit } => {
            let instant = instant.unwrap_or_else(Utc::now);
            print_json(&api.devices_usages(&device_gids, instant, scale, energy_unit).await?)
        }
        Command::Instant { device_gids, energy_unit } => {
            print_json(&api.instant_usage(&device_gids, energy_unit).await?)
        }
        Command::Status { c_api: true } => print_json(&api.devices_status_c_api().await?),
        Command::Status { c_api: false } => print_json(&api.devices_status().await?),
        Command::Chargers => print_json(&api.ev_chargers().await?),
        Command::SetCharger { on, off: _, device_gid } => {
            let update = match device_gid {
                Some(gid) => api.set_ev_charger_by_id(gid, on).await?,
                None => api.set_ev_charger(on).await?,
            };
            print_json(&update)
        }
        Command::ChargingRate { device_gid, energy_unit } => {
            let watts = api.current_charging_rate(energy_unit, device_gid).await?;
            print_json(&json!({ "watts": watts }))
        }
        Command::Rate { cents: Some(rate), .. } => {
            print_json(&api.set_devices_rate_properties(rate).await?)
        }
        Command::Rate { tier: Some(tier), .. } => print_json(&api.apply_rate_tier(tier).await?),
        Command::Rate { .. } => print_json(&api.devices_rate_properties().await?),
        Command::Prefs => print_json(&api.app_preferences().await?),
        Command::Stream => stream(&api).await,
    }
}

async fn chart(api: &EmporiaApi, args: ChartArgs, debug: bool) -> anyhow::Result<()> {
    let (start, end) = match (args.start, args.end, args.period.as_deref()) {
        (Some(start), Some(end), _) => (start, end),
        (_, _, Some(period)) => period_window(period, Utc::now().trunc_subsecs(0))?,
        _ => bail!("Provide --start/--end OR --period"),
    };
    debug!(%start, %end, "Chart window");

    let usage = api
        .chart_usage(args.device_gid, &args.channel, start, end, args.scale, args.energy_unit)
        .await?;

    if debug {
        return print_json(&usage);
    }
    let preview: Vec<_> = usage.usage_list.iter().take(CHART_PREVIEW_LEN).collect();
    print_json(&json!({
        "firstUsageInstant": usage.first_usage_instant,
        "usageListLength": usage.usage_list.len(),
        "preview": preview,
    }))
}

async fn stream(api: &EmporiaApi) -> anyhow::Result<()> {
    let stream = api.device_status_stream(Arc::new(|event: StreamEvent| {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Unprintable event: {e}"),
        }
    }));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, closing stream");
                on_interrupt.cancel();
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });

    stream.run(cancel).await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
