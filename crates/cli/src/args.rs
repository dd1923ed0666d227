//! Command line definition

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use emporia_domain::{ChartScale, DeviceGids, EnergyUnit, RateTier, UsageScale};

/// Emporia Energy cloud client
#[derive(Parser, Debug)]
#[command(name = "emporia", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config.json or config.toml (default: environment, then
    /// the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (`RUST_LOG` takes precedence)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Historical usage list of one channel
    Chart(ChartArgs),
    /// Peak demand of the current month
    Peak {
        #[arg(long)]
        device_gid: u64,
        #[arg(long, default_value = "1,2,3")]
        channels: String,
        #[arg(long, default_value = "KilowattHours")]
        energy_unit: EnergyUnit,
    },
    /// Usage of several devices at one instant (c-api)
    Usages {
        /// Comma-separated gids, e.g. 292237,280643
        #[arg(long)]
        device_gids: DeviceGids,
        /// UTC instant such as 2026-01-25T17:20:20.388Z (default: now)
        #[arg(long)]
        instant: Option<DateTime<Utc>>,
        #[arg(long, default_value = "MONTH")]
        scale: UsageScale,
        #[arg(long, default_value = "DOLLARS")]
        energy_unit: EnergyUnit,
    },
    /// Instantaneous usage per device
    Instant {
        #[arg(long)]
        device_gids: DeviceGids,
        #[arg(long, default_value = "KilowattHours")]
        energy_unit: EnergyUnit,
    },
    /// Device status
    Status {
        /// Query the c-api host instead of the legacy one
        #[arg(long)]
        c_api: bool,
    },
    /// EV chargers on the account
    Chargers,
    /// Turn an EV charger on or off
    #[command(group(ArgGroup::new("state").required(true).args(["on", "off"])))]
    SetCharger {
        #[arg(long)]
        on: bool,
        #[arg(long)]
        off: bool,
        /// Charger to switch (default: the first one)
        #[arg(long)]
        device_gid: Option<u64>,
    },
    /// Current draw of a charger in watts
    ChargingRate {
        #[arg(long)]
        device_gid: Option<u64>,
        #[arg(long, default_value = "KilowattHours")]
        energy_unit: EnergyUnit,
    },
    /// Show device tariff rates, or apply one
    #[command(group(ArgGroup::new("target").args(["cents", "tier"])))]
    Rate {
        /// Rate in cents/kWh
        #[arg(long)]
        cents: Option<f64>,
        /// Configured tier: low, high or generac
        #[arg(long)]
        tier: Option<RateTier>,
    },
    /// Decoded mobile app preferences
    Prefs,
    /// Print device status events until interrupted
    Stream,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("window").required(true).args(["period", "start"])))]
pub struct ChartArgs {
    #[arg(long)]
    pub device_gid: u64,
    #[arg(long, default_value = "Mains")]
    pub channel: String,
    /// Relative period ending now, e.g. 15M, 1h30m, PT2H
    #[arg(long)]
    pub period: Option<String>,
    #[arg(long, requires = "end")]
    pub start: Option<DateTime<Utc>>,
    #[arg(long, requires = "start")]
    pub end: Option<DateTime<Utc>>,
    #[arg(long, default_value = "1MIN")]
    pub scale: ChartScale,
    #[arg(long, default_value = "AmpHours")]
    pub energy_unit: EnergyUnit,
}
