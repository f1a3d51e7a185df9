//! HWF CLI - Command line tool for daily temperature and heat-wave forecasts.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "hwf-cli",
    version,
    about = "Daily maximum temperature and heat-wave forecasting toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: hwf_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("hwf-cli {}", env!("CARGO_PKG_VERSION"));
    hwf_cmd::run(cli.command)
}
