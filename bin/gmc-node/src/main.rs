use clap::Parser;
use gmc_core::{Credentials, Endpoint, Identity, NodeConfig, Secret};
use gmc_hal::{BootInfo, Watchdog};
use gmc_kernel::{GmcKernel, Platform};
use gmc_linux::{
    spawn_sim_tube, ConsoleLamp, HostAmbient, HostBoot, HostClock, HostNet, SoftWatchdog, TcpLink,
};
use gmc_meter::PulseAccumulator;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
struct Cli {
    /// Public CPM aggregation endpoint.
    #[arg(long, default_value = "radmon.example.org")]
    primary_host: String,
    #[arg(long, default_value_t = 80)]
    primary_port: u16,
    #[arg(long, default_value = "/radmon.php")]
    primary_path: String,
    #[arg(long)]
    user: String,
    #[arg(long)]
    password: String,

    /// Self-hosted heartbeat endpoint.
    #[arg(long, default_value = "127.0.0.1")]
    hb_host: String,
    #[arg(long, default_value_t = 8080)]
    hb_port: u16,
    #[arg(long, default_value = "/heartbeat")]
    hb_path: String,

    #[arg(long, default_value = "gmc-7")]
    device_id: String,
    #[arg(long, default_value = "0001")]
    serial: String,
    #[arg(long, default_value = "")]
    secret: String,

    /// Measurement window; must divide 60.
    #[arg(long, default_value_t = 60)]
    window_secs: u32,
    /// Mean rate of the simulated detector tube.
    #[arg(long, default_value_t = 25)]
    sim_cpm: u32,
}

// The one cell the tube interrupt shares with the control loop.
static PULSES: PulseAccumulator = PulseAccumulator::new();

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!(">>> GMC NODE: v{} <<<", env!("CARGO_PKG_VERSION"));

    // Reset cause is captured, and the watchdog held off, before anything
    // else is brought up; the kernel re-arms it in start().
    let reset_cause = HostBoot.reset_cause();
    let mut watchdog = SoftWatchdog::new();
    watchdog.disable();

    let mut cfg = NodeConfig::new(
        Endpoint {
            host: cli.primary_host,
            port: cli.primary_port,
            path: cli.primary_path,
        },
        Credentials {
            user: cli.user,
            password: Secret::new(cli.password),
        },
        Endpoint {
            host: cli.hb_host,
            port: cli.hb_port,
            path: cli.hb_path,
        },
        Identity {
            device_id: cli.device_id,
            serial: cli.serial,
            secret: Secret::new(cli.secret),
            firmware: env!("CARGO_PKG_VERSION").to_string(),
        },
    );
    cfg.window_ms = cli.window_secs.saturating_mul(1_000);

    spawn_sim_tube(&PULSES, cli.sim_cpm);

    let hw = Platform {
        clock: Box::new(HostClock::new()),
        watchdog: Box::new(watchdog),
        link: Box::new(TcpLink::new(3_000)),
        net: Box::new(HostNet),
        ambient: Box::new(HostAmbient::new(21.5, 40.0)),
        lamp: Box::new(ConsoleLamp::new()),
    };

    let mut kernel = GmcKernel::new(cfg, hw, &PULSES, reset_cause)
        .map_err(|e| anyhow::anyhow!("configuration rejected: {}", e))?;
    kernel.start();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    info!(
        "Node active. Window {}s, simulated tube at ~{} cpm.",
        cli.window_secs, cli.sim_cpm
    );
    while running.load(Ordering::SeqCst) {
        kernel.tick();
        std::thread::sleep(std::time::Duration::from_millis(25));
    }

    info!("Node stopped after {} windows.", kernel.state().windows_run);
    Ok(())
}
