use clap::Parser;
use dyndrive_core::utils::{
    connection::telemetry::Telemetry,
    controllers::{
        AxisId, AxisSource, DriveCommand, DriveLoop, DrivetrainController, MotorHandle,
        DRIVE_CHANNEL,
    },
    drive::{DriveConfig, DriveStyle, DrivetrainFactory, Topology},
};
use embassy_executor::Executor;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Instant, Ticker};
use hashbrown::HashMap;
use static_cell::StaticCell;
use std::{convert::Infallible, io::BufRead, path::Path, path::PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Drivetrain topology: differential, mecanum or killough
    #[clap(long, default_value = "differential")]
    topology: Topology,
    /// Drive style selected at startup
    #[clap(long, default_value = "arcade")]
    style: DriveStyle,
    /// JSON drive configuration file
    #[clap(long)]
    config: Option<PathBuf>,
    /// Number of control cycles to run, 0 runs forever
    #[clap(long, default_value_t = 0)]
    cycles: u64,
}

/// Motor that logs its commands instead of driving hardware.
struct LogMotor {
    role: &'static str,
}

impl MotorHandle for LogMotor {
    type Error = Infallible;

    fn set_speed(
        &mut self,
        speed: f32,
    ) -> Result<(), Self::Error> {
        info!("{:>12}: {:+.3}", self.role, speed);
        Ok(())
    }

    fn label(&self) -> Option<&str> {
        Some("sim")
    }
}

/// Sticks swept along slow sine waves.
struct ScriptedSticks {
    start: Instant,
}

impl AxisSource for ScriptedSticks {
    type Error = Infallible;

    fn axis(
        &mut self,
        id: AxisId,
    ) -> Result<f32, Self::Error> {
        let t = self.start.elapsed().as_millis() as f32 / 1000.0;
        Ok(match id {
            AxisId::LeftX => 0.5 * (0.3 * t).sin(),
            AxisId::LeftY => 0.8 * t.sin(),
            AxisId::RightX => 0.4 * (0.5 * t).cos(),
            AxisId::RightY => 0.8 * (t + 1.0).sin(),
        })
    }
}

/// Telemetry sink that writes to the log.
struct LogTelemetry;

impl Telemetry for LogTelemetry {
    type Error = Infallible;

    fn publish_string(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), Self::Error> {
        info!("telemetry {} = {}", key, value);
        Ok(())
    }

    fn publish_string_array(
        &mut self,
        key: &str,
        values: &[String],
    ) -> Result<(), Self::Error> {
        info!("telemetry {} = {:?}", key, values);
        Ok(())
    }
}

type SimLoop =
    DriveLoop<'static, CriticalSectionRawMutex, LogMotor, ScriptedSticks, LogTelemetry, 16>;

#[embassy_executor::task]
async fn drive_task(
    mut drive: SimLoop,
    cycles: u64,
) {
    if cycles == 0 {
        drive.run().await
    }

    let mut ticker = Ticker::every(drive.period());
    for _ in 0..cycles {
        let _ = drive.step();
        ticker.next().await;
    }
    info!("ran {} cycles, exiting", cycles);
    std::process::exit(0);
}

/// Forward JSON `DriveCommand` lines from stdin to the drive loop.
fn spawn_command_reader() {
    std::thread::spawn(|| {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DriveCommand>(&line) {
                Ok(cmd) => {
                    if DRIVE_CHANNEL.try_send(cmd).is_err() {
                        warn!("drive command queue full, dropping {:?}", cmd);
                    }
                }
                Err(error) => error!(?error, "error deserializing DriveCommand"),
            }
        }
    });
}

fn load_config(path: Option<&Path>) -> Result<DriveConfig, String> {
    let Some(path) = path else {
        return Ok(DriveConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    DriveConfig::from_json(&json).map_err(|e| format!("invalid config {}: {}", path.display(), e))
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let opts: Opts = Opts::parse();

    let config = match load_config(opts.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let motors: HashMap<&'static str, LogMotor> = opts
        .topology
        .roles()
        .iter()
        .map(|r| (r.as_str(), LogMotor { role: r.as_str() }))
        .collect();

    let mut telemetry = LogTelemetry;
    let drivetrain =
        match DrivetrainFactory::construct_with_telemetry(opts.topology, motors, &mut telemetry) {
            Ok(dt) => dt,
            Err(e) => {
                error!("drivetrain construction failed: {}", e);
                std::process::exit(1);
            }
        };
    let controller = match DrivetrainController::from_config(drivetrain, &config, telemetry) {
        Ok(ctrl) => ctrl,
        Err(e) => {
            error!("invalid drive configuration: {}", e);
            std::process::exit(1);
        }
    };

    let _ = DRIVE_CHANNEL.try_send(DriveCommand::Style { style: opts.style });
    spawn_command_reader();

    info!(
        "Driving {} with {} every {} ms",
        opts.topology, opts.style, config.period_ms
    );
    let sticks = ScriptedSticks {
        start: Instant::now(),
    };
    let drive = DriveLoop::new(controller, sticks, DRIVE_CHANNEL.receiver(), config.period());

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(drive_task(drive, opts.cycles)).unwrap();
    });
}
