// src/main.rs
mod config;
mod drivers;
mod types;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use anyhow::{bail, Context, Result};
use clap::Parser;
use config::DetectorConfig;
use drivers::{
    DetectorSession, LineSource, SampleRateCalibrator, SerialLineSource, SimulatedSource,
};
use types::DetectionMode;
/// Nominal rate of the simulated sensor.
const SIM_RATE_HZ: f64 = 1600.0;
/// Live impact timing from an analog sensor pair on a serial microcontroller.
#[derive(Debug, Parser)]
#[command(name = "echoscope", version)]
struct Cli {
    /// Serial port of the microcontroller (e.g. /dev/ttyACM0, COM6).
    #[arg(long, required_unless_present = "simulate")]
    port: Option<String>,
    #[arg(long, default_value_t = 2_000_000)]
    baud: u32,
    #[arg(long, value_enum, default_value_t = DetectionMode::Echo)]
    mode: DetectionMode,
    /// JSON file with detector settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Peak threshold above/below baseline in echo mode (V).
    #[arg(long)]
    threshold: Option<f64>,
    /// Trigger offset above baseline in dual mode (V).
    #[arg(long)]
    trigger_threshold: Option<f64>,
    /// Rolling window capacity in samples.
    #[arg(long)]
    window: Option<usize>,
    /// Use a synthetic sensor instead of a serial port.
    #[arg(long)]
    simulate: bool,
    /// Stop after this many seconds.
    #[arg(long)]
    duration: Option<f64>,
}
impl Cli {
    fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DetectorConfig::default(),
        };
        if let Some(v) = self.threshold {
            config.peak_threshold_v = v;
        }
        if let Some(v) = self.trigger_threshold {
            config.trigger_threshold_v = v;
        }
        if let Some(v) = self.window {
            config.window_capacity = v;
        }
        config.validate()?;
        Ok(config)
    }
}
/// End of the steady-state loop: `--duration` elapsed or Ctrl-C pressed.
struct StopCondition {
    deadline: Option<Instant>,
    interrupted: Arc<AtomicBool>,
}
impl StopCondition {
    fn reached(&self, now: Instant) -> bool {
        self.interrupted.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| now >= d)
    }
}
// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.detector_config()?;
    // Ctrl-C 只设置标志，让主循环正常退出并释放串口
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("installing Ctrl-C handler")?;
    if cli.simulate {
        let baseline_counts = config.baseline_v / config.v_ref * config.adc_resolution;
        let source = SimulatedSource::new(
            SIM_RATE_HZ,
            cli.mode == DetectionMode::Dual,
            baseline_counts,
            Duration::from_secs(1),
        );
        log::info!("simulated sensor at {SIM_RATE_HZ} Hz");
        return run(source, &cli, config, interrupted);
    }
    let Some(port) = cli.port.as_deref() else {
        bail!("--port is required unless --simulate is given");
    };
    let source = SerialLineSource::open(port, cli.baud)?;
    run(source, &cli, config, interrupted)
}
/// Settle, calibrate, then tick until stopped. The source is owned by the
/// session and released on every return path, Ctrl-C included.
fn run<S: LineSource>(
    mut source: S,
    cli: &Cli,
    config: DetectorConfig,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    // 1. 等待设备复位后稳定
    thread::sleep(config.settle_delay());
    source.clear_input()?;
    // 2. 校准采样率
    let calibrator = SampleRateCalibrator::new(config.calibration_window());
    log::info!("calibrating sample rate over {:?}...", calibrator.window());
    let rate = calibrator.calibrate(&mut source)?;
    log::info!("measured {:.0} Hz ({:.4} ms per sample)", rate.hz(), rate.ms_per_sample());
    let tick = config.tick_interval();
    let trigger_level = config.trigger_level_v();
    let mut session = DetectorSession::new(source, io::stdout(), config, cli.mode, rate);
    session.reporter_mut().report_calibration()?;
    if cli.mode == DetectionMode::Dual {
        session.reporter_mut().report_trigger_level(trigger_level)?;
    }
    // 3. 主循环
    let stop = StopCondition {
        deadline: cli
            .duration
            .map(|secs| Instant::now() + Duration::from_secs_f64(secs.max(0.0))),
        interrupted,
    };
    let mut next_tick = Instant::now();
    loop {
        let now = Instant::now();
        if stop.reached(now) {
            break;
        }
        let summary = session.tick(now).context("acquisition failed")?;
        if summary.reports > 0 {
            log::debug!("{} event(s) reported this tick", summary.reports);
        }
        next_tick += tick;
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            next_tick = now;
        }
    }
    let (accepted, discarded) = session.totals();
    log::info!("stopped after {accepted} samples ({discarded} malformed lines dropped)");
    Ok(())
}
