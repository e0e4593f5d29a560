use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use rom_capture::config::Config;
use rom_capture::pose::{Joint, JointId, JointKind, JointSample, MeasurementSide};
use rom_capture::record::CaptureRecord;
use rom_capture::session::SessionWorker;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const SYNTHETIC_ANGLE: f32 = 45.0;

struct Args {
    side: MeasurementSide,
    config_path: String,
    input: Option<String>,
}

fn usage() -> ! {
    eprintln!("usage: rom_capture [--side left|right] [--config PATH] [FRAMES.jsonl]");
    std::process::exit(2);
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        side: MeasurementSide::Left,
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        input: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--side" => {
                let value = it.next().unwrap_or_else(|| usage());
                args.side = value.parse()?;
            }
            "--config" => {
                args.config_path = it.next().unwrap_or_else(|| usage());
            }
            "-h" | "--help" => usage(),
            _ if arg.starts_with('-') => usage(),
            _ => args.input = Some(arg),
        }
    }
    Ok(args)
}

/// JSON Lines形式の録画を読む（1行1フレーム、空行は無視）
fn load_frames(path: &str) -> Result<Vec<JointSample>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let mut frames = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: JointSample = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid frame", path, i + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// 録画が無いときのデモ: 手首が見えない10フレームの後、45度で静止
fn synthetic_frames(side: MeasurementSide) -> Vec<JointSample> {
    let id = |kind| JointId::for_side(side, kind);
    let dir = match side {
        MeasurementSide::Left => 1.0,
        MeasurementSide::Right => -1.0,
    };
    (0..90)
        .map(|i| {
            let jitter = [0.0, 0.4, -0.4][i % 3];
            let rad = (SYNTHETIC_ANGLE + jitter).to_radians();
            let mut frame = JointSample::new()
                .with(id(JointKind::Hip), Joint::new(0.5, 0.2, 0.9))
                .with(id(JointKind::Shoulder), Joint::new(0.5, 0.6, 0.9))
                .with(
                    id(JointKind::Elbow),
                    Joint::new(0.5 + dir * 0.15 * rad.sin(), 0.6 - 0.15 * rad.cos(), 0.9),
                );
            if i >= 10 {
                frame.insert(
                    id(JointKind::Wrist),
                    Joint::new(0.5 + dir * 0.3 * rad.sin(), 0.6 - 0.3 * rad.cos(), 0.9),
                );
            }
            frame
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = Config::load_or_default(&args.config_path);

    println!("ROM Capture {}", env!("GIT_VERSION"));
    println!("Side: {}", args.side.label());
    println!(
        "Stability: {} frames within {}°, angle > {}°",
        config.measurement.stability_frames,
        config.measurement.stability_epsilon_deg,
        config.measurement.min_valid_angle_deg
    );
    println!();

    let frames = match &args.input {
        Some(path) => load_frames(path)?,
        None => {
            info!("no input file, using synthetic frames");
            synthetic_frames(args.side)
        }
    };
    info!(count = frames.len(), "frames loaded");

    let worker = SessionWorker::start(args.side, &config)?;
    let mut last_status = String::new();
    let mut last_display_id = 0;
    for frame in frames {
        if !worker.submit_wait(frame) {
            debug!("session complete, stop feeding frames");
            break;
        }
        let display_id = worker.display_frame_id();
        if display_id != last_display_id {
            last_display_id = display_id;
            if let Some(display) = worker.display() {
                let status = display.status.to_string();
                if status != last_status {
                    match display.status.guidance() {
                        Some(guidance) => println!("{} ({})", status, guidance),
                        None => println!("{}", status),
                    }
                    last_status = status;
                }
            }
        }
    }

    let capture = match worker.recv_capture(Duration::from_millis(200)) {
        Some(event) => Some(event),
        None => worker.finish(),
    };

    match capture {
        Some(event) => {
            println!("captured: {}°", event.angle_degrees);
            let record = CaptureRecord::from_event(&event, &config.record.image_extension);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => warn!("no stable pose captured"),
    }

    Ok(())
}
