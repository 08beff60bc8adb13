pub mod data;

use crate::devices::vcgencmd::{parse_core_volts, parse_temperature};
use crate::devices::Vcgencmd;
use chrono::Utc;
use csv::Writer;
use data::SampleRecord;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Printed in place of a reading whenever the tool cannot be queried.
pub const UNAVAILABLE: &str = "측정 불가";

/// Banner printed once before sampling starts.
pub const BANNER: &str = "전원 안정성 모니터링 (30초간)";

/// Configuration for a monitoring run
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub iterations: u32,          // number of samples to take
    pub interval: Duration,       // sleep after every sample, including the last
    pub csv_dir: Option<PathBuf>, // where to record samples, None to skip
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            iterations: 6,
            interval: Duration::from_secs(5),
            csv_dir: Some(PathBuf::from("logs")),
        }
    }
}

/// One pair of readings, consumed by the line it is printed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub temperature: String,
    pub voltage: String,
}

pub fn get_cpu_temp(vc: &Vcgencmd) -> String {
    match vc.measure_temp() {
        Ok(temp) => temp,
        Err(e) => {
            warn!("Failed to measure CPU temperature: {}", e);
            UNAVAILABLE.to_string()
        }
    }
}

pub fn get_voltage(vc: &Vcgencmd) -> String {
    match vc.measure_volts("core") {
        Ok(volts) => volts,
        Err(e) => {
            warn!("Failed to measure core voltage: {}", e);
            UNAVAILABLE.to_string()
        }
    }
}

pub fn sample(vc: &Vcgencmd) -> Sample {
    Sample {
        temperature: get_cpu_temp(vc),
        voltage: get_voltage(vc),
    }
}

/// `" 5초: temp=48.3'C, volt=0.8563V"`
pub fn format_line(elapsed_s: u64, sample: &Sample) -> String {
    format!("{:2}초: {}, {}", elapsed_s, sample.temperature, sample.voltage)
}

/// Take `config.iterations` samples, writing one line each to `out`.
///
/// Tool failures never surface here; only errors writing to `out` do.
/// Returns the CSV path when samples were recorded.
pub fn run_monitor<W: Write>(
    vc: &Vcgencmd,
    config: &MonitorConfig,
    out: &mut W,
) -> io::Result<Option<PathBuf>> {
    run_monitor_with_sleep(vc, config, out, std::thread::sleep)
}

fn run_monitor_with_sleep<W, S>(
    vc: &Vcgencmd,
    config: &MonitorConfig,
    out: &mut W,
    mut sleep: S,
) -> io::Result<Option<PathBuf>>
where
    W: Write,
    S: FnMut(Duration),
{
    info!("Starting power monitor with configuration: {:?}", config);

    let mut recorder = match &config.csv_dir {
        Some(dir) => match CsvRecorder::create(dir) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("Could not create CSV record in {}: {}", dir.display(), e);
                None
            }
        },
        None => None,
    };

    for i in 0..config.iterations {
        let elapsed_s = (config.interval * i).as_secs();
        let reading = sample(vc);

        writeln!(out, "{}", format_line(elapsed_s, &reading))?;
        out.flush()?;

        if let Some(r) = recorder.as_mut() {
            if let Err(e) = r.append(elapsed_s, &reading) {
                warn!("Failed to record sample, disabling CSV output: {}", e);
                recorder = None;
            }
        }

        sleep(config.interval);
    }

    let path = recorder.map(|r| r.path);
    if let Some(p) = &path {
        info!("Samples saved to {}", p.display());
    }
    info!("Power monitor finished after {} samples", config.iterations);
    Ok(path)
}

struct CsvRecorder {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvRecorder {
    fn create(dir: &Path) -> io::Result<Self> {
        let filename = chrono::Local::now()
            .format("power_monitor_%Y-%m-%d_%H-%M-%S.csv")
            .to_string();

        std::fs::create_dir_all(dir)?;
        let path = dir.join(filename);
        let file = File::create(&path)?;
        info!("Recording samples to {}", path.display());
        Ok(Self {
            writer: Writer::from_writer(file),
            path,
        })
    }

    fn append(&mut self, elapsed_s: u64, sample: &Sample) -> csv::Result<()> {
        let record = SampleRecord {
            timestamp: Utc::now().to_rfc3339(),
            elapsed_s,
            temperature: sample.temperature.clone(),
            voltage: sample.voltage.clone(),
            temperature_c: parse_temperature(&sample.temperature),
            core_volts: parse_core_volts(&sample.voltage),
        };
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }
}
