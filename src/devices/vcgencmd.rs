use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum VcgencmdError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("vcgencmd exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },

    #[error("Decode error: {0}")]
    DecodeError(#[from] FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, VcgencmdError>;

/// Handle on the firmware query tool.
pub struct Vcgencmd {
    program: OsString,
}

impl Vcgencmd {
    pub fn new() -> Self {
        Self::with_program("vcgencmd")
    }

    /// Target a different executable. Arguments are passed through unchanged.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        let program = program.into();
        debug!("Using firmware query program {:?}", program);
        Vcgencmd { program }
    }

    pub fn query(&self, args: &[&str]) -> Result<String> {
        debug!("Running {:?} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{:?} {:?} failed with {}", self.program, args, output.status);
            return Err(VcgencmdError::CommandFailed {
                status: output.status,
                stderr,
            });
        }

        let response = String::from_utf8(output.stdout)?.trim().to_string();
        debug!("Received response: {}", response);
        Ok(response)
    }

    pub fn measure_temp(&self) -> Result<String> {
        self.query(&["measure_temp"])
    }

    /// `component` is one of `core`, `sdram_c`, `sdram_i`, `sdram_p`.
    pub fn measure_volts(&self, component: &str) -> Result<String> {
        self.query(&["measure_volts", component])
    }
}

/// Extract degrees Celsius from `temp=48.3'C`.
pub fn parse_temperature(response: &str) -> Option<f64> {
    parse_value(response, "temp=", &["'C", "C"])
}

/// Extract volts from `volt=0.8563V`.
pub fn parse_core_volts(response: &str) -> Option<f64> {
    parse_value(response, "volt=", &["V"])
}

fn parse_value(response: &str, key: &str, units: &[&str]) -> Option<f64> {
    let value = response.trim().strip_prefix(key)?;
    let number = units
        .iter()
        .find_map(|unit| value.strip_suffix(unit))
        .unwrap_or(value);
    number.trim().parse::<f64>().ok()
}

/// Write an executable shell script `name` into `dir` for use as a stand-in tool.
#[cfg(all(test, unix))]
pub(crate) fn write_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
