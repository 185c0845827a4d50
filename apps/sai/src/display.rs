//! Rendering of command results

use std::io;

use serde_json::json;
use uuid::Uuid;

/// Result of `sai doctor`
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub backend: String,
    pub installer_name: String,
    pub installer_id: String,
    pub available: bool,
    pub reason: Option<String>,
    pub device_summary: String,
    pub config_path: Option<String>,
}

/// What a command produced
#[derive(Debug, Clone)]
pub enum CommandOutput {
    Installed { package: String, attempt_id: Uuid },
    Doctor(DoctorReport),
}

/// Prints command results as text or JSON
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    pub fn render_result(&self, output: &CommandOutput) -> io::Result<()> {
        if self.json_output {
            self.render_json(output)
        } else {
            self.render_text(output);
            Ok(())
        }
    }

    /// JSON failure document printed instead of the result
    pub fn render_failure(&self, message: &str, code: Option<&str>) -> io::Result<()> {
        let value = json!({ "success": false, "error": message, "code": code });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).map_err(io::Error::other)?
        );
        Ok(())
    }

    fn render_json(&self, output: &CommandOutput) -> io::Result<()> {
        let value = match output {
            CommandOutput::Installed {
                package,
                attempt_id,
            } => json!({
                "success": true,
                "package": package,
                "attempt_id": attempt_id.to_string(),
            }),
            CommandOutput::Doctor(report) => json!({
                "success": report.available,
                "backend": report.backend,
                "installer": report.installer_name,
                "installer_id": report.installer_id,
                "available": report.available,
                "reason": report.reason,
                "device": report.device_summary,
                "config": report.config_path,
            }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&value).map_err(io::Error::other)?
        );
        Ok(())
    }

    fn render_text(&self, output: &CommandOutput) {
        match output {
            CommandOutput::Installed { package, .. } => {
                println!("Successfully installed {package}");
            }
            CommandOutput::Doctor(report) => {
                println!("Backend:      {} ({})", report.backend, report.installer_name);
                println!("Installer id: {}", report.installer_id);
                match &report.reason {
                    None => println!("Shell:        available"),
                    Some(reason) => println!("Shell:        unavailable - {reason}"),
                }
                println!("Device:       {}", report.device_summary);
                if let Some(path) = &report.config_path {
                    println!("Config:       {path}");
                }
            }
        }
    }
}
