//! Device facts embedded in failure diagnostics

use sai_shell::{Shell, ShellCommand};
use tracing::debug;

/// Placeholder for facts the device did not report
pub const UNKNOWN_VALUE: &str = "???";

/// Properties that reveal a vendor skin, with its display name
const OEM_SKIN_PROPERTIES: &[(&str, &str)] = &[
    ("ro.miui.ui.version.name", "MIUI"),
    ("ro.build.version.emui", "EMUI"),
    ("ro.build.version.oneui", "One UI"),
];

/// What the device says about itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub brand: String,
    pub model: String,
    pub os_version: String,
    /// Vendor skin name, `None` for a stock build
    pub oem_skin: Option<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

impl DeviceInfo {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            brand: UNKNOWN_VALUE.to_string(),
            model: UNKNOWN_VALUE.to_string(),
            os_version: UNKNOWN_VALUE.to_string(),
            oem_skin: None,
        }
    }

    /// Read the device properties through `getprop`.
    ///
    /// Never fails; anything that cannot be read becomes [`UNKNOWN_VALUE`].
    pub async fn probe(shell: &dyn Shell) -> Self {
        let brand = getprop(shell, "ro.product.brand").await;
        let model = getprop(shell, "ro.product.model").await;
        let os_version = getprop(shell, "ro.build.version.release").await;

        let mut oem_skin = None;
        for (property, skin) in OEM_SKIN_PROPERTIES {
            if getprop(shell, property).await.is_some() {
                oem_skin = Some((*skin).to_string());
                break;
            }
        }

        Self {
            brand: brand.unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
            model: model.unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
            os_version: os_version.unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
            oem_skin,
        }
    }

    #[must_use]
    pub fn oem_flag(&self) -> &str {
        self.oem_skin.as_deref().unwrap_or("No OEM skin")
    }

    /// One-line environment summary for diagnostics:
    /// `<label>: <brand> <model> | <oem> | Android <version> | <tag>`
    #[must_use]
    pub fn summary(&self, device_label: &str, tag: &str) -> String {
        format!(
            "{device_label}: {} {} | {} | Android {} | {tag}",
            self.brand,
            self.model,
            self.oem_flag(),
            self.os_version
        )
    }
}

/// Tag naming the package source and this build
#[must_use]
pub fn source_tag(source_implementation: &str, app_version: &str) -> String {
    format!("Using {source_implementation} package source | {app_version}")
}

async fn getprop(shell: &dyn Shell, property: &str) -> Option<String> {
    let command = ShellCommand::new("getprop", [property]);
    match shell.exec(&command, None).await {
        Ok(result) if result.is_successful() => {
            let value = result.out().trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        Ok(result) => {
            debug!(property, exit_code = result.exit_code(), "getprop failed");
            None
        }
        Err(e) => {
            debug!(property, error = %e, "getprop could not run");
            None
        }
    }
}
