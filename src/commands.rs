use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::settings::KEY_MODS;
use crate::core::config::{ConfigValues, ModsSettings};
use crate::core::error::ModResult;
use crate::core::installer::StorageLayout;
use crate::core::manager::{installed_mods, ModsManager};
use crate::core::manifest::ManifestEntry;
use crate::core::reconciler::ReconcileReport;

/// Directories an invocation works on.
#[derive(Debug, Clone)]
pub struct ModDirs {
    pub mods_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl ModDirs {
    /// `./mods` and `<platform data dir>/gamekeeper` unless overridden.
    pub fn resolve(mods_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gamekeeper")
        });
        Self {
            mods_dir: mods_dir.unwrap_or_else(|| PathBuf::from("mods")),
            data_dir,
        }
    }
}

#[derive(Debug, Default)]
pub struct InstallRequest {
    /// References from the command line; empty means `CURSEFORGE_MODS`.
    pub references: Vec<String>,
    pub config: Option<PathBuf>,
    pub prune: bool,
    pub fail_on_error: bool,
}

#[derive(Debug, Serialize)]
pub struct InstalledModInfo {
    pub mod_id: String,
    pub reference: String,
    pub file_id: u64,
    pub file_name: Option<String>,
    pub path: String,
    pub installed_at: Option<String>,
}

impl InstalledModInfo {
    fn from_entry(mod_id: String, entry: ManifestEntry) -> Option<Self> {
        let installed = entry.installed?;
        Some(Self {
            mod_id,
            reference: entry.reference,
            file_id: installed.file_id,
            file_name: entry.resolved.map(|r| r.file_name),
            path: installed.path,
            installed_at: chrono::DateTime::from_timestamp(installed.installed_at_epoch, 0)
                .map(|t| t.to_rfc3339()),
        })
    }
}

/// Reconcile the mods directory against the requested references.
pub async fn install_mods(dirs: &ModDirs, request: InstallRequest) -> ModResult<ReconcileReport> {
    let values = ConfigValues::load(request.config.as_deref())?;

    let mut settings = ModsSettings::from_values(&values);
    settings.prune |= request.prune;
    settings.fail_on_error |= request.fail_on_error;

    let blob = if request.references.is_empty() {
        values.get_string(KEY_MODS, "")
    } else {
        request.references.join("\n")
    };
    if blob.trim().is_empty() {
        info!("No CurseForge mods configured");
        return Ok(ReconcileReport::default());
    }

    let manager = ModsManager::new(settings, &dirs.mods_dir, &dirs.data_dir).await?;
    manager.install_all(&blob).await
}

pub async fn list_installed_mods(dirs: &ModDirs) -> Vec<InstalledModInfo> {
    let layout = StorageLayout::new(&dirs.mods_dir, &dirs.data_dir);
    installed_mods(&layout)
        .await
        .into_iter()
        .filter_map(|(id, entry)| InstalledModInfo::from_entry(id, entry))
        .collect()
}

/// Warn about visible entries that went missing since the last pass.
pub fn report_missing(dirs: &ModDirs, mods: &[InstalledModInfo]) {
    for info in mods {
        if !dirs.mods_dir.join(&info.path).exists() {
            warn!(
                "{} ({}) is recorded but missing from {:?}",
                info.path, info.reference, dirs.mods_dir
            );
        }
    }
}
