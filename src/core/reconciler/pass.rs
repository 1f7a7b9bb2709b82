// ─── Reconciliation Pass ───
// Drives one install pass over a reference blob:
//   parse -> (slug lookup) -> resolve -> skip if installed -> install -> record
// Each reference fails independently; the manifest is saved once at the end.

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::report::ReconcileReport;
use crate::core::catalog::{CandidateFile, CatalogApi, FileFilter, ReleaseChannel};
use crate::core::error::{ModError, ModResult};
use crate::core::installer::publish::remove_entry;
use crate::core::installer::{ModInstaller, StorageLayout};
use crate::core::manifest::{Manifest, ManifestStore};
use crate::core::reference::{expand_references, ModReference, ModSelector};

/// How references without a pinned file are resolved.
#[derive(Debug, Clone, Default)]
pub struct ResolutionPolicy {
    pub channel: ReleaseChannel,
    pub game_version: Option<String>,
    /// When false, an installed reference is kept without asking the catalog.
    pub auto_update: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Remove manifest entries not referenced in this pass.
    pub prune: bool,
    /// Turn any per-reference failure into a pass-level error.
    pub fail_on_error: bool,
}

enum Outcome {
    Installed,
    Unchanged,
}

/// Owns the manifest for the duration of a pass.
pub struct Reconciler<C> {
    catalog: C,
    installer: ModInstaller,
    store: ManifestStore,
    policy: ResolutionPolicy,
}

impl<C: CatalogApi> Reconciler<C> {
    pub fn new(catalog: C, installer: ModInstaller, policy: ResolutionPolicy) -> Self {
        let store = ManifestStore::new(installer.layout().manifest_path());
        Self {
            catalog,
            installer,
            store,
            policy,
        }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn layout(&self) -> &StorageLayout {
        self.installer.layout()
    }

    /// Run one pass over `input`.
    ///
    /// Per-reference failures are logged and tallied; the pass keeps going.
    /// Returns `Err(Failures)` only when `fail_on_error` is set and at least
    /// one reference failed, after the manifest has been saved.
    pub async fn reconcile(
        &self,
        input: &str,
        options: ReconcileOptions,
    ) -> ModResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        if input.trim().is_empty() {
            info!("No CurseForge mods configured");
            return Ok(report);
        }

        self.installer.layout().ensure_dirs().await?;
        let mut manifest = self.store.load().await;
        let mut desired = BTreeSet::new();

        let expanded = expand_references(input).await;
        for (line, error) in &expanded.unreadable {
            warn!("Cannot expand {}: {}", line, error);
            report.record_failure(line, error);
        }

        for raw in &expanded.references {
            info!("Processing mod: {}", raw);
            match self.process(&mut manifest, &mut desired, raw).await {
                Ok(Outcome::Installed) => {
                    info!("{}: installed", raw);
                    report.installed.push(raw.clone());
                }
                Ok(Outcome::Unchanged) => {
                    info!("{}: already installed", raw);
                    report.unchanged.push(raw.clone());
                }
                Err(e) => {
                    warn!("{}: {}", raw, e);
                    report.record_failure(raw, &e);
                }
            }
        }

        if options.prune {
            report.pruned = self.prune(&mut manifest, &desired).await;
        }

        if let Err(e) = self.store.save(&mut manifest).await {
            warn!("{}", e);
            return Err(e);
        }

        info!(
            "Mods: {} installed, {} unchanged, {} pruned, {} failed",
            report.installed.len(),
            report.unchanged.len(),
            report.pruned.len(),
            report.failed.len()
        );
        for failed in &report.failed {
            warn!("Failed: {} ({})", failed.reference, failed.reason);
        }

        if options.fail_on_error && report.has_failures() {
            return Err(report.failure_error());
        }
        Ok(report)
    }

    async fn process(
        &self,
        manifest: &mut Manifest,
        desired: &mut BTreeSet<String>,
        raw: &str,
    ) -> ModResult<Outcome> {
        let reference = ModReference::parse(raw)?;

        if !self.policy.auto_update {
            if let Some(key) = self.kept_without_update(manifest, raw).await {
                desired.insert(key);
                return Ok(Outcome::Unchanged);
            }
        }

        let (mod_id, pinned) = match self.identify(&reference).await {
            Ok(found) => found,
            Err(e) => {
                // Keep entries this slug installed earlier out of pruning.
                desired.extend(keys_for_identifier(manifest, &reference.identifier));
                return Err(e);
            }
        };

        let key = mod_id.to_string();
        desired.insert(key.clone());

        // Record the desire now; a failed resolve keeps the old install.
        let mut entry = manifest.mods.remove(&key).unwrap_or_default();
        entry.reference = raw.to_string();
        manifest.mods.insert(key.clone(), entry.clone());

        let file = match pinned {
            Some(file) => file,
            None => self.resolve(mod_id, &reference).await?,
        };

        if entry.is_installed_as(file.id) {
            if let Some(installed) = &entry.installed {
                let visible = self.installer.layout().visible_path(&installed.path);
                if tokio::fs::try_exists(&visible).await.unwrap_or(false) {
                    return Ok(Outcome::Unchanged);
                }
            }
        }

        let updated = self
            .installer
            .install(&self.catalog, mod_id, &file, entry)
            .await?;
        manifest.mods.insert(key, updated);
        Ok(Outcome::Installed)
    }

    /// Numeric mod id for `reference`. A slug pinned to a file is identified
    /// through the file lookup itself, which is handed back as well.
    async fn identify(
        &self,
        reference: &ModReference,
    ) -> ModResult<(u64, Option<CandidateFile>)> {
        if let Some(id) = reference.mod_id() {
            return Ok((id, None));
        }

        if let Some(file_id) = reference.file_id() {
            let file = self.catalog.get_file(None, file_id).await?;
            let mod_id = file
                .mod_id
                .ok_or_else(|| ModError::NotFound(format!("owning mod of file {file_id}")))?;
            info!("Resolved '{}' to mod ID {} via file {}", reference.identifier, mod_id, file_id);
            return Ok((mod_id, Some(file)));
        }

        let id = self.catalog.resolve_slug(&reference.identifier).await?;
        info!("Resolved '{}' to mod ID {}", reference.identifier, id);
        Ok((id, None))
    }

    async fn resolve(&self, mod_id: u64, reference: &ModReference) -> ModResult<CandidateFile> {
        match &reference.selector {
            ModSelector::File(file_id) => self.catalog.get_file(Some(mod_id), *file_id).await,
            ModSelector::Partial(partial) => {
                let filter = self.filter().with_partial(Some(partial.clone()));
                self.catalog.resolve_best_file(mod_id, &filter).await
            }
            ModSelector::Latest => {
                self.catalog
                    .resolve_best_file(mod_id, &self.filter())
                    .await
            }
        }
    }

    fn filter(&self) -> FileFilter {
        FileFilter::new(self.policy.channel).with_game_version(self.policy.game_version.clone())
    }

    /// With auto-update off, an entry recorded for this exact reference
    /// whose visible file is still present satisfies it.
    async fn kept_without_update(&self, manifest: &Manifest, raw: &str) -> Option<String> {
        let (key, entry) = manifest.find_by_reference(raw)?;
        let installed = entry.installed.as_ref()?;
        let visible = self.installer.layout().visible_path(&installed.path);
        if tokio::fs::try_exists(&visible).await.unwrap_or(false) {
            Some(key.clone())
        } else {
            None
        }
    }

    /// Drop every entry not in `desired`, unlinking its visible file and
    /// removing its store directory. Returns the removed keys.
    async fn prune(&self, manifest: &mut Manifest, desired: &BTreeSet<String>) -> Vec<String> {
        let layout = self.installer.layout();
        let stale: Vec<String> = manifest
            .mods
            .keys()
            .filter(|key| !desired.contains(*key))
            .cloned()
            .collect();

        let mut pruned = Vec::new();
        for key in stale {
            let Some(entry) = manifest.mods.get(&key) else {
                continue;
            };

            if let Some(installed) = &entry.installed {
                let visible = layout.visible_path(&installed.path);
                if let Err(e) = remove_entry(&visible).await {
                    warn!("Cannot unlink {:?}, keeping mod {}: {}", visible, key, e);
                    continue;
                }
            }

            // Keys double as directory names; only plain ids are trusted.
            if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
                let store_dir = layout.mod_store_dir(&key);
                if let Err(e) = remove_entry(&store_dir).await {
                    warn!("Cannot remove {:?}: {}", store_dir, e);
                }
            }

            manifest.mods.remove(&key);
            info!("Pruned mod {}", key);
            pruned.push(key);
        }
        pruned
    }
}

/// Manifest keys whose recorded reference names `identifier`.
fn keys_for_identifier(manifest: &Manifest, identifier: &str) -> Vec<String> {
    manifest
        .mods
        .iter()
        .filter(|(_, entry)| {
            ModReference::parse(&entry.reference)
                .map(|r| r.identifier.eq_ignore_ascii_case(identifier))
                .unwrap_or(false)
        })
        .map(|(key, _)| key.clone())
        .collect()
}
