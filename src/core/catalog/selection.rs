// ─── File Selection ───
// Filters applied to every listed file and the "newest wins" choice among
// the survivors. Kept free of I/O so the policy is testable on its own.

use super::types::{CandidateFile, ReleaseChannel};

/// Eligibility rules for one resolution request.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub channel: ReleaseChannel,
    /// Exact membership in the file's game version list.
    pub game_version: Option<String>,
    /// Case-insensitive substring of file name or display name.
    pub partial: Option<String>,
}

impl FileFilter {
    pub fn new(channel: ReleaseChannel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }

    pub fn with_game_version(mut self, version: Option<String>) -> Self {
        self.game_version = version.filter(|v| !v.is_empty());
        self
    }

    pub fn with_partial(mut self, partial: Option<String>) -> Self {
        self.partial = partial.filter(|p| !p.is_empty());
        self
    }

    /// Order: availability, release type, game version, partial name.
    pub fn matches(&self, file: &CandidateFile) -> bool {
        if !file.is_available {
            return false;
        }
        if !self.channel.allows(file.release_type) {
            return false;
        }
        if let Some(version) = &self.game_version {
            if !file.game_versions.iter().any(|v| v == version) {
                return false;
            }
        }
        if let Some(partial) = &self.partial {
            let needle = partial.to_lowercase();
            return file.file_name.to_lowercase().contains(&needle)
                || file.display_name.to_lowercase().contains(&needle);
        }
        true
    }
}

/// Running "best so far" across a paginated scan.
#[derive(Debug)]
pub struct BestFileSelector<'a> {
    filter: &'a FileFilter,
    best: Option<CandidateFile>,
}

impl<'a> BestFileSelector<'a> {
    pub fn new(filter: &'a FileFilter) -> Self {
        Self { filter, best: None }
    }

    /// Consider one file. Equal dates replace the current best, so the
    /// last one seen in scan order wins a tie.
    pub fn offer(&mut self, file: &CandidateFile) {
        if !self.filter.matches(file) {
            return;
        }
        let newer = match &self.best {
            Some(best) => file.file_date >= best.file_date,
            None => true,
        };
        if newer {
            self.best = Some(file.clone());
        }
    }

    pub fn finish(self) -> Option<CandidateFile> {
        self.best
    }
}
