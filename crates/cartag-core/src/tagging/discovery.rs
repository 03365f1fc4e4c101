//! Finding car photos to tag.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;

/// Discovers image files under a directory.
pub struct ImageDiscovery {
    config: DiscoveryConfig,
}

impl ImageDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Find supported images at a path.
    ///
    /// A file is returned as-is if its extension is supported. A directory is
    /// walked recursively; results are sorted by path and capped at
    /// `max_images_per_dir` (0 = no cap).
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            return if self.is_supported(path) {
                vec![path.to_path_buf()]
            } else {
                vec![]
            };
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();

        let limit = self.config.max_images_per_dir;
        if limit > 0 && files.len() > limit {
            tracing::info!(
                "Limiting {:?} to {} of {} images",
                path,
                limit,
                files.len()
            );
            files.truncate(limit);
        }
        files
    }

    /// Check if a file has a supported extension (case-insensitive).
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
