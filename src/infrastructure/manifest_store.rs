use crate::domain::manifest::Manifest;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// JSON persistence for the install manifest.
pub struct ManifestStore {
    file_path: PathBuf,
}

impl ManifestStore {
    /// `state_dir` is the manager's dot-directory inside the install tree.
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            file_path: state_dir.join("manifest.json"),
        }
    }

    pub fn load(&self) -> Result<Option<Manifest>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.file_path).context("Failed to read install manifest")?;
        let manifest: Manifest =
            serde_json::from_str(&content).context("Failed to parse install manifest JSON")?;

        Ok(Some(manifest))
    }

    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create manager state directory")?;
        }

        let content =
            serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp manifest file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename manifest file")?;

        info!("Saved install manifest to {:?}", self.file_path);
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove install manifest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::manifest::Backend;

    #[test]
    fn test_save_load_remove() {
        let dir = std::env::temp_dir().join(format!("flowaictl-manifest-{}", std::process::id()));
        let store = ManifestStore::new(dir.clone());

        assert!(store.load().unwrap().is_none());

        let mut manifest = Manifest::new(
            "https://example.com/bot.git".into(),
            "main".into(),
            "Python 3.11.2".into(),
            Backend::Background,
        );
        manifest.record_step("clone");
        store.save(&manifest).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.install_id, manifest.install_id);
        assert_eq!(loaded.completed_steps, vec!["clone"]);

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
