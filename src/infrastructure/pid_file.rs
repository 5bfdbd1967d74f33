use crate::domain::errors::LifecycleError;
use std::fs;
use std::path::PathBuf;

/// PID file convention shared with the original shell scripts: a single
/// decimal PID, nothing else. A present file whose process is gone is
/// "stale" and safe to clear.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Reads the recorded PID, `None` when the file does not exist.
    pub fn read(&self) -> Result<Option<u32>, LifecycleError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LifecycleError::BadPidFile {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let pid = content
            .trim()
            .parse::<u32>()
            .map_err(|_| LifecycleError::BadPidFile {
                path: self.path.clone(),
                reason: format!("not a PID: {:?}", content.trim()),
            })?;

        Ok(Some(pid))
    }

    pub fn write(&self, pid: u32) -> Result<(), LifecycleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LifecycleError::BadPidFile {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        }
        fs::write(&self.path, format!("{}\n", pid)).map_err(|e| LifecycleError::BadPidFile {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn clear(&self) -> Result<(), LifecycleError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LifecycleError::BadPidFile {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("flowaictl-pidfile-{}-{}", name, std::process::id()))
            .join("bot.pid")
    }

    #[test]
    fn test_read_missing_is_none() {
        let pf = PidFile::new(scratch("missing"));
        assert_eq!(pf.read().unwrap(), None);
    }

    #[test]
    fn test_write_read_clear() {
        let pf = PidFile::new(scratch("rw"));
        pf.write(4321).unwrap();
        assert_eq!(pf.read().unwrap(), Some(4321));
        pf.clear().unwrap();
        assert_eq!(pf.read().unwrap(), None);
        // Clearing twice is fine
        pf.clear().unwrap();
        let _ = fs::remove_dir_all(pf.path().parent().unwrap());
    }

    #[test]
    fn test_garbage_content_is_an_error() {
        let pf = PidFile::new(scratch("garbage"));
        fs::create_dir_all(pf.path().parent().unwrap()).unwrap();
        fs::write(pf.path(), "not-a-pid\n").unwrap();

        let err = pf.read().unwrap_err();
        assert!(err.to_string().contains("not-a-pid"));
        let _ = fs::remove_dir_all(pf.path().parent().unwrap());
    }
}
