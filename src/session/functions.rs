//! The impls and functions
//!
use std::{fs, path::{Path, PathBuf}, sync::{Arc, PoisonError}};
use log::*;
use anyhow::{Context, Result};
use crate::growth::PeakTable;
use crate::session::{FileSessionStore, MemorySessionStore, ObserverGuard, ObserverLocks, SessionStore};

impl MemorySessionStore {
    pub fn new() -> Self { Default::default() }
}

impl SessionStore for MemorySessionStore {
    fn load_peaks(&self, observer_id: &str) -> Result<PeakTable> {
        Ok(self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(observer_id)
            .cloned()
            .unwrap_or_default())
    }
    fn save_peaks(&self, observer_id: &str, peaks: PeakTable) -> Result<()> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(observer_id.to_string(), peaks);
        Ok(())
    }
}

impl FileSessionStore {
    /// Create the store, and the directory if it doesn't exist.
    pub fn new(
        directory: &Path,
    ) -> Result<Self>
    {
        fs::create_dir_all(directory)
            .with_context(|| format!("Cannot create directory: {}", directory.display()))?;
        Ok(FileSessionStore { directory: directory.to_path_buf() })
    }
    fn session_file(
        &self,
        observer_id: &str,
    ) -> Result<PathBuf>
    {
        if !is_valid_observer_id(observer_id)
        {
            anyhow::bail!("Invalid observer id: {:?}", observer_id);
        }
        Ok(self.directory.join(format!("{}.{}", observer_id, "json")))
    }
}

impl SessionStore for FileSessionStore {
    fn load_peaks(&self, observer_id: &str) -> Result<PeakTable> {
        let filepath = self.session_file(observer_id)?;
        if !filepath.exists()
        {
            debug!("no session file for observer {}, starting empty", observer_id);
            return Ok(PeakTable::new());
        }
        let read_from_file = fs::read_to_string(&filepath)
            .with_context(|| format!("Error reading session: {}", filepath.display()))?;
        // A broken session would otherwise fail every request of an observer that keeps its cookie.
        match serde_json::from_str(&read_from_file) {
            Ok(peaks) => Ok(peaks),
            Err(e) => {
                warn!("Json deserialization error: {}: {}, starting empty", filepath.display(), e);
                Ok(PeakTable::new())
            }
        }
    }
    /// The peaks are written to `<observer_id>.json.tmp` first, and then renamed over the session file,
    /// so the session file is never partially written.
    fn save_peaks(&self, observer_id: &str, peaks: PeakTable) -> Result<()> {
        let filepath = self.session_file(observer_id)?;
        let temporary_filepath = self.directory.join(format!("{}.{}", observer_id, "json.tmp"));
        fs::write(&temporary_filepath, serde_json::to_string(&peaks)
            .with_context(|| "Json serialization error")?
        ).with_context(|| format!("Error saving session: {}", temporary_filepath.display()))?;
        fs::rename(&temporary_filepath, &filepath)
            .with_context(|| format!("Error renaming {} to {}", temporary_filepath.display(), filepath.display()))?;
        Ok(())
    }
}

/// Observer ids end up in file names, so only ascii alphanumerics, `-` and `_` are accepted.
pub fn is_valid_observer_id(
    observer_id: &str,
) -> bool
{
    !observer_id.is_empty()
        && observer_id.len() <= 128
        && observer_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl ObserverLocks {
    pub fn new() -> Self { Default::default() }
    /// Wait for the lock of `observer_id`. The lock is released when the guard is dropped.
    pub async fn lock(
        &self,
        observer_id: &str,
    ) -> ObserverGuard<'_>
    {
        let observer_lock = self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(observer_id.to_string())
            .or_default()
            .clone();
        ObserverGuard {
            locks: self,
            observer_id: observer_id.to_string(),
            guard: Some(observer_lock.lock_owned().await),
        }
    }
    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for ObserverGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters hold a clone, so a count of 1 means only the map refers to the lock.
        if locks.get(&self.observer_id).map_or(false, |observer_lock| Arc::strong_count(observer_lock) == 1)
        {
            locks.remove(&self.observer_id);
        }
    }
}
