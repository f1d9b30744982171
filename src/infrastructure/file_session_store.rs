// File-backed session store
use crate::application::session_store::SessionStore;
use crate::domain::session::Session;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps token, username and role together in one TOML file.
///
/// Saving writes a sibling temp file and renames it into place; clearing
/// removes the file. Either way readers see the whole session or none of it.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Session {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Session::default(),
            Err(e) => {
                tracing::warn!("Failed to read session file {:?}: {}", self.path, e);
                return Session::default();
            }
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable session file {:?}: {}", self.path, e);
            Session::default()
        })
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create session directory {:?}", dir))?;
        }

        let content = toml::to_string_pretty(session).context("Failed to serialize session")?;
        let temp = self.temp_path();
        fs::write(&temp, content).with_context(|| format!("Failed to write {:?}", temp))?;
        restrict_permissions(&temp)?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to move session into {:?}", self.path))?;

        tracing::debug!("Session saved to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Session file {:?} removed", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove session file {:?}", self.path)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {:?}", path))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
