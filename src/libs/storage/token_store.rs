use crate::libs::storage::records::TokenPair;
use crate::libs::storage::storage_traits::{StoreError, TokenStore};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Keeps the access token as a single `token:secret` line in a per-user file,
/// readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token file");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        TokenPair::from_line(&contents)
            .map(Some)
            .ok_or_else(|| StoreError::MalformedToken(self.path.display().to_string()))
    }

    fn save(&self, token: &TokenPair) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut staged = NamedTempFile::new_in(parent)?;
        restrict_to_owner(staged.as_file())?;
        staged.write_all(token.to_line().as_bytes())?;
        staged.persist(&self.path).map_err(|err| StoreError::Io(err.error))?;
        info!(path = %self.path.display(), "Saved access token");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_to_owner(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
