//! Directory-backed command store
//!
//! One file per command at `<root>/<id>.md`. The store is a plain handle
//! around the directory; every operation is a single read, write or unlink.

use crate::error::{Result, StoreError};
use crate::record::{self, CommandDefinition};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const EXTENSION: &str = "md";

/// One row of [`CommandStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    pub id: String,
    /// Primary phrase, or the id with spaces if the file has no usable aliases
    pub phrase: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub modified: Option<String>,
}

impl CommandSummary {
    /// Summarize raw file contents; never fails
    pub fn from_content(id: &str, content: &str, modified: Option<String>) -> Self {
        let header = record::parse_header(content);
        Self {
            id: id.to_string(),
            phrase: header.primary_phrase_or(id),
            aliases: header.extra_aliases(),
            description: header.description_or_default().to_string(),
            modified,
        }
    }
}

/// Handle to a command directory
#[derive(Debug, Clone)]
pub struct CommandStore {
    root: PathBuf,
}

impl CommandStore {
    /// Open a store, creating the directory if it doesn't exist
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        debug!(root = %root.display(), "opened command store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a record with this id lives in
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, EXTENSION))
    }

    /// Validate the four form fields and write the command
    ///
    /// Silently replaces any existing command with the same id.
    pub fn create(
        &self,
        phrase: &str,
        action: &str,
        description: &str,
        aliases_csv: &str,
    ) -> Result<String> {
        let definition = CommandDefinition::from_input(phrase, action, description, aliases_csv)?;
        self.save(&definition)
    }

    /// Write an already-validated definition, returning its id
    pub fn save(&self, definition: &CommandDefinition) -> Result<String> {
        let id = definition.id();
        if id.is_empty() {
            return Err(StoreError::Validation {
                field: "phrase",
                message: "phrase must contain at least one letter or digit".to_string(),
            });
        }
        let path = self.path_for(&id);
        if path.exists() {
            debug!(id = %id, "replacing existing command");
        }
        fs::write(&path, definition.render()).map_err(|e| StoreError::io(&path, e))?;
        info!(id = %id, phrases = definition.phrases().len(), "wrote command");
        Ok(id)
    }

    /// Summaries for every command file, sorted by id
    ///
    /// A file that can't be read or parsed is still listed, using the
    /// fallback phrase and description.
    pub fn list(&self) -> Result<Vec<CommandSummary>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let mut commands = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != EXTENSION).unwrap_or(true) {
                continue;
            }
            let id = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };

            let content = match fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable command file, listing with defaults");
                    String::new()
                }
            };

            commands.push(CommandSummary::from_content(&id, &content, modified_str(&path)));
        }

        commands.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(commands)
    }

    /// Full stored text of a command
    pub fn read(&self, id: &str) -> Result<String> {
        let path = self.existing_path(id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Remove a command; reports `NotFound` rather than succeeding silently
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.existing_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(id = %id, "deleted command");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    // Ids arrive from URLs and the command line; anything that could step
    // outside the root can't name a record.
    fn existing_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(path)
    }
}

/// Modification time as `YYYY-MM-DD HH:MM` (UTC)
fn modified_str(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let secs = modified.duration_since(std::time::UNIX_EPOCH).ok()?.as_secs();
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0)?;
    Some(dt.format("%Y-%m-%d %H:%M").to_string())
}
