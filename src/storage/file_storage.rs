use crate::{error::Result, storage::Storage};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Everything but `[A-Za-z0-9_-]` is escaped, `%` included, so distinct keys
/// never share a file
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// File-based storage: one JSON file per key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANBAN_DIR: &'static str = ".kanban";

    /// Creates a FileStorage rooted in `.kanban` under the given directory
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn entry_file(&self, key: &str) -> PathBuf {
        let name = utf8_percent_encode(key, KEY_ENCODE_SET);
        self.root_path.join(format!("{}.json", name))
    }

    fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_file(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_directory_exists()?;
        fs::write(self.entry_file(key), value)?;
        Ok(())
    }
}
