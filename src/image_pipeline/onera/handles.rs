//! The `.ent`/`.dat` file handle pair owned by one codec instance.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::debug;

use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::header::{data_path, header_path, require_file_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create or truncate, then read and write.
    Create,
    /// Read and write an existing file in place.
    Update,
}

impl OpenMode {
    fn writable(self) -> bool {
        matches!(self, OpenMode::Create | OpenMode::Update)
    }

    /// Whether a handle opened as `self` can serve a `requested` access.
    fn serves(self, requested: OpenMode) -> bool {
        match requested {
            OpenMode::Read => true,
            OpenMode::Update => self.writable(),
            OpenMode::Create => false,
        }
    }
}

#[derive(Debug)]
struct OpenFile {
    file: File,
    mode: OpenMode,
}

/// At most one open handle per file. Opening a file again always closes the
/// previous handle first; dropping the pair closes both.
#[derive(Debug, Default)]
pub struct FileHandlePair {
    header: Option<OpenFile>,
    data: Option<OpenFile>,
}

impl FileHandlePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_header(&mut self, path: &Path, mode: OpenMode) -> Result<&mut File> {
        require_file_name(path)?;
        self.header = None;
        let file = open(&header_path(path), mode)?;
        Ok(&mut self.header.insert(OpenFile { file, mode }).file)
    }

    pub fn open_data(&mut self, path: &Path, mode: OpenMode) -> Result<&mut File> {
        require_file_name(path)?;
        self.data = None;
        let file = open(&data_path(path), mode)?;
        Ok(&mut self.data.insert(OpenFile { file, mode }).file)
    }

    /// The data handle, reopened only when the open one cannot serve `mode`.
    /// A writable handle also serves reads; `Create` always reopens.
    pub fn data_for(&mut self, path: &Path, mode: OpenMode) -> Result<&mut File> {
        let reusable = match &self.data {
            Some(open) => open.mode.serves(mode),
            None => false,
        };
        if !reusable {
            self.open_data(path, mode)?;
        }
        self.data
            .as_mut()
            .map(|open| &mut open.file)
            .ok_or_else(|| OneraError::InvalidState("data file is not open".to_string()))
    }

    /// Both handles, if both are open.
    pub fn pair_mut(&mut self) -> Option<(&mut File, &mut File)> {
        match (self.header.as_mut(), self.data.as_mut()) {
            (Some(header), Some(data)) => Some((&mut header.file, &mut data.file)),
            _ => None,
        }
    }

    pub fn data_mode(&self) -> Option<OpenMode> {
        self.data.as_ref().map(|open| open.mode)
    }

    pub fn is_header_open(&self) -> bool {
        self.header.is_some()
    }

    pub fn is_data_open(&self) -> bool {
        self.data.is_some()
    }

    /// Syncs the data file if it is writable.
    pub fn sync_data(&self) -> Result<()> {
        if let Some(open) = &self.data {
            if open.mode.writable() {
                open.file.sync_all()?;
            }
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.header.is_some() || self.data.is_some() {
            debug!("Closing ONERA file handles");
        }
        self.header = None;
        self.data = None;
    }
}

fn open(path: &Path, mode: OpenMode) -> Result<File> {
    let mut options = OpenOptions::new();
    match mode {
        OpenMode::Read => options.read(true),
        OpenMode::Create => options.read(true).write(true).create(true).truncate(true),
        OpenMode::Update => options.read(true).write(true),
    };

    options.open(path).map_err(|source| OneraError::Open {
        path: path.to_path_buf(),
        source,
    })
}
