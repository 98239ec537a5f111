use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::dat::{DatFile, Document, section_name};
use crate::layout::FileLayout;

use super::error::{CoreError, CoreErrorCode};
use super::types::{RecordEdit, RecordEntry, SectionSummary, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug)]
pub struct Session {
    dat: DatFile,
    layout: FileLayout,
    snapshot: Snapshot,
    modified: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let doc = Document::parse_with_layout(bytes.as_ref()).map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("failed to decode input: {e}"))
        })?;
        let (dat, layout) = doc.into_parts();
        Ok(Session::new(dat, layout))
    }

    /// Strict open: a missing or unreadable file is an error.
    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> Result<Session, CoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        self.open_bytes(bytes)
    }

    /// Lenient open: a missing or unreadable file gives an empty session.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Session {
        let path = path.as_ref();
        match self.open_path(path) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "starting from an empty file");
                Session::new(DatFile::empty(), FileLayout::default())
            }
        }
    }
}

impl Session {
    fn new(dat: DatFile, layout: FileLayout) -> Self {
        let snapshot = build_snapshot(&dat);
        Self {
            dat,
            layout,
            snapshot,
            modified: false,
        }
    }

    pub fn dat(&self) -> &DatFile {
        &self.dat
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Byte layout of the input as it was loaded; edits do not update it.
    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn section_records(&self, section: usize) -> Result<Vec<RecordEntry>, CoreError> {
        let found = self.dat.section(section).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::InvalidIndex,
                format!(
                    "invalid section index {section}, file holds {} sections",
                    self.dat.section_count()
                ),
            )
        })?;

        Ok(found
            .iter()
            .enumerate()
            .map(|(position, record)| RecordEntry {
                position,
                id: record.id,
                category: record.category,
            })
            .collect())
    }

    pub fn set_record(
        &mut self,
        section: usize,
        position: usize,
        id: u16,
        category: u16,
    ) -> Result<(), CoreError> {
        self.dat
            .set_record_fields(section, position, id, category)
            .map_err(|e| edit_error("set record", e))?;
        self.mark_modified();
        Ok(())
    }

    pub fn insert_record_after(
        &mut self,
        section: usize,
        position: usize,
    ) -> Result<usize, CoreError> {
        let inserted = self
            .dat
            .insert_record_after(section, position)
            .map_err(|e| edit_error("insert record", e))?;
        self.mark_modified();
        Ok(inserted)
    }

    pub fn delete_record(&mut self, section: usize, position: usize) -> Result<(), CoreError> {
        self.dat
            .delete_record(section, position)
            .map_err(|e| edit_error("delete record", e))?;
        self.mark_modified();
        Ok(())
    }

    pub fn apply(&mut self, edit: RecordEdit) -> Result<(), CoreError> {
        match edit {
            RecordEdit::Set {
                section,
                position,
                id,
                category,
            } => self.set_record(section, position, id, category),
            RecordEdit::InsertAfter { section, position } => {
                self.insert_record_after(section, position).map(|_| ())
            }
            RecordEdit::Delete { section, position } => self.delete_record(section, position),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.dat.to_bytes().map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("failed to encode file: {e}"))
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let path = path.as_ref();
        self.dat.save(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", path.display()),
            )
        })
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.snapshot = build_snapshot(&self.dat);
    }
}

fn edit_error(action: &str, e: io::Error) -> CoreError {
    let code = match e.kind() {
        io::ErrorKind::InvalidInput => CoreErrorCode::InvalidIndex,
        _ => CoreErrorCode::Io,
    };
    CoreError::new(code, format!("failed to {action}: {e}"))
}

fn build_snapshot(dat: &DatFile) -> Snapshot {
    let sections = dat
        .sections()
        .iter()
        .enumerate()
        .map(|(index, section)| SectionSummary {
            index,
            name: section_name(index).map(str::to_string),
            record_count: section.len(),
        })
        .collect();

    Snapshot {
        section_count: dat.section_count(),
        record_count: dat.record_count(),
        trailing_len: dat.trailing().len(),
        sections,
    }
}
