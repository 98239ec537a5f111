//! The `9999.dat` move-list file: up to [`SECTION_COUNT`] count-prefixed
//! record sections followed by a trailing blob that is carried through
//! untouched.

pub mod sections;
pub mod types;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::{FileLayout, SectionId};
use crate::reader::LittleEndianReader;
use crate::writer::LittleEndianWriter;
pub use sections::{Record, Section};
use sections::{emit_section, read_section};
pub use types::{
    DEFAULT_FILE_NAME, PADDED_SECTION_INDEX, SECTION_COUNT, SECTION_NAMES, SECTION_PADDING,
    section_label, section_name,
};

/// In-memory form of a `9999.dat` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatFile {
    sections: Vec<Section>,
    #[serde(skip)]
    trailing: Vec<u8>,
}

/// A decoded file together with the byte layout it was decoded from.
#[derive(Debug)]
pub struct Document {
    pub dat: DatFile,
    layout: FileLayout,
}

impl DatFile {
    pub fn new(sections: Vec<Section>, trailing: Vec<u8>) -> io::Result<Self> {
        if sections.len() > SECTION_COUNT {
            return Err(too_many_sections(sections.len()));
        }
        Ok(Self { sections, trailing })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode from any byte source. Never fails: a short or broken stream
    /// yields whatever complete sections came before the break.
    pub fn parse<R: Read>(reader: R) -> Self {
        let mut r = LittleEndianReader::new(reader);
        parse_internal(&mut r, None)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(bytes)
    }

    /// Open and decode `path`, reporting a failed open.
    pub fn load_checked<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::parse(BufReader::new(file)))
    }

    /// Open and decode `path`; an unopenable file gives an empty model.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_checked(path) {
            Ok(dat) => dat,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open file, starting empty");
                Self::empty()
            }
        }
    }

    /// Truncate-and-write `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }

    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut w = LittleEndianWriter::new(writer);
        for (index, section) in self.sections.iter().enumerate() {
            emit_section(&mut w, section)?;
            if index == PADDED_SECTION_INDEX {
                w.write_bytes(&SECTION_PADDING)?;
            }
        }
        w.write_bytes(&self.trailing)?;
        w.flush()
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn encoded_len(&self) -> usize {
        let padding = if self.sections.len() > PADDED_SECTION_INDEX {
            SECTION_PADDING.len()
        } else {
            0
        };
        self.sections.iter().map(Section::byte_len).sum::<usize>() + padding + self.trailing.len()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn record_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }

    pub fn push_section(&mut self, section: Section) -> io::Result<()> {
        if self.sections.len() >= SECTION_COUNT {
            return Err(too_many_sections(self.sections.len() + 1));
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn insert_record(&mut self, section: usize, position: usize, record: Record) -> io::Result<()> {
        self.checked_section_mut(section)?.insert(position, record)
    }

    pub fn insert_record_after(&mut self, section: usize, position: usize) -> io::Result<usize> {
        self.checked_section_mut(section)?.insert_after(position)
    }

    pub fn delete_record(&mut self, section: usize, position: usize) -> io::Result<Record> {
        self.checked_section_mut(section)?.remove(position)
    }

    pub fn set_record_fields(
        &mut self,
        section: usize,
        position: usize,
        id: u16,
        category: u16,
    ) -> io::Result<()> {
        self.checked_section_mut(section)?.set(position, id, category)
    }

    fn checked_section_mut(&mut self, index: usize) -> io::Result<&mut Section> {
        let count = self.sections.len();
        self.sections.get_mut(index).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid section index {index}, file holds {count} sections"),
            )
        })
    }
}

impl Document {
    pub fn parse_with_layout<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut layout = FileLayout {
            file_len: bytes.len(),
            sections: Vec::new(),
        };
        let mut r = LittleEndianReader::new(bytes.as_slice());
        let dat = parse_internal(&mut r, Some(&mut layout));

        let consumed = r.position() as usize;
        layout.push(SectionId::Truncated, consumed, bytes.len());
        layout.validate()?;

        Ok(Self { dat, layout })
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn into_parts(self) -> (DatFile, FileLayout) {
        (self.dat, self.layout)
    }
}

/// Free-function form of [`DatFile::load`].
pub fn load<P: AsRef<Path>>(path: P) -> DatFile {
    DatFile::load(path)
}

/// Free-function form of [`DatFile::load_checked`].
pub fn load_checked<P: AsRef<Path>>(path: P) -> io::Result<DatFile> {
    DatFile::load_checked(path)
}

/// Free-function form of [`DatFile::save`].
pub fn save<P: AsRef<Path>>(path: P, dat: &DatFile) -> io::Result<()> {
    dat.save(path)
}

fn too_many_sections(count: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{count} sections exceeds the limit of {SECTION_COUNT}"),
    )
}

fn parse_internal<R: Read>(
    r: &mut LittleEndianReader<R>,
    mut layout: Option<&mut FileLayout>,
) -> DatFile {
    let mut sections: Vec<Section> = Vec::new();
    let mut stream_failed = false;

    while sections.len() < SECTION_COUNT {
        let start = r.position() as usize;
        let read = match read_section(r) {
            Ok(read) => read,
            Err(e) => {
                debug!(offset = start, error = %e, "no further section count, stopping");
                if let Some(l) = layout.as_deref_mut() {
                    l.push(SectionId::Truncated, start, r.position() as usize);
                }
                stream_failed = true;
                break;
            }
        };

        let records_end = read.records_end as usize;
        if read.section.is_empty() {
            debug!(offset = start, "dropping section with no records");
            if let Some(l) = layout.as_deref_mut() {
                l.push(SectionId::EmptySection, start, records_end);
            }
        } else {
            if let Some(l) = layout.as_deref_mut() {
                l.push(SectionId::Section(sections.len()), start, records_end);
            }
            sections.push(read.section);
        }

        if let Some(e) = read.short_read {
            debug!(offset = records_end, error = %e, "record read came up short, stopping");
            if let Some(l) = layout.as_deref_mut() {
                l.push(SectionId::Truncated, records_end, r.position() as usize);
            }
            stream_failed = true;
            break;
        }
    }

    // A failed read leaves nothing trustworthy to carry, so the tail is only
    // captured when the section budget ended the loop.
    let mut trailing = Vec::new();
    if !stream_failed {
        let start = r.position() as usize;
        match r.read_to_end() {
            Ok(bytes) => {
                if let Some(l) = layout.as_deref_mut() {
                    l.push(SectionId::Tail, start, start + bytes.len());
                }
                trailing = bytes;
            }
            Err(e) => {
                warn!(offset = start, error = %e, "failed to read trailing bytes, dropping them");
                if let Some(l) = layout.as_deref_mut() {
                    l.push(SectionId::Truncated, start, r.position() as usize);
                }
            }
        }
    }

    DatFile { sections, trailing }
}
