use std::fmt;
use std::io::{self, Read, Write};
use std::slice;

use serde::{Deserialize, Serialize};

use crate::reader::LittleEndianReader;
use crate::writer::LittleEndianWriter;

use super::types::{COUNT_WIDTH, RECORD_WIDTH};

// Upper bound on records reserved up front; the on-disk count is untrusted.
const PREALLOC_RECORD_LIMIT: usize = 1024;

/// One move slot: an opaque move id and its category code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub id: u16,
    pub category: u16,
}

impl Record {
    pub const EMPTY: Record = Record::new(0, 0);

    pub const fn new(id: u16, category: u16) -> Self {
        Self { id, category }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.id, self.category)
    }
}

/// An ordered list of records. Position is the only identity a record has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Section {
    records: Vec<Record>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Field-level access; the record count cannot change through this.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Insert `record` so that it ends up at `position`; later records move
    /// up by one.
    pub fn insert(&mut self, position: usize, record: Record) -> io::Result<()> {
        if position > self.records.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "invalid insert position {position}, expected 0..={}",
                    self.records.len()
                ),
            ));
        }
        self.records.insert(position, record);
        Ok(())
    }

    /// Insert a zeroed record directly after `position` and return where it
    /// landed.
    pub fn insert_after(&mut self, position: usize) -> io::Result<usize> {
        self.check_position(position)?;
        self.records.insert(position + 1, Record::EMPTY);
        Ok(position + 1)
    }

    pub fn remove(&mut self, position: usize) -> io::Result<Record> {
        self.check_position(position)?;
        Ok(self.records.remove(position))
    }

    pub fn set(&mut self, position: usize, id: u16, category: u16) -> io::Result<()> {
        self.check_position(position)?;
        self.records[position] = Record::new(id, category);
        Ok(())
    }

    /// Encoded size: count field plus records.
    pub fn byte_len(&self) -> usize {
        COUNT_WIDTH + self.records.len() * RECORD_WIDTH
    }

    fn check_position(&self, position: usize) -> io::Result<()> {
        if position >= self.records.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "invalid record position {position}, section holds {} records",
                    self.records.len()
                ),
            ));
        }
        Ok(())
    }
}

impl From<Vec<Record>> for Section {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for Section {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// --- Section framing ---

pub(crate) struct SectionRead {
    pub section: Section,
    /// Stream position just past the last complete record.
    pub records_end: u64,
    /// Set when a record came up short; the stream is spent.
    pub short_read: Option<io::Error>,
}

/// Read one count-prefixed section. Fails only when the count itself cannot
/// be read; a short record read keeps whatever records completed.
pub(crate) fn read_section<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<SectionRead> {
    let count = r.read_u32()?;
    let mut records = Vec::with_capacity((count as usize).min(PREALLOC_RECORD_LIMIT));
    let mut records_end = r.position();
    let mut short_read = None;

    for _ in 0..count {
        match read_record(r) {
            Ok(record) => {
                records.push(record);
                records_end = r.position();
            }
            Err(e) => {
                short_read = Some(e);
                break;
            }
        }
    }

    Ok(SectionRead {
        section: Section::from(records),
        records_end,
        short_read,
    })
}

fn read_record<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Record> {
    let id = r.read_u16()?;
    let category = r.read_u16()?;
    Ok(Record { id, category })
}

pub(crate) fn emit_section<W: Write>(
    w: &mut LittleEndianWriter<W>,
    section: &Section,
) -> io::Result<()> {
    let count = u32::try_from(section.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("section holds {} records, more than a u32 count", section.len()),
        )
    })?;
    w.write_u32(count)?;
    for record in section {
        w.write_u16(record.id)?;
        w.write_u16(record.category)?;
    }
    Ok(())
}
