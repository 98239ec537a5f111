use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub section_count: usize,
    pub record_count: usize,
    pub trailing_len: usize,
    pub sections: Vec<SectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSummary {
    pub index: usize,
    pub name: Option<String>,
    pub record_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEntry {
    pub position: usize,
    pub id: u16,
    pub category: u16,
}

/// A single record edit, addressed by model section index and record
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecordEdit {
    Set {
        section: usize,
        position: usize,
        id: u16,
        category: u16,
    },
    InsertAfter {
        section: usize,
        position: usize,
    },
    Delete {
        section: usize,
        position: usize,
    },
}
