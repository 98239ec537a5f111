use std::io;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// What a run of input bytes turned into during decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    /// A section kept in the model, by model index.
    Section(usize),
    /// A count header that produced no records; dropped from the model.
    EmptySection,
    /// Bytes consumed by a short read; dropped from the model.
    Truncated,
    /// The trailing buffer.
    Tail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub(crate) fn push(&mut self, id: SectionId, start: usize, end: usize) {
        if start == end {
            return;
        }
        self.sections.push(SectionLayout {
            id,
            range: ByteRange { start, end },
        });
    }

    pub fn validate(&self) -> io::Result<()> {
        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "layout gap/overlap around section {:?}: expected start {}, got {}",
                        section.id, expected, section.range.start
                    ),
                ));
            }
            if section.range.end < section.range.start {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "invalid section range {:?}: {}..{}",
                        section.id, section.range.start, section.range.end
                    ),
                ));
            }
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "layout does not cover file: ended at {}, file length {}",
                    expected, self.file_len
                ),
            ));
        }

        Ok(())
    }

    pub fn range_of(&self, id: SectionId) -> Option<ByteRange> {
        self.sections
            .iter()
            .find(|section| section.id == id)
            .map(|section| section.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(file_len: usize, ranges: &[(SectionId, usize, usize)]) -> FileLayout {
        let mut out = FileLayout {
            file_len,
            sections: Vec::new(),
        };
        for &(id, start, end) in ranges {
            out.push(id, start, end);
        }
        out
    }

    #[test]
    fn contiguous_layout_validates() {
        let l = layout(
            20,
            &[
                (SectionId::Section(0), 0, 8),
                (SectionId::EmptySection, 8, 12),
                (SectionId::Tail, 12, 20),
            ],
        );
        assert!(l.validate().is_ok());
        assert_eq!(l.range_of(SectionId::Tail), Some(ByteRange { start: 12, end: 20 }));
    }

    #[test]
    fn gap_is_rejected() {
        let l = layout(
            12,
            &[(SectionId::Section(0), 0, 8), (SectionId::Tail, 9, 12)],
        );
        assert!(l.validate().is_err());
    }

    #[test]
    fn short_coverage_is_rejected() {
        let l = layout(12, &[(SectionId::Section(0), 0, 8)]);
        assert!(l.validate().is_err());
    }

    #[test]
    fn empty_file_has_empty_layout() {
        let l = layout(0, &[(SectionId::Tail, 0, 0)]);
        assert!(l.sections.is_empty());
        assert!(l.validate().is_ok());
    }
}
