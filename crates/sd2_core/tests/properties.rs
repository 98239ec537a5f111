//! Property-based tests for decode/encode and record edits.

use proptest::prelude::*;

use sd2_core::dat::{DatFile, PADDED_SECTION_INDEX, Record, SECTION_COUNT, Section};

fn arb_record() -> impl Strategy<Value = Record> {
    (any::<u16>(), any::<u16>()).prop_map(|(id, category)| Record::new(id, category))
}

fn arb_section(min: usize) -> impl Strategy<Value = Section> {
    prop::collection::vec(arb_record(), min..12).prop_map(Section::from)
}

/// Non-empty sections, few enough that the padding never comes into play.
fn arb_unpadded_sections() -> impl Strategy<Value = Vec<Section>> {
    prop::collection::vec(arb_section(1), 0..=PADDED_SECTION_INDEX)
}

proptest! {
    #[test]
    fn reencoding_decoded_bytes_decodes_identically(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let first = DatFile::from_bytes(&bytes);
        prop_assume!(first.section_count() <= PADDED_SECTION_INDEX);

        let second = DatFile::from_bytes(&first.to_bytes().unwrap());
        prop_assert_eq!(first.sections(), second.sections());
        prop_assert_eq!(first.trailing(), second.trailing());
    }

    #[test]
    fn unpadded_models_encode_to_exact_bytes(sections in arb_unpadded_sections()) {
        let dat = DatFile::new(sections.clone(), Vec::new()).unwrap();
        let bytes = dat.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), dat.encoded_len());

        let decoded = DatFile::from_bytes(&bytes);
        prop_assert_eq!(decoded.sections(), sections.as_slice());
        prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn full_models_keep_their_tail(
        sections in prop::collection::vec(arb_section(1), SECTION_COUNT),
        tail in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let dat = DatFile::new(sections, tail.clone()).unwrap();
        let bytes = dat.to_bytes().unwrap();
        prop_assert!(bytes.ends_with(&tail));

        // The padding sits after the 26th section and reads back as three
        // empty sections, so the decoded model matches the original.
        let decoded = DatFile::from_bytes(&bytes);
        prop_assert_eq!(decoded.sections(), dat.sections());
        prop_assert_eq!(decoded.trailing(), tail.as_slice());
    }

    #[test]
    fn insert_shifts_later_records_up(
        section in arb_section(1),
        record in arb_record(),
        seed in any::<usize>(),
    ) {
        let position = seed % (section.len() + 1);
        let mut edited = section.clone();
        edited.insert(position, record).unwrap();

        prop_assert_eq!(edited.len(), section.len() + 1);
        prop_assert_eq!(&edited.records()[..position], &section.records()[..position]);
        prop_assert_eq!(edited.records()[position], record);
        prop_assert_eq!(&edited.records()[position + 1..], &section.records()[position..]);
    }

    #[test]
    fn remove_shifts_later_records_down(section in arb_section(1), seed in any::<usize>()) {
        let position = seed % section.len();
        let mut edited = section.clone();
        let removed = edited.remove(position).unwrap();

        prop_assert_eq!(removed, section.records()[position]);
        prop_assert_eq!(&edited.records()[..position], &section.records()[..position]);
        prop_assert_eq!(&edited.records()[position..], &section.records()[position + 1..]);
    }
}
