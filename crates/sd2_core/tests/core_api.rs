use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sd2_core::core_api::{CoreErrorCode, Engine, RecordEdit, RecordEntry};

fn temp_output_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.dat", std::process::id(), nanos))
}

fn sample_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    for records in [&[(0x0010, 0x0001), (0x0020, 0x0002)][..], &[][..], &[(0x0030, 0x0003)][..]] {
        out.extend_from_slice(&(records.len() as u32).to_le_bytes());
        for &(id, category) in records {
            out.extend_from_slice(&u16::to_le_bytes(id));
            out.extend_from_slice(&u16::to_le_bytes(category));
        }
    }
    out
}

#[test]
fn snapshot_names_sections_by_model_position() {
    let session = Engine::new()
        .open_bytes(sample_bytes())
        .expect("bytes should decode");
    let snapshot = session.snapshot();

    assert_eq!(snapshot.section_count, 2);
    assert_eq!(snapshot.record_count, 3);
    assert_eq!(snapshot.trailing_len, 0);
    assert_eq!(snapshot.sections[0].name.as_deref(), Some("Fighting Stances"));
    assert_eq!(snapshot.sections[1].name.as_deref(), Some("Taunts"));
    assert_eq!(snapshot.sections[1].record_count, 1);
    assert!(!session.is_modified());
}

#[test]
fn section_records_lists_positions() {
    let session = Engine::new().open_bytes(sample_bytes()).unwrap();
    let records = session.section_records(0).unwrap();
    assert_eq!(
        records,
        vec![
            RecordEntry {
                position: 0,
                id: 0x0010,
                category: 0x0001
            },
            RecordEntry {
                position: 1,
                id: 0x0020,
                category: 0x0002
            },
        ]
    );

    let err = session.section_records(5).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidIndex);
}

#[test]
fn edits_update_snapshot_and_bytes() {
    let mut session = Engine::new().open_bytes(sample_bytes()).unwrap();

    session
        .apply(RecordEdit::InsertAfter {
            section: 1,
            position: 0,
        })
        .unwrap();
    session
        .apply(RecordEdit::Set {
            section: 1,
            position: 1,
            id: 0xBEEF,
            category: 0x0009,
        })
        .unwrap();
    session
        .apply(RecordEdit::Delete {
            section: 0,
            position: 0,
        })
        .unwrap();

    assert!(session.is_modified());
    assert_eq!(session.snapshot().record_count, 3);
    assert_eq!(session.snapshot().sections[0].record_count, 1);
    assert_eq!(session.snapshot().sections[1].record_count, 2);

    let reopened = Engine::new()
        .open_bytes(session.to_bytes().unwrap())
        .unwrap();
    let second = reopened.section_records(1).unwrap();
    assert_eq!((second[1].id, second[1].category), (0xBEEF, 0x0009));
}

#[test]
fn out_of_range_edits_are_rejected_without_changes() {
    let mut session = Engine::new().open_bytes(sample_bytes()).unwrap();

    let err = session.delete_record(0, 2).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidIndex);
    let err = session.set_record(9, 0, 1, 1).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidIndex);
    let err = session.insert_record_after(1, 1).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidIndex);

    assert!(!session.is_modified());
    assert_eq!(session.to_bytes().unwrap().len(), 8 + 12);
}

#[test]
fn strict_open_reports_missing_file_and_lenient_load_does_not() {
    let engine = Engine::new();
    let path = temp_output_path("sd2_core_api_missing");

    let err = engine.open_path(&path).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Io);

    let session = engine.load_path(&path);
    assert_eq!(session.snapshot().section_count, 0);
    assert!(session.layout().sections.is_empty());
}

#[test]
fn save_writes_encoded_bytes() {
    let path = temp_output_path("sd2_core_api_save");
    let mut session = Engine::new().open_bytes(sample_bytes()).unwrap();
    session.set_record(0, 1, 0x0021, 0x0002).unwrap();
    session.save(&path).expect("save should succeed");

    let written = fs::read(&path).unwrap();
    assert_eq!(written, session.to_bytes().unwrap());
    let reopened = Engine::new().open_path(&path).unwrap();
    assert_eq!(reopened.section_records(0).unwrap()[1].id, 0x0021);

    let _ = fs::remove_file(&path);
}

#[test]
fn save_error_carries_io_code() {
    let path = temp_output_path("sd2_core_api_no_dir").join("9999.dat");
    let session = Engine::new().open_bytes(sample_bytes()).unwrap();
    let err = session.save(&path).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Io);
}

#[test]
fn record_edits_deserialize_from_tagged_json() {
    let edit: RecordEdit =
        serde_json::from_str(r#"{"op":"delete","section":2,"position":4}"#).unwrap();
    assert_eq!(
        edit,
        RecordEdit::Delete {
            section: 2,
            position: 4
        }
    );
}
