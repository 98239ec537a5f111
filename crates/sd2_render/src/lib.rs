use std::fmt::Write as _;

use sd2_core::core_api::{CoreError, Session};
use sd2_core::dat::section_label;
use sd2_core::layout::{FileLayout, SectionId};
use serde_json::{Map as JsonMap, Value as JsonValue};

const MOVE_COL_WIDTH: usize = 6;
const CODE_COL_WIDTH: usize = 6;
const LAYOUT_ID_WIDTH: usize = 14;

/// Move ids and categories are shown the way the game tooling shows them:
/// four upper-case hex digits.
pub fn format_code(code: u16) -> String {
    format!("{code:04X}")
}

pub fn format_section_id(id: SectionId) -> String {
    match id {
        SectionId::Section(index) => format!("section {:02}", index + 1),
        SectionId::EmptySection => "empty".to_string(),
        SectionId::Truncated => "truncated".to_string(),
        SectionId::Tail => "tail".to_string(),
    }
}

pub fn render_json_summary(session: &Session) -> JsonValue {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "section_count".to_string(),
        JsonValue::from(snapshot.section_count),
    );
    out.insert(
        "record_count".to_string(),
        JsonValue::from(snapshot.record_count),
    );
    out.insert(
        "trailing_len".to_string(),
        JsonValue::from(snapshot.trailing_len),
    );

    let sections = snapshot
        .sections
        .iter()
        .map(|section| {
            let mut obj = JsonMap::new();
            obj.insert("index".to_string(), JsonValue::from(section.index));
            obj.insert(
                "label".to_string(),
                JsonValue::String(section_label(section.index)),
            );
            obj.insert(
                "name".to_string(),
                match &section.name {
                    Some(name) => JsonValue::String(name.clone()),
                    None => JsonValue::Null,
                },
            );
            obj.insert(
                "record_count".to_string(),
                JsonValue::from(section.record_count),
            );
            JsonValue::Object(obj)
        })
        .collect();
    out.insert("sections".to_string(), JsonValue::Array(sections));

    JsonValue::Object(out)
}

pub fn render_json_section(session: &Session, index: usize) -> Result<JsonValue, CoreError> {
    let records = session.section_records(index)?;
    let mut out = JsonMap::new();

    out.insert("index".to_string(), JsonValue::from(index));
    out.insert("label".to_string(), JsonValue::String(section_label(index)));

    let rows = records
        .iter()
        .map(|record| {
            let mut obj = JsonMap::new();
            obj.insert("position".to_string(), JsonValue::from(record.position));
            obj.insert("id".to_string(), JsonValue::String(format_code(record.id)));
            obj.insert(
                "category".to_string(),
                JsonValue::String(format_code(record.category)),
            );
            JsonValue::Object(obj)
        })
        .collect();
    out.insert("records".to_string(), JsonValue::Array(rows));

    Ok(JsonValue::Object(out))
}

pub fn render_json_layout(layout: &FileLayout) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("file_len".to_string(), JsonValue::from(layout.file_len));
    out.insert(
        "validation_ok".to_string(),
        JsonValue::Bool(layout.validate().is_ok()),
    );

    let sections = layout
        .sections
        .iter()
        .map(|section| {
            let mut obj = JsonMap::new();
            obj.insert(
                "id".to_string(),
                JsonValue::String(format_section_id(section.id)),
            );
            obj.insert("start".to_string(), JsonValue::from(section.range.start));
            obj.insert("end".to_string(), JsonValue::from(section.range.end));
            obj.insert("len".to_string(), JsonValue::from(section.range.len()));
            JsonValue::Object(obj)
        })
        .collect();
    out.insert("sections".to_string(), JsonValue::Array(sections));

    JsonValue::Object(out)
}

pub fn render_text_summary(session: &Session) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();

    writeln!(&mut out, "Sections").expect("writing to String cannot fail");
    for section in &snapshot.sections {
        writeln!(
            &mut out,
            "  {} ({} records)",
            section_label(section.index),
            section.record_count
        )
        .expect("writing to String cannot fail");
    }
    if snapshot.sections.is_empty() {
        writeln!(&mut out, "  (none)").expect("writing to String cannot fail");
    }
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{} sections, {} records, {} trailing bytes",
        snapshot.section_count, snapshot.record_count, snapshot.trailing_len
    )
    .expect("writing to String cannot fail");

    out
}

pub fn render_text_section(session: &Session, index: usize) -> Result<String, CoreError> {
    let records = session.section_records(index)?;
    let mut out = String::new();

    writeln!(&mut out, "{}", section_label(index)).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  {:<move_w$}{:<code_w$}{}",
        "Move",
        "ID",
        "Type",
        move_w = MOVE_COL_WIDTH,
        code_w = CODE_COL_WIDTH,
    )
    .expect("writing to String cannot fail");
    for record in &records {
        writeln!(
            &mut out,
            "  {:<move_w$}{:<code_w$}{}",
            format!("{:03}", record.position),
            format_code(record.id),
            format_code(record.category),
            move_w = MOVE_COL_WIDTH,
            code_w = CODE_COL_WIDTH,
        )
        .expect("writing to String cannot fail");
    }

    Ok(out)
}

pub fn render_text_layout(layout: &FileLayout) -> String {
    let mut out = String::new();

    writeln!(&mut out, "File length: {} bytes", layout.file_len)
        .expect("writing to String cannot fail");
    for section in &layout.sections {
        writeln!(
            &mut out,
            "  {:<id_w$}{:>8}..{:<8} ({} bytes)",
            format_section_id(section.id),
            section.range.start,
            section.range.end,
            section.range.len(),
            id_w = LAYOUT_ID_WIDTH,
        )
        .expect("writing to String cannot fail");
    }
    let status = match layout.validate() {
        Ok(()) => "Layout OK".to_string(),
        Err(e) => format!("Layout invalid: {e}"),
    };
    writeln!(&mut out, "{status}").expect("writing to String cannot fail");

    out
}
