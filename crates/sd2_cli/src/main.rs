use std::path::PathBuf;
use std::process;

use clap::Parser;
use sd2_core::core_api::{Engine, RecordEdit, Session};
use sd2_core::dat::{DEFAULT_FILE_NAME, SECTION_COUNT};
use sd2_render::{
    render_json_layout, render_json_section, render_json_summary, render_text_layout,
    render_text_section, render_text_summary,
};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "9999.DAT", default_value = DEFAULT_FILE_NAME)]
    path: PathBuf,
    /// Show the records of one section (1-based).
    #[arg(long, value_name = "N", value_parser = parse_section_number)]
    section: Option<usize>,
    /// Show the byte layout of the input file.
    #[arg(long, conflicts_with = "section")]
    layout: bool,
    #[arg(long)]
    json: bool,
    /// Fail instead of starting empty when the input cannot be read.
    #[arg(long)]
    strict: bool,
    /// Overwrite a record: section:position=id:category, codes in hex.
    #[arg(long = "set", value_name = "S:P=ID:CAT", value_parser = parse_set_edit)]
    set: Vec<RecordEdit>,
    /// Insert a zeroed record after section:position.
    #[arg(long = "insert-after", value_name = "S:P", value_parser = parse_insert_edit)]
    insert_after: Vec<RecordEdit>,
    /// Delete the record at section:position.
    #[arg(long, value_name = "S:P", value_parser = parse_delete_edit)]
    delete: Vec<RecordEdit>,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_section_number(raw: &str) -> Result<usize, String> {
    let number: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid section number '{raw}'"))?;
    if !(1..=SECTION_COUNT).contains(&number) {
        return Err(format!(
            "invalid section number {number}, expected 1..={SECTION_COUNT}"
        ));
    }
    Ok(number - 1)
}

fn parse_location(raw: &str) -> Result<(usize, usize), String> {
    let (section, position) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid location '{raw}', expected SECTION:POSITION"))?;
    let section = parse_section_number(section)?;
    let position = position
        .trim()
        .parse()
        .map_err(|_| format!("invalid record position '{position}'"))?;
    Ok((section, position))
}

fn parse_code(raw: &str) -> Result<u16, String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16).map_err(|_| format!("invalid hex code '{raw}'"))
}

fn parse_set_edit(raw: &str) -> Result<RecordEdit, String> {
    let (location, codes) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid edit '{raw}', expected S:P=ID:CAT"))?;
    let (section, position) = parse_location(location)?;
    let (id, category) = codes
        .split_once(':')
        .ok_or_else(|| format!("invalid codes '{codes}', expected ID:CAT"))?;
    Ok(RecordEdit::Set {
        section,
        position,
        id: parse_code(id)?,
        category: parse_code(category)?,
    })
}

fn parse_insert_edit(raw: &str) -> Result<RecordEdit, String> {
    let (section, position) = parse_location(raw)?;
    Ok(RecordEdit::InsertAfter { section, position })
}

fn parse_delete_edit(raw: &str) -> Result<RecordEdit, String> {
    let (section, position) = parse_location(raw)?;
    Ok(RecordEdit::Delete { section, position })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn open_session(cli: &Cli) -> Session {
    let engine = Engine::new();
    if !cli.strict {
        return engine.load_path(&cli.path);
    }
    engine.open_path(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    // Sets first, then inserts, then deletes; each group in command-line
    // order, positions as they stand after the previous edit.
    let edits: Vec<RecordEdit> = cli
        .set
        .iter()
        .chain(&cli.insert_after)
        .chain(&cli.delete)
        .copied()
        .collect();
    let has_edits = !edits.is_empty();

    if has_edits && cli.output.is_none() {
        eprintln!("--set, --insert-after and --delete require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set, --insert-after or --delete flag");
        process::exit(2);
    }

    let mut session = open_session(&cli);

    for edit in edits {
        session.apply(edit).unwrap_or_else(|e| {
            eprintln!("Error applying edit: {e}");
            process::exit(1);
        });
    }

    if let Some(out_path) = cli.output.as_ref() {
        session.save(out_path).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = if cli.layout {
            render_json_layout(session.layout())
        } else if let Some(index) = cli.section {
            render_json_section(&session, index).unwrap_or_else(|e| {
                eprintln!("Error rendering section: {e}");
                process::exit(1);
            })
        } else {
            render_json_summary(&session)
        };
        print_json(&json);
        return;
    }

    if cli.layout {
        print!("{}", render_text_layout(session.layout()));
        return;
    }

    if let Some(index) = cli.section {
        let text = render_text_section(&session, index).unwrap_or_else(|e| {
            eprintln!("Error rendering section: {e}");
            process::exit(1);
        });
        print!("{text}");
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote edited file to {}", out_path.display());
        return;
    }

    print!("{}", render_text_summary(&session));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_numbers_are_one_based() {
        assert_eq!(parse_section_number("1"), Ok(0));
        assert_eq!(parse_section_number("30"), Ok(29));
        assert!(parse_section_number("0").is_err());
        assert!(parse_section_number("31").is_err());
    }

    #[test]
    fn set_edit_parses_hex_codes() {
        assert_eq!(
            parse_set_edit("2:5=BBAA:0x00dd"),
            Ok(RecordEdit::Set {
                section: 1,
                position: 5,
                id: 0xBBAA,
                category: 0x00DD,
            })
        );
        assert!(parse_set_edit("2:5").is_err());
        assert!(parse_set_edit("2:5=GGGG:0000").is_err());
        assert!(parse_set_edit("2:5=10000:0000").is_err());
    }

    #[test]
    fn location_edits_parse() {
        assert_eq!(
            parse_insert_edit("26:0"),
            Ok(RecordEdit::InsertAfter {
                section: 25,
                position: 0,
            })
        );
        assert_eq!(
            parse_delete_edit("1:12"),
            Ok(RecordEdit::Delete {
                section: 0,
                position: 12,
            })
        );
        assert!(parse_delete_edit("1").is_err());
    }
}
