use anyhow::Result;
use chrono::{Local, NaiveDate};
use dialoguer::{Confirm, Input, Select};
use notekeeper_core::{Error, Note, NotePipeline, TIMESTAMP_FORMAT};

const ITEMS: &[&str] = &[
    "Add note (triggers background analysis)",
    "View notes",
    "Notes for a day",
    "Delete note",
    "Back up now",
    "Exit",
];

/// Drives the menu until the user picks Exit.
pub fn run(pipeline: &NotePipeline) -> Result<()> {
    loop {
        let choice = Select::new()
            .with_prompt("Choose an option")
            .items(ITEMS)
            .default(0)
            .interact()?;

        match choice {
            0 => add_note(pipeline)?,
            1 => view_notes(pipeline)?,
            2 => notes_for_day(pipeline)?,
            3 => delete_note(pipeline)?,
            4 => backup_now(pipeline),
            _ => return Ok(()),
        }
    }
}

fn add_note(pipeline: &NotePipeline) -> Result<()> {
    let content: String = Input::new()
        .with_prompt("Enter your note")
        .allow_empty(true)
        .interact_text()?;
    let important = Confirm::new()
        .with_prompt("Is this note important?")
        .default(false)
        .interact()?;

    match pipeline.add_note(&content, important) {
        Ok(()) => println!("Note added and sent for background analysis."),
        Err(Error::InvalidInput(_)) => println!("Empty note discarded."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn view_notes(pipeline: &NotePipeline) -> Result<()> {
    let blocks = pipeline.list_blocks()?;
    if blocks.is_empty() {
        println!("No notes found.");
    }
    for block in blocks {
        println!("{block}");
    }
    Ok(())
}

fn notes_for_day(pipeline: &NotePipeline) -> Result<()> {
    let today = Local::now().date_naive();
    let input: String = Input::new()
        .with_prompt("Date (YYYY-MM-DD)")
        .default(today.format("%Y-%m-%d").to_string())
        .interact_text()?;

    let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") else {
        println!("Invalid date.");
        return Ok(());
    };

    let notes = pipeline.notes_on(date)?;
    if notes.is_empty() {
        println!("No notes on {date}.");
    }
    for note in &notes {
        println!("{}", describe(note));
    }
    Ok(())
}

fn delete_note(pipeline: &NotePipeline) -> Result<()> {
    let notes = pipeline.list()?;
    if notes.is_empty() {
        println!("No notes to delete.");
        return Ok(());
    }

    for note in &notes {
        println!("--- Note {} ---", note.index + 1);
        println!("{}", describe(note));
    }

    let input: String = Input::new()
        .with_prompt("Enter the note number to delete (or 0 to cancel)")
        .allow_empty(true)
        .interact_text()?;

    match parse_selection(&input, notes.len()) {
        Selection::Cancel => {}
        Selection::Invalid => println!("Invalid number."),
        // The listing above may already be stale if notes changed meanwhile;
        // deletion goes by position, exactly as displayed.
        Selection::Index(index) => {
            if pipeline.delete_at(index)? {
                println!("Note deleted.");
            } else {
                println!("Invalid number.");
            }
        }
    }
    Ok(())
}

fn backup_now(pipeline: &NotePipeline) {
    if pipeline.backup_now() {
        println!("Backup written to {}.", pipeline.config().backup_path.display());
    } else {
        println!("Nothing backed up.");
    }
}

fn describe(note: &Note) -> String {
    let when = note
        .timestamp
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "unknown date".to_string());
    let marker = if note.important { " [important]" } else { "" };
    format!("{when}{marker}\n{}", note.content)
}

#[derive(Debug, PartialEq, Eq)]
enum Selection {
    Cancel,
    /// 0-based position
    Index(usize),
    Invalid,
}

/// Reads a 1-based note number; `0` cancels.
fn parse_selection(input: &str, count: usize) -> Selection {
    match input.trim().parse::<usize>() {
        Ok(0) => Selection::Cancel,
        Ok(n) if n <= count => Selection::Index(n - 1),
        _ => Selection::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("0", 3), Selection::Cancel);
        assert_eq!(parse_selection("1", 3), Selection::Index(0));
        assert_eq!(parse_selection(" 3 ", 3), Selection::Index(2));
        assert_eq!(parse_selection("4", 3), Selection::Invalid);
        assert_eq!(parse_selection("-1", 3), Selection::Invalid);
        assert_eq!(parse_selection("abc", 3), Selection::Invalid);
        assert_eq!(parse_selection("", 3), Selection::Invalid);
    }

    #[test]
    fn test_describe() {
        let note = Note {
            index: 0,
            timestamp: NaiveDateTime::parse_from_str("2025-01-02 03:04:05", TIMESTAMP_FORMAT)
                .ok(),
            content: "Call bank".to_string(),
            important: true,
        };
        assert_eq!(describe(&note), "2025-01-02 03:04:05 [important]\nCall bank");

        let undated = Note {
            timestamp: None,
            important: false,
            ..note
        };
        assert_eq!(describe(&undated), "unknown date\nCall bank");
    }
}
