//! Card files
//!
//! A slot's cards are read from a file (or stdin when the path is `-`) in
//! either of two shapes:
//!
//! - JSONL, one card object per line (blank lines skipped)
//! - a single JSON array of card objects
//!
//! Writes keep the shape the file already has (JSONL for new files), order
//! cards by column, go through a temp file plus rename, and hold an
//! exclusive lock while writing.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::TaskCard;

/// Source (and optional destination) of a slot's cards
pub struct CardFile {
    path: PathBuf,
}

impl CardFile {
    /// Creates a card file handle; `-` means stdin
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the card file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if cards come from stdin
    pub fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    /// Reads all cards, in file order
    pub fn read_all(&self) -> Result<Vec<TaskCard>> {
        let content = if self.is_stdin() {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read cards from stdin")?;
            buf
        } else {
            let mut file = File::open(&self.path)
                .with_context(|| format!("Failed to open card file: {}", self.path.display()))?;

            // Acquire shared lock for reading
            file.lock_shared()
                .context("Failed to acquire read lock on card file")?;

            let mut buf = String::new();
            file.read_to_string(&mut buf)
                .with_context(|| format!("Failed to read card file: {}", self.path.display()))?;

            // Lock is released when file is dropped
            buf
        };

        parse_cards(&content)
    }

    /// Rewrites the file with the given cards (sorted by column)
    pub fn write_all(&self, cards: &[TaskCard]) -> Result<()> {
        if self.is_stdin() {
            anyhow::bail!("Cannot write cards back to stdin; pass a file path");
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let as_array = self.holds_array();

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on card file")?;

            let mut writer = BufWriter::new(&file);

            let mut sorted: Vec<_> = cards.iter().collect();
            sorted.sort_by_key(|c| c.column_start);

            if as_array {
                serde_json::to_writer_pretty(&mut writer, &sorted)
                    .context("Failed to serialize cards")?;
                writeln!(writer).context("Failed to write card")?;
            } else {
                for card in sorted {
                    let line = serde_json::to_string(card).context("Failed to serialize card")?;
                    writeln!(writer, "{}", line).context("Failed to write card")?;
                }
            }

            writer.flush().context("Failed to flush card file")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Returns true if the file currently holds a JSON array
    fn holds_array(&self) -> bool {
        fs::read_to_string(&self.path)
            .map(|content| content.trim_start().starts_with('['))
            .unwrap_or(false)
    }
}

/// Parses cards from JSONL or a JSON array
pub fn parse_cards(content: &str) -> Result<Vec<TaskCard>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Failed to parse card array");
    }

    let mut cards = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let card: TaskCard = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse card at line {}", line_num + 1))?;
        cards.push(card);
    }

    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardId;
    use tempfile::TempDir;

    fn card(id: u32, hours: u8, column_start: u8) -> TaskCard {
        TaskCard::new(CardId::from(id), hours, column_start)
    }

    #[test]
    fn parse_jsonl_skips_blank_lines() {
        let content = r#"{"id": 1, "hours": 2, "column_start": 0}

{"id": "asg-2", "hours": 1, "column_start": 2, "title": "Site visit"}
"#;
        let cards = parse_cards(content).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].id.as_str(), "asg-2");
        assert_eq!(cards[1].title, "Site visit");
    }

    #[test]
    fn parse_json_array() {
        let content = r#"[{"id": 1, "hours": 2}, {"id": 2, "column_start": 3}]"#;
        let cards = parse_cards(content).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].hours, 1);
        assert_eq!(cards[1].column_start, 3);
    }

    #[test]
    fn parse_error_names_line() {
        let content = "{\"id\": 1}\nnot json\n";
        let err = parse_cards(content).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn empty_content_has_no_cards() {
        assert!(parse_cards("").unwrap().is_empty());
        assert!(parse_cards("[]").unwrap().is_empty());
    }

    #[test]
    fn write_and_read_cards() {
        let dir = TempDir::new().unwrap();
        let file = CardFile::new(dir.path().join("slot.jsonl"));

        file.write_all(&[card(2, 2, 2), card(1, 2, 0).titled("Kickoff")])
            .unwrap();

        let loaded = file.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, CardId::from(1u32));
        assert_eq!(loaded[0].title, "Kickoff");
        assert_eq!(loaded[1].column_start, 2);
    }

    #[test]
    fn write_keeps_json_array_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slot.json");
        fs::write(&path, r#"[{"id": 1, "hours": 4, "column_start": 0}]"#).unwrap();

        let file = CardFile::new(&path);
        file.write_all(&[card(2, 1, 0), card(1, 3, 1)]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('['));
        let loaded = file.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, CardId::from(2u32));
    }

    #[test]
    fn new_file_is_written_as_jsonl() {
        let dir = TempDir::new().unwrap();
        let file = CardFile::new(dir.path().join("slot.jsonl"));
        file.write_all(&[card(1, 2, 0), card(2, 2, 2)]).unwrap();

        let raw = fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.starts_with('{'));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let file = CardFile::new(dir.path().join("slot.jsonl"));
        file.write_all(&[card(1, 4, 0)]).unwrap();

        let temp_path = file.path().with_extension("jsonl.tmp");
        assert!(!temp_path.exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let file = CardFile::new(dir.path().join("nested").join("slot.jsonl"));
        file.write_all(&[card(1, 1, 0)]).unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = CardFile::new(dir.path().join("absent.jsonl"));
        assert!(file.read_all().is_err());
    }

    #[test]
    fn stdin_cannot_be_written() {
        let file = CardFile::new("-");
        assert!(file.is_stdin());
        assert!(file.write_all(&[]).is_err());
    }
}
