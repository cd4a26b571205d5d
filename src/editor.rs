// src/editor.rs
// =============================================================================
// The "editor" side of an import.
//
// The importer doesn't care what kind of editor it's feeding. It needs
// three things, each behind a small interface:
// - somewhere to insert text (InsertionTarget)
// - a way to tell the user how it went (Notifier)
// - a way to ask for the repository URL (prompt_for_request)
//
// For the command line those are a Markdown file or stdout, stderr, and a
// one-line prompt on the terminal.
// =============================================================================

use crate::import::ImportRequest;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SUCCESS_MESSAGE: &str = "README imported successfully";
pub const FAILURE_MESSAGE: &str = "Failed to import README. Please check the repository URL.";

/// Where imported text ends up
pub trait InsertionTarget {
    /// Puts `text` at the cursor. Either all of it lands or none of it.
    fn replace_selection(&mut self, text: &str) -> io::Result<()>;
}

/// Shows the user one short message
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Where in a file the import goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    End,
    /// Before this 1-based line; past the end means append.
    Line(usize),
}

/// A Markdown note on disk
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    cursor: Cursor,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>, cursor: Cursor) -> Self {
        Self {
            path: path.into(),
            cursor,
        }
    }
}

impl InsertionTarget for FileDocument {
    // Reads the whole note, splices the text in, and writes the result to a
    // temporary file next to it that is then renamed over the note. A
    // missing file counts as an empty note.
    fn replace_selection(&mut self, text: &str) -> io::Result<()> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(existing) => existing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let updated = insert_at(&existing, text, self.cursor);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(updated.as_bytes())?;
        staged.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(staged.path(), metadata.permissions())?;
        }
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Prints the imported text instead of saving it
#[derive(Debug, Default)]
pub struct StdoutDocument;

impl InsertionTarget for StdoutDocument {
    fn replace_selection(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    }
}

/// Notifications go to stderr so they never mix with document output
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

// Asks for the repository URL on `output` and reads one line from `input`
//
// Returns:
//   Some(request) when the user typed something and pressed Enter
//   None when the line was empty or input ended (treated as "cancel")
pub fn prompt_for_request<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> io::Result<Option<ImportRequest>> {
    writeln!(output, "Enter GitHub Repository URL")?;
    write!(output, "Repository URL: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let url = line.trim();
    if url.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImportRequest::new(url)))
}

fn insert_at(existing: &str, text: &str, cursor: Cursor) -> String {
    let mut block = text.to_string();
    if !block.ends_with('\n') {
        block.push('\n');
    }

    let lines: Vec<&str> = existing.split_inclusive('\n').collect();
    let index = match cursor {
        Cursor::End => lines.len(),
        Cursor::Line(n) => n.saturating_sub(1).min(lines.len()),
    };

    let mut out = String::with_capacity(existing.len() + block.len() + 1);
    for line in &lines[..index] {
        out.push_str(line);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&block);
    for line in &lines[index..] {
        out.push_str(line);
    }
    out
}
