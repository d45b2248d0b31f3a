//! Book assembly: serialize the title and ordered chapters into one plain-text file.

use crate::model::{Book, ChapterResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Line written above and below every chapter body.
pub const SEPARATOR_WIDTH: usize = 50;

/// Errors from writing the text artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

/// Render the book to `out`:
///
/// ```text
/// <book title>
///
/// <chapter title>
/// ==================================================
///
/// <body>
///
/// ==================================================
///
/// ```
///
/// repeated for every chapter in the given order.
pub fn write_text<W: Write>(
    title: &str,
    chapters: &[ChapterResult],
    out: &mut W,
) -> std::io::Result<()> {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    write!(out, "{}\n\n", title)?;
    for ch in chapters {
        writeln!(out, "{}", ch.title)?;
        write!(out, "{}\n\n", separator)?;
        write!(out, "{}\n\n", ch.body)?;
        write!(out, "{}\n\n", separator)?;
    }
    Ok(())
}

/// Render the book to a string. Same bytes as [write_text].
pub fn render_text(book: &Book) -> std::io::Result<String> {
    let mut buf = Vec::new();
    write_text(&book.title, &book.chapters, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the book to `path`, replacing any existing file.
pub fn write_book(book: &Book, path: &Path) -> Result<(), WriteError> {
    let f = File::create(path).map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut w = BufWriter::new(f);
    write_text(&book.title, &book.chapters, &mut w)?;
    w.flush()?;
    Ok(())
}
