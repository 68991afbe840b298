//! Program source parsing and loading.
//!
//! An LS-8 program is a text file with one byte per line written as a binary
//! literal. Everything after `#` is a comment; blank and comment-only lines are
//! skipped.
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```
//!
//! A literal may carry a `0b` prefix and `_` digit separators. Loading is
//! all-or-nothing: the first malformed line aborts the whole load.

use crate::virtual_machine::errors::VMError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const COMMENT_CHAR: char = '#';
const DIGIT_SEPARATOR: char = '_';

/// Decoded program bytes, placed in memory starting at address 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Parses one binary literal into a byte.
///
/// Returns `None` for empty input, any digit other than `0`/`1`, misplaced
/// separators, or values that do not fit in 8 bits.
fn parse_byte(token: &str) -> Option<u8> {
    let digits = token
        .strip_prefix("0b")
        .or_else(|| token.strip_prefix("0B"))
        .unwrap_or(token);

    if digits.is_empty()
        || digits.starts_with(DIGIT_SEPARATOR)
        || digits.ends_with(DIGIT_SEPARATOR)
        || !digits.chars().all(|c| matches!(c, '0' | '1' | DIGIT_SEPARATOR))
    {
        return None;
    }

    let digits: String = digits.chars().filter(|c| *c != DIGIT_SEPARATOR).collect();
    u8::from_str_radix(&digits, 2).ok()
}

/// Parses program source text into a [`Program`].
pub fn parse_source(source: &str) -> Result<Program, VMError> {
    let mut bytes = Vec::new();

    for (line_no, raw_line) in source.lines().enumerate() {
        let code = raw_line.split(COMMENT_CHAR).next().unwrap_or_default();
        let token = code.trim();
        if token.is_empty() {
            continue;
        }

        let byte = parse_byte(token).ok_or_else(|| VMError::MalformedProgramLine {
            line: line_no + 1,
            offset: code.len() - code.trim_start().len() + 1,
            token: token.to_string(),
        })?;
        bytes.push(byte);
    }

    Ok(Program::new(bytes))
}

/// Formats a compiler-style diagnostic pointing at the offending line.
pub fn render_diagnostic(
    file: &str,
    source: &str,
    line: usize,
    offset: usize,
    message: &str,
) -> String {
    let mut diag = format!("error: {message}\n --> {file}:{line}:{offset}\n");

    if let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) {
        let line_text = raw_line.trim_end_matches('\r');
        let underline = " ".repeat(offset.saturating_sub(1));
        diag.push_str(&format!("  |\n{line:>4} | {line_text}\n  | {underline}^\n"));
    }

    diag
}

/// Parses source read from `path`, printing a diagnostic to stderr when a
/// line is malformed.
fn parse_source_with_name(source: &str, file: &str) -> Result<Program, VMError> {
    let result = parse_source(source);

    if let Err(err) = &result
        && let VMError::MalformedProgramLine { line, offset, .. } = err
    {
        eprint!(
            "{}",
            render_diagnostic(file, source, *line, *offset, &err.to_string())
        );
    }

    result
}

/// Reads and parses the program at `path`.
///
/// A path that does not exist yields [`VMError::ProgramNotFound`]; any other
/// read failure yields [`VMError::IoError`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Program, VMError> {
    let path_ref = path.as_ref();
    let display = path_ref.display().to_string();

    let source = fs::read_to_string(path_ref).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VMError::ProgramNotFound {
            path: display.clone(),
        },
        _ => VMError::IoError {
            path: display.clone(),
            source: e.to_string(),
        },
    })?;

    parse_source_with_name(&source, &display)
}
