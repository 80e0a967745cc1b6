//! Loading the statement list.
//!
//! Statements come from a Cypher script (file or stdin), a JSON array of
//! strings, or inline `--statement` arguments. Scripts are split on `;`
//! terminators the way `cypher-shell` reads them.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{MendError, Result};

/// Where to read statements from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementSource {
    /// A file on disk. `.json` files hold a JSON array, anything else is a script.
    File(PathBuf),
    /// A script read from standard input.
    Stdin,
    /// Statements given directly, one per entry.
    Inline(Vec<String>),
}

impl StatementSource {
    /// Interprets a script argument: `-` means stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Reads the statements from `source`, preserving their order.
pub fn load(source: &StatementSource) -> Result<Vec<String>> {
    match source {
        StatementSource::File(path) => load_file(path),
        StatementSource::Stdin => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .map_err(|e| MendError::io(format!("Failed to read stdin: {e}")))?;
            Ok(split_script(&script))
        }
        StatementSource::Inline(statements) => Ok(statements.clone()),
    }
}

/// Reads the statements from every source in turn.
pub fn load_all(sources: &[StatementSource]) -> Result<Vec<String>> {
    let mut statements = Vec::new();
    for source in sources {
        statements.extend(load(source)?);
    }
    Ok(statements)
}

fn load_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MendError::io(format!("Failed to read {}: {e}", path.display())))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json_list(&content)
            .map_err(|e| MendError::config(format!("{}: {e}", path.display())))
    } else {
        Ok(split_script(&content))
    }
}

/// Parses a JSON array of statement strings.
///
/// Blank entries are kept so that result indices match the array positions.
pub fn parse_json_list(input: &str) -> Result<Vec<String>> {
    serde_json::from_str(input)
        .map_err(|e| MendError::config(format!("Expected a JSON array of strings: {e}")))
}

/// Splits a Cypher script into statements.
///
/// Semicolons inside string literals, backtick identifiers and comments do
/// not terminate a statement. Comments are dropped and each piece is trimmed;
/// empty pieces are omitted. A trailing statement without `;` is kept.
pub fn split_script(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                current.push(c);
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == '\\' && c != '`' {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    } else if inner == c {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                // Line comment: keep the newline so tokens stay separated.
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                current.push(' ');
            }
            ';' => push_statement(&mut statements, &mut current),
            _ => current.push(c),
        }
    }

    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}
