//! Response parsing for LLM outputs.
//!
//! Models are told to answer with a bare statement but often wrap it in a
//! markdown code block anyway. This module extracts the statement either way.

/// Fence labels accepted as statement blocks, most specific first.
const STATEMENT_LABELS: &[&str] = &["cypher", "sql", ""];

/// Extracts the corrected statement from an LLM reply.
///
/// Looks for a fenced code block in the following order:
/// - ```cypher ... ```
/// - ```sql ... ```
/// - ``` ... ``` (no language specified)
///
/// If no usable block is found, the whole reply is returned. The result is
/// trimmed; it may be empty if the reply was.
pub fn extract_statement(response: &str) -> String {
    for label in STATEMENT_LABELS {
        if let Some(block) = extract_code_block(response, label) {
            return block.trim().to_string();
        }
    }

    response.trim().to_string()
}

/// Extracts the first code block whose fence carries `lang` (case-insensitive).
///
/// Pass an empty string for `lang` to match blocks without a language specifier.
fn extract_code_block(text: &str, lang: &str) -> Option<String> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find("```") {
        let fence_start = search_from + offset;
        let label_start = fence_start + 3;

        // The opening fence runs to the end of its line.
        let label_end = label_start + text[label_start..].find('\n')?;
        let label = text[label_start..label_end].trim();
        let content_start = label_end + 1;

        // Every opening fence has a closing fence; skip past it either way.
        let content_len = text[content_start..].find("```")?;
        let content_end = content_start + content_len;

        if label.eq_ignore_ascii_case(lang) {
            return Some(text[content_start..content_end].to_string());
        }

        search_from = content_end + 3;
    }

    None
}
