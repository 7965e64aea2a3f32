//! Recovering JSON from chatty model output.

use anyhow::{bail, Result};

/// Strip code fences, normalize smart quotes and drop trailing commas
pub fn sanitize_raw_output(raw: &str) -> String {
    let mut cleaned = raw.replace("```json", "").replace("```JSON", "").replace("```", "");

    cleaned = cleaned
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    remove_trailing_commas(&cleaned).trim().to_string()
}

/// Remove commas directly before a closing `}` or `]`, leaving string contents alone
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            result.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']') | Some(',')) {
                    continue;
                }
            }
            _ => {}
        }
        result.push(ch);
    }
    result
}

/// Byte offset just past the value that opens at the start of `text`,
/// if its brackets balance
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the first parseable JSON array or object in model output
pub fn extract_json(text: &str) -> Result<String> {
    let sanitized = sanitize_raw_output(text);
    if sanitized.starts_with(['{', '['])
        && serde_json::from_str::<serde_json::Value>(&sanitized).is_ok()
    {
        return Ok(sanitized);
    }

    for (start, ch) in sanitized.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let candidate_text = &sanitized[start..];
        if let Some(end) = balanced_end(candidate_text) {
            let candidate = &candidate_text[..end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                tracing::debug!(offset = start, len = end, "Extracted JSON candidate");
                return Ok(candidate.to_string());
            }
        }
    }

    let preview: String = sanitized.chars().take(120).collect();
    bail!("Failed to extract JSON from model output: {}", preview)
}
