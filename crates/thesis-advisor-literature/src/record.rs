use serde::{Deserialize, Serialize};

const DISPLAY_SNIPPET_LEN: usize = 250;
const CONTEXT_SNIPPET_LEN: usize = 400;

/// One citation returned by a literature connector. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub title: String,
    pub author: String,
    pub snippet: String,
    pub link: String,
}

impl ReferenceRecord {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            snippet: snippet.into(),
            link: link.into(),
        }
    }
}

/// Numbered list for the terminal
pub fn format_for_display(records: &[ReferenceRecord]) -> String {
    if records.is_empty() {
        return "No relevant results found.".to_string();
    }

    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, record.title));
        if !record.author.is_empty() {
            lines.push(format!("   Authors: {}", record.author));
        }
        if !record.snippet.is_empty() {
            lines.push(format!(
                "   Snippet: {}",
                flatten_truncate(&record.snippet, DISPLAY_SNIPPET_LEN)
            ));
        }
        let link = if record.link.is_empty() {
            "No link"
        } else {
            &record.link
        };
        lines.push(format!("   Link:    {}", link));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Article blocks for an inference prompt
pub fn format_for_context(records: &[ReferenceRecord]) -> String {
    if records.is_empty() {
        return "No references provided.".to_string();
    }

    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!("Article {}: '{}'\n", i + 1, record.title));
        if !record.author.is_empty() {
            out.push_str(&format!("   Authors: {}\n", record.author));
        }
        if !record.snippet.is_empty() {
            out.push_str(&format!(
                "   Details: {}\n",
                flatten_truncate(&record.snippet, CONTEXT_SNIPPET_LEN)
            ));
        }
        out.push_str(&format!("   Link:    {}\n\n", record.link));
    }
    out.trim_end().to_string()
}

fn flatten_truncate(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
