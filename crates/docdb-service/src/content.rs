use regex::Regex;
use serde::Serialize;

use docdb_core::error::{Error, Result};
use docdb_core::extract::heading_level;
use docdb_core::store::DocumentStore;
use docdb_core::types::{Category, Difficulty, Document};

use crate::request::{ContentFormat, ContentParams};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct ContentJson<'a> {
    document_id: &'a str,
    title: &'a str,
    category: Category,
    subcategory: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata<'a>>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    description: &'a str,
    difficulty: Difficulty,
    keywords: &'a [String],
    relative_path: &'a str,
    file_size: u64,
    last_modified: String,
}

/// Renders a document, or one section of it, in the requested format.
pub fn get_content(store: &DocumentStore, params: &ContentParams) -> Result<String> {
    params.validate()?;
    let doc = store
        .resolve(&params.doc_id)
        .ok_or_else(|| Error::NotFound(format!("document not found: {}", params.doc_id)))?;

    let body = match params.section.as_deref().filter(|s| !s.is_empty()) {
        Some(section) => extract_section(&doc.content, section),
        None => doc.content.clone(),
    };

    match params.format {
        ContentFormat::Json => render_json(doc, &params.doc_id, &body, params.include_metadata),
        ContentFormat::Plain if params.include_metadata => Ok(format!(
            "Title: {}\nCategory: {}/{}\nDifficulty: {}\nDescription: {}\n\n{}",
            doc.title, doc.category, doc.subcategory, doc.difficulty, doc.description, body
        )),
        ContentFormat::Markdown if params.include_metadata => Ok(render_markdown(doc, &body)),
        _ => Ok(body),
    }
}

fn render_json(doc: &Document, requested_id: &str, body: &str, include_metadata: bool) -> Result<String> {
    let metadata = include_metadata.then(|| Metadata {
        description: &doc.description,
        difficulty: doc.difficulty,
        keywords: &doc.keywords,
        relative_path: &doc.relative_path,
        file_size: doc.file_size,
        last_modified: doc.last_modified.format(TIME_FORMAT).to_string(),
    });
    let json = ContentJson {
        document_id: requested_id,
        title: &doc.title,
        category: doc.category,
        subcategory: &doc.subcategory,
        content: body,
        metadata,
    };
    serde_json::to_string_pretty(&json).map_err(|e| Error::Operation(format!("failed to encode content: {}", e)))
}

fn render_markdown(doc: &Document, body: &str) -> String {
    format!(
        "# {}\n\n## Metadata\n- **Category**: {}\n- **Subcategory**: {}\n- **Difficulty**: {}\n- **File path**: {}\n- **Last modified**: {}\n- **Keywords**: {}\n\n## Description\n{}\n\n## Content\n{}",
        doc.title,
        doc.category,
        doc.subcategory,
        doc.difficulty,
        doc.relative_path,
        doc.last_modified.format(TIME_FORMAT),
        doc.keywords.join(", "),
        doc.description,
        body
    )
}

/// Lines from the heading that starts with `section` up to the next heading at
/// the section's depth or above. Depth is one plus the number of `.` in
/// `section`, so `2.1` stops at the next `##` or `#`.
pub fn extract_section(content: &str, section: &str) -> String {
    let not_found = || format!("Section not found: {}", section);
    let Ok(start) = Regex::new(&format!(r"^(#{{1,6}})\s+{}", regex::escape(section))) else {
        return not_found();
    };
    let depth = 1 + section.matches('.').count();

    let mut lines: Vec<&str> = Vec::new();
    let mut inside = false;
    for line in content.split('\n') {
        if start.is_match(line) {
            inside = true;
            lines.push(line);
            continue;
        }
        if !inside {
            continue;
        }
        if let Some(level) = heading_level(line) {
            if level < 6 && level <= depth {
                break;
            }
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return not_found();
    }
    lines.join("\n")
}
