use std::collections::BTreeMap;
use std::fmt::Write;

use docdb_core::config::Taxonomy;
use docdb_core::extract::clip_chars;
use docdb_core::store::DocumentStore;
use docdb_core::types::{Category, Document};

use crate::request::{ListParams, SortBy};

const DESCRIPTION_CHARS: usize = 50;
const PREVIEW_CHARS: usize = 80;

/// Markdown table for a slash-separated path below a category.
///
/// Depth 0 lists subcategories, depth 1 the directories of one subcategory and
/// deeper paths the documents below them. Derived sections never appear.
pub fn list_documents(store: &DocumentStore, taxonomy: &Taxonomy, params: &ListParams) -> String {
    let parts = params.path_parts();
    match parts.as_slice() {
        [] => list_subcategories(store, taxonomy, params.category),
        [sub] => list_directories(store, taxonomy, params.category, sub),
        _ => list_at_path(store, taxonomy, params, &parts),
    }
}

fn top_level_in(store: &DocumentStore, category: Category) -> impl Iterator<Item = &Document> {
    store.top_level().filter(move |d| d.category == category)
}

fn list_subcategories(store: &DocumentStore, taxonomy: &Taxonomy, category: Category) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total = 0;
    for doc in top_level_in(store, category) {
        *counts.entry(doc.subcategory.as_str()).or_insert(0) += 1;
        total += 1;
    }

    let mut out = format!("📋 {}\n\n| Subcategory | Documents |\n|---|---|\n", taxonomy.category_name(category));
    for (sub, count) in &counts {
        let name = if sub.is_empty() { "(none)" } else { *sub };
        let _ = writeln!(out, "| {} | {} |", name, count);
    }
    let _ = writeln!(out, "\n📊 {} subcategories | {} top-level documents", counts.len(), total);
    out
}

fn list_directories(store: &DocumentStore, taxonomy: &Taxonomy, category: Category, sub: &str) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in top_level_in(store, category).filter(|d| d.subcategory == sub) {
        let parts: Vec<&str> = doc.relative_path.split('/').collect();
        // category/sub/dir/.../file
        if parts.len() > 3 {
            *counts.entry(parts[2]).or_insert(0) += 1;
        }
    }

    let mut out = format!(
        "📋 {} / {}\n\n| Directory | Documents |\n|---|---|\n",
        taxonomy.category_name(category),
        sub
    );
    for (dir, count) in &counts {
        let _ = writeln!(out, "| {} | {} |", dir, count);
    }
    let _ = writeln!(
        out,
        "\n📊 {} directories | use '{}/{}/<directory>' to drill down",
        counts.len(),
        category,
        sub
    );
    out
}

fn list_at_path(store: &DocumentStore, taxonomy: &Taxonomy, params: &ListParams, parts: &[&str]) -> String {
    let mut docs: Vec<&Document> = top_level_in(store, params.category)
        .filter(|d| d.subcategory == parts[0])
        .filter(|d| {
            let doc_parts: Vec<&str> = d.relative_path.split('/').collect();
            doc_parts.len() >= parts.len() + 2 && parts.iter().enumerate().all(|(i, p)| doc_parts[i + 1] == *p)
        })
        .collect();
    sort_documents(&mut docs, params.sort_by);

    let max = params.max_items();
    docs.truncate(max);

    let path = parts.join("/");
    let mut out = format!("📋 {} / {} ({} docs)\n\n", taxonomy.category_name(params.category), path, docs.len());
    if params.include_preview {
        out.push_str("| ID | Title | Difficulty | Description | Preview |\n|---|---|---|---|---|\n");
    } else {
        out.push_str("| ID | Title | Difficulty | Description |\n|---|---|---|---|\n");
    }
    for doc in &docs {
        let description = cell(&clip_chars(&doc.description, DESCRIPTION_CHARS));
        if params.include_preview {
            let preview = cell(&clip_chars(&doc.content, PREVIEW_CHARS));
            let _ = writeln!(out, "| {} | {} | {} | {} | {} |", doc.id, doc.title, doc.difficulty, description, preview);
        } else {
            let _ = writeln!(out, "| {} | {} | {} | {} |", doc.id, doc.title, doc.difficulty, description);
        }
    }
    let _ = writeln!(out, "\n📊 sorted by: {} | showing: {}/{}", params.sort_by.as_str(), docs.len(), max);
    out
}

/// Keeps a value on one table row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn sort_documents(docs: &mut [&Document], sort_by: SortBy) {
    match sort_by {
        SortBy::Title => docs.sort_by(|a, b| a.title.cmp(&b.title)),
        SortBy::Difficulty => docs.sort_by(|a, b| a.difficulty.cmp(&b.difficulty).then_with(|| a.title.cmp(&b.title))),
        SortBy::LastModified => docs.sort_by(|a, b| b.last_modified.cmp(&a.last_modified)),
    }
}
