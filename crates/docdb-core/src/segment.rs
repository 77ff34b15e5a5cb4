//! Recursive, heading-based segmentation of oversized markdown documents.
//!
//! A document at or above `large_document_threshold` characters is replaced by
//! one document per level-1/2 section. Sections larger than `max_section_size`
//! are subdivided once more along their level-3+ headings; nothing is split a
//! third time. Every emitted document points back to its parent through
//! `prerequisites`.

use tracing::debug;

use crate::config::SegmentConfig;
use crate::extract::{
    content_preview, extract_keywords, heading_level, heading_title, sanitize_id, section_description,
};
use crate::types::{Document, Section, TableOfContents};

#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentConfig,
}

impl Segmenter {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Builds the heading outline of `content`.
    ///
    /// Text before the first heading belongs to no section. Level-1 and level-2
    /// sections run until the next heading of level 2 or above; deeper sections
    /// run until the next heading at their own level or above, so a level-2
    /// section includes the text of its level-3 children.
    pub fn parse_toc(&self, content: &str, doc_id: &str) -> TableOfContents {
        let lines: Vec<&str> = content.split('\n').collect();
        let headings: Vec<(usize, usize)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| heading_level(line).map(|level| (i, level)))
            .collect();

        let mut sections = Vec::with_capacity(headings.len());
        for (pos, &(line_idx, level)) in headings.iter().enumerate() {
            let bound = level.max(2);
            let end = headings[pos + 1..]
                .iter()
                .find(|(_, l)| *l <= bound)
                .map(|(i, _)| *i)
                .unwrap_or(lines.len());
            let body = lines[line_idx + 1..end].join("\n");
            sections.push(Section {
                id: format!("{}_section_{}", doc_id, pos + 1),
                title: heading_title(lines[line_idx], level),
                level,
                line_number: line_idx + 1,
                char_count: body.chars().count(),
                content: body,
            });
        }

        let total_chars = content.chars().count();
        let title = sections.first().filter(|s| s.level == 1).map(|s| s.title.clone());
        TableOfContents {
            doc_id: doc_id.to_string(),
            title,
            sections,
            total_chars,
            oversized: total_chars >= self.config.large_document_threshold,
        }
    }

    /// Splits `doc` into section documents when it is too large; otherwise returns it unchanged.
    /// The result is never empty.
    pub fn segment(&self, doc: Document) -> Vec<Document> {
        if !self.config.enabled || doc.is_derived() {
            return vec![doc];
        }
        let toc = self.parse_toc(&doc.content, &doc.id);
        if !toc.oversized {
            return vec![doc];
        }

        let max = self.config.max_section_size;
        if toc.sections.len() <= 5 && toc.sections.iter().all(|s| s.char_count < max) {
            debug!(doc = %doc.id, sections = toc.sections.len(), "large document kept whole");
            return vec![doc];
        }

        let mut out = Vec::new();
        for (index, section) in toc.sections.iter().enumerate() {
            if section.level > 2 || section.content.trim().is_empty() {
                continue;
            }
            if section.char_count > max {
                out.extend(self.split_large_section(&doc, section, index));
            } else {
                out.push(section_document(&doc, section, index));
            }
        }

        if out.is_empty() {
            debug!(doc = %doc.id, "segmentation produced nothing, keeping original");
            return vec![doc];
        }
        debug!(doc = %doc.id, parts = out.len(), "document segmented");
        out
    }

    /// Cuts an oversized section along its level-3+ headings. Text before the
    /// first such heading is dropped, as are sub-sections still at or above
    /// twice the section limit. Falls back to the whole section when nothing
    /// usable is found.
    fn split_large_section(&self, doc: &Document, section: &Section, index: usize) -> Vec<Document> {
        let mut subs: Vec<Document> = Vec::new();
        let mut current: Option<(Section, Vec<&str>)> = None;

        for (offset, line) in section.content.split('\n').enumerate() {
            match heading_level(line) {
                Some(level) if level >= 3 => {
                    self.flush_sub(doc, section, index, current.take(), &mut subs);
                    current = Some((
                        Section {
                            id: format!("{}_sub_{}_{}", doc.id, index, subs.len()),
                            title: heading_title(line, level),
                            level,
                            line_number: section.line_number + offset + 1,
                            content: String::new(),
                            char_count: 0,
                        },
                        Vec::new(),
                    ));
                }
                _ => {
                    if let Some((_, body)) = current.as_mut() {
                        body.push(line);
                    }
                }
            }
        }
        self.flush_sub(doc, section, index, current.take(), &mut subs);

        if subs.is_empty() {
            return vec![section_document(doc, section, index)];
        }
        subs
    }

    fn flush_sub(
        &self,
        doc: &Document,
        section: &Section,
        index: usize,
        current: Option<(Section, Vec<&str>)>,
        subs: &mut Vec<Document>,
    ) {
        let Some((mut sub, body)) = current else { return };
        sub.content = body.join("\n");
        if sub.content.is_empty() {
            return;
        }
        sub.char_count = sub.content.chars().count();
        if sub.char_count < self.config.max_section_size * 2 {
            subs.push(sub_section_document(doc, section, &sub, index, subs.len()));
        }
    }
}

fn section_document(doc: &Document, section: &Section, index: usize) -> Document {
    let suffix = format!("{}_{}", sanitize_id(&section.title), index);
    derived_document(doc, suffix, section.title.clone(), &section.content)
}

fn sub_section_document(doc: &Document, parent: &Section, sub: &Section, index: usize, sub_index: usize) -> Document {
    let suffix = format!("{}_{}_{}", sanitize_id(&parent.title), index, sub_index);
    let title = format!("{} - {}", parent.title, sub.title);
    derived_document(doc, suffix, title, &sub.content)
}

fn derived_document(doc: &Document, suffix: String, title: String, content: &str) -> Document {
    Document {
        id: format!("{}_{}", doc.id, suffix),
        full_path_id: format!("{}#{}", doc.full_path_id, suffix),
        title,
        category: doc.category,
        subcategory: doc.subcategory.clone(),
        description: section_description(content),
        keywords: extract_keywords(content),
        file_path: doc.file_path.clone(),
        relative_path: doc.relative_path.clone(),
        difficulty: doc.difficulty,
        file_size: content.len() as u64,
        last_modified: doc.last_modified,
        content: content.to_string(),
        content_preview: content_preview(content),
        prerequisites: vec![doc.id.clone()],
        related: Vec::new(),
    }
}
