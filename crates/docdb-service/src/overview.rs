//! Category overview, document map and navigation tree views.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;

use docdb_core::config::Taxonomy;
use docdb_core::extract::clip_chars;
use docdb_core::store::DocumentStore;
use docdb_core::types::{Category, Document, DocumentSummary};

const TREE_DESCRIPTION_CHARS: usize = 60;

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_documents: usize,
    pub categories: Vec<CategoryOverview>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    pub name: Category,
    pub display_name: String,
    pub count: usize,
    pub subcategories: Vec<SubcategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryCount {
    pub name: String,
    pub count: usize,
}

/// Counts for one category, derived sections included.
pub fn overview(store: &DocumentStore, taxonomy: &Taxonomy, category: Category) -> Overview {
    let mut subcategories: BTreeMap<&str, usize> = BTreeMap::new();
    let mut count = 0;
    for doc in store.in_category(category) {
        count += 1;
        *subcategories.entry(doc.subcategory.as_str()).or_insert(0) += 1;
    }
    Overview {
        total_documents: store.len(),
        categories: vec![CategoryOverview {
            name: category,
            display_name: taxonomy.category_name(category).to_string(),
            count,
            subcategories: subcategories
                .into_iter()
                .map(|(name, count)| SubcategoryCount { name: name.to_string(), count })
                .collect(),
        }],
        generated_at: timestamp(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMap {
    pub map_type: &'static str,
    /// category -> subcategory -> summaries
    pub categories: BTreeMap<Category, BTreeMap<String, Vec<DocumentSummary>>>,
    pub total_docs: usize,
    pub generated_at: String,
}

/// Top-level documents grouped by subcategory, at most `max_items / 5` per group.
pub fn document_map(store: &DocumentStore, category: Category, max_items: usize) -> DocumentMap {
    let per_group = max_items / 5;
    let mut groups: BTreeMap<String, Vec<DocumentSummary>> = BTreeMap::new();
    for doc in store.top_level().filter(|d| d.category == category) {
        let group = groups.entry(doc.subcategory.clone()).or_default();
        if group.len() < per_group {
            group.push(doc.summary());
        }
    }
    let mut categories = BTreeMap::new();
    if !groups.is_empty() {
        categories.insert(category, groups);
    }
    DocumentMap { map_type: "document_hierarchy", categories, total_docs: store.len(), generated_at: timestamp() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Subcategory { count: usize },
    Directory,
    Document { description: String },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: NodeKind,
    children: Vec<usize>,
}

/// Navigation tree stored as an arena; nodes refer to children by index.
#[derive(Debug, Default)]
pub struct NavTree {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    by_key: HashMap<String, usize>,
    documents: usize,
}

impl NavTree {
    /// Builds the tree of one category from its top-level documents in id order.
    /// The document count in the header includes derived sections.
    ///
    /// With a subcategory, the path below it becomes directories; otherwise every
    /// directory below the category does.
    pub fn build(store: &DocumentStore, category: Category) -> Self {
        let docs: Vec<&Document> = store.top_level().filter(|d| d.category == category).collect();
        let mut sub_counts: HashMap<&str, usize> = HashMap::new();
        for &doc in &docs {
            *sub_counts.entry(doc.subcategory.as_str()).or_insert(0) += 1;
        }

        // header count covers derived sections too
        let mut tree = Self { documents: store.in_category(category).count(), ..Self::default() };
        for doc in docs {
            let parts: Vec<&str> = doc.relative_path.split('/').collect();
            let (mut parent, dir_start) = if doc.subcategory.is_empty() {
                (None, 1)
            } else {
                let count = sub_counts.get(doc.subcategory.as_str()).copied().unwrap_or(0);
                let key = format!("{}/{}", category, doc.subcategory);
                let id = tree.node(None, key, &doc.subcategory, NodeKind::Subcategory { count });
                (Some(id), 2)
            };
            let dir_end = parts.len().saturating_sub(1);
            for i in dir_start..dir_end {
                let key = parts[..=i].join("/");
                parent = Some(tree.node(parent, key, parts[i], NodeKind::Directory));
            }
            let leaf = tree.push(Node {
                name: doc.title.clone(),
                kind: NodeKind::Document { description: doc.description.clone() },
                children: Vec::new(),
            });
            tree.attach(parent, leaf);
        }
        tree
    }

    /// Existing node for `key`, or a new one attached under `parent`.
    fn node(&mut self, parent: Option<usize>, key: String, name: &str, kind: NodeKind) -> usize {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.push(Node { name: name.to_string(), kind, children: Vec::new() });
        self.by_key.insert(key, id);
        self.attach(parent, id);
        id
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: Option<usize>, child: usize) {
        match parent {
            Some(p) => self.nodes[p].children.push(child),
            None => self.roots.push(child),
        }
    }

    /// Text rendering with box-drawing connectors. `level` limits the depth; 0 means unlimited.
    pub fn render(&self, title: &str, level: usize) -> String {
        let mut out = format!("📚 {} ({} docs)\n\n", title, self.documents);
        self.render_level(&self.roots, "", 1, level, &mut out);
        out
    }

    fn render_level(&self, ids: &[usize], prefix: &str, depth: usize, level: usize, out: &mut String) {
        if level > 0 && depth > level {
            return;
        }
        for (i, &id) in ids.iter().enumerate() {
            let node = &self.nodes[id];
            let last = i + 1 == ids.len();
            let label = match &node.kind {
                NodeKind::Subcategory { count } if *count > 0 => format!("{} ({} docs)", node.name, count),
                NodeKind::Document { description } if !description.is_empty() => {
                    format!("{} - {}", node.name, clip_chars(description, TREE_DESCRIPTION_CHARS))
                }
                _ => node.name.clone(),
            };
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&label);
            out.push('\n');
            if !node.children.is_empty() {
                let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
                self.render_level(&node.children, &child_prefix, depth + 1, level, out);
            }
        }
    }
}

pub fn navigation_tree(store: &DocumentStore, taxonomy: &Taxonomy, category: Category, level: usize) -> String {
    NavTree::build(store, category).render(taxonomy.category_name(category), level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdb_core::scanner::{parse_document, RawFile};
    use docdb_core::segment::Segmenter;

    fn parse(path: &str, text: &str) -> Document {
        parse_document(&RawFile::from_text(path, text)).unwrap()
    }

    #[test]
    fn tree_header_counts_derived_sections() {
        let large = format!("# Guide\n## A\n{}\n## B\n{}\n", "a".repeat(8_000), "b".repeat(8_000));
        let mut docs = Segmenter::default().segment(parse("libs/std/guide.md", &large));
        assert_eq!(docs.len(), 2);
        docs.push(parse("libs/std/collection/array.md", "# ArrayList\n\nGrowable array.\n"));
        let store = DocumentStore::from_documents(docs);

        let tree = navigation_tree(&store, &Taxonomy::default(), Category::Libs, 0);
        assert!(tree.starts_with("📚 Standard Library API (3 docs)\n\n"));
        assert!(tree.contains("└── std (1 docs)\n"));
        assert!(tree.contains("ArrayList - Growable array."));
    }
}
