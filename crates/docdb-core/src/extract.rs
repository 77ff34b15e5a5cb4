//! Markdown metadata helpers: headings, titles, synopses, keywords and id slugs.

use std::sync::LazyLock;

use regex::Regex;

pub const UNTITLED: &str = "Untitled Document";

/// Bilingual technical vocabulary. Each group is matched in text order;
/// ASCII terms only on word boundaries.
const KEYWORD_GROUPS: &[&[&str]] = &[
    &["函数", "function", "方法", "method"],
    &["类", "class", "对象", "object"],
    &["接口", "interface"],
    &["变量", "variable", "常量", "constant"],
    &["数组", "array", "列表", "list", "集合", "set", "字典", "map"],
    &["循环", "loop", "条件", "condition", "判断", "if", "for", "while"],
    &["字符串", "string", "整数", "integer", "浮点", "float", "布尔", "boolean"],
    &["并发", "concurrency", "异步", "async", "协程", "coroutine"],
    &["错误", "error", "异常", "exception", "处理", "handle"],
    &["包", "package", "模块", "module", "库", "library"],
];

static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    KEYWORD_GROUPS
        .iter()
        .filter_map(|group| {
            let (ascii, other): (Vec<&str>, Vec<&str>) = group.iter().copied().partition(|t| t.is_ascii());
            let mut alternatives = Vec::new();
            if !ascii.is_empty() {
                alternatives.push(format!(r"\b(?:{})\b", ascii.join("|")));
            }
            alternatives.extend(other.iter().map(|t| regex::escape(t)));
            Regex::new(&alternatives.join("|")).ok()
        })
        .collect()
});

static TITLE_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^#\s+(.+)$").ok());
static NOT_ID_CHAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_\p{Han}-]").ok());
static UNDERSCORES: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"_+").ok());

/// Level of a markdown heading line: a leading run of 1 to 6 `#`.
pub fn heading_level(line: &str) -> Option<usize> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    (1..=6).contains(&level).then_some(level)
}

/// Heading text with the marker run stripped.
pub fn heading_title(line: &str, level: usize) -> String {
    line[level..].trim().to_string()
}

/// Text of the first `# ` heading, or the untitled placeholder.
pub fn extract_title(content: &str) -> String {
    let Some(re) = TITLE_LINE.as_ref() else { return UNTITLED.to_string() };
    content
        .lines()
        .map(str::trim)
        .find_map(|line| re.captures(line).map(|c| c[1].trim().to_string()))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// First three prose lines joined by spaces.
pub fn extract_description(content: &str) -> String {
    prose_lines(content, false).take(3).collect::<Vec<_>>().join(" ")
}

/// Two prose lines (indented code skipped) clipped to 150 characters.
pub fn section_description(content: &str) -> String {
    let desc = prose_lines(content, true).take(2).collect::<Vec<_>>().join(" ");
    truncate_chars(&desc, 150)
}

/// Three prose lines (indented code skipped) clipped to 200 characters.
pub fn content_preview(content: &str) -> String {
    let preview = prose_lines(content, true).take(3).collect::<Vec<_>>().join(" ");
    truncate_chars(&preview, 200)
}

/// Ordered, deduplicated, lower-cased vocabulary hits.
pub fn extract_keywords(content: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for re in KEYWORD_PATTERNS.iter() {
        for m in re.find_iter(content) {
            let kw = m.as_str().trim().to_lowercase();
            if !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
    }
    keywords
}

/// Replaces characters outside `[A-Za-z0-9_-]` and Han ideographs with `_`,
/// collapses runs and trims underscores from both ends.
pub fn sanitize_id(title: &str) -> String {
    let (Some(not_id), Some(runs)) = (NOT_ID_CHAR.as_ref(), UNDERSCORES.as_ref()) else {
        return title.to_string();
    };
    let replaced = not_id.replace_all(title, "_");
    let collapsed = runs.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Keeps the first `max` characters and appends `...` when something was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Like [`truncate_chars`] but the result, ellipsis included, fits in `max` characters.
pub fn clip_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    truncate_chars(s, max.saturating_sub(3))
}

fn prose_lines(content: &str, skip_indented: bool) -> impl Iterator<Item = &str> {
    let mut in_fence = false;
    content.lines().filter_map(move |raw| {
        let line = raw.trim();
        if line.starts_with("```") {
            in_fence = !in_fence;
            return None;
        }
        if in_fence || line.is_empty() || line.starts_with('#') {
            return None;
        }
        if skip_indented && (raw.starts_with("    ") || raw.starts_with('\t')) {
            return None;
        }
        Some(line)
    })
}
