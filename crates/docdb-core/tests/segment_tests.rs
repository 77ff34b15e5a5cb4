use docdb_core::config::SegmentConfig;
use docdb_core::scanner::{parse_document, RawFile};
use docdb_core::segment::Segmenter;
use docdb_core::types::Document;

fn doc(path: &str, text: &str) -> Document {
    parse_document(&RawFile::from_text(path, text)).expect("parse")
}

fn filler(n: usize) -> String {
    "a".repeat(n)
}

fn small_limits() -> Segmenter {
    Segmenter::new(SegmentConfig { enabled: true, large_document_threshold: 200, max_section_size: 100 })
}

#[test]
fn small_document_is_returned_unchanged() {
    let original = doc("manual/function/small.md", "# Small\n\n## One\nbody\n## Two\nbody\n");
    let out = Segmenter::default().segment(original.clone());
    assert_eq!(out, vec![original]);
    assert!(out[0].prerequisites.is_empty());
}

#[test]
fn oversized_document_splits_into_sections_and_subsections() {
    let text = format!(
        "# Guide\n## A\n{}\n## B\n{}\n## C\n{}\n## D\n### D1\n{}\n### D2\n{}\n",
        filler(3_000),
        filler(8_000),
        filler(9_000),
        filler(6_000),
        filler(6_000)
    );
    let parent = doc("manual/generic/guide.md", &text);
    let out = Segmenter::default().segment(parent.clone());

    let titles: Vec<&str> = out.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C", "D - D1", "D - D2"]);
    for part in &out {
        assert_eq!(part.prerequisites, vec![parent.id.clone()]);
        assert!(part.content.chars().count() <= 20_000);
        assert!(parent.content.contains(part.content.trim_end()));
        assert_eq!(part.relative_path, parent.relative_path);
    }
    assert_eq!(out[0].id, "manual_generic_guide_A_1");
    assert_eq!(out[3].id, "manual_generic_guide_D_4_0");
    assert_eq!(out[4].full_path_id, "manual/generic/guide#D_4_1");
}

#[test]
fn large_document_with_few_small_sections_stays_whole() {
    let text = format!("# T\n## A\n{}\n## B\n{}\n", filler(95), filler(95));
    let original = doc("extra/few.md", &text);
    let out = small_limits().segment(original.clone());
    assert_eq!(out, vec![original]);
}

#[test]
fn headingless_large_document_falls_back_to_original() {
    let original = doc("extra/flat.md", &filler(500));
    let out = small_limits().segment(original.clone());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, original.id);
}

#[test]
fn oversized_section_without_subheadings_is_kept_whole() {
    let text = format!(
        "## A\n{}\n## B\nb\n## C\nc\n## D\nd\n## E\ne\n## F\nf\n",
        filler(180)
    );
    let out = small_limits().segment(doc("extra/wide.md", &text));
    assert_eq!(out.len(), 6);
    assert_eq!(out[0].title, "A");
    assert_eq!(out[0].content.trim_end(), filler(180));
}

#[test]
fn subsections_at_twice_the_limit_are_dropped() {
    let text = format!(
        "## A\n### keep\n{}\n### drop\n{}\n## B\n{}\n",
        filler(50),
        filler(250),
        filler(10)
    );
    let out = small_limits().segment(doc("extra/drop.md", &text));
    let titles: Vec<&str> = out.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["A - keep", "B"]);
}

#[test]
fn derived_documents_are_never_split_again() {
    let text = format!("## A\n{}\n## B\n{}\n## C\n{}\n## D\n{}\n## E\n{}\n## F\n{}\n",
        filler(60), filler(60), filler(60), filler(60), filler(60), filler(60));
    let segmenter = small_limits();
    let parts = segmenter.segment(doc("extra/six.md", &text));
    assert_eq!(parts.len(), 6);
    let again = segmenter.segment(parts[0].clone());
    assert_eq!(again, vec![parts[0].clone()]);
}

#[test]
fn disabled_segmenter_is_identity() {
    let text = format!("## A\n{}\n## B\n{}\n", filler(300), filler(300));
    let original = doc("extra/off.md", &text);
    let segmenter = Segmenter::new(SegmentConfig { enabled: false, ..SegmentConfig::default() });
    assert_eq!(segmenter.segment(original.clone()), vec![original]);
}

#[test]
fn toc_tracks_levels_lines_and_title() {
    let toc = Segmenter::default().parse_toc("preamble\n# Top\nintro\n## 2.1 Foo\nx\n### deep\ny\n## 2.2 Bar\nz", "d");
    let levels: Vec<usize> = toc.sections.iter().map(|s| s.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 2]);
    assert_eq!(toc.title.as_deref(), Some("Top"));
    assert_eq!(toc.sections[1].line_number, 4);
    assert_eq!(toc.sections[1].content, "x\n### deep\ny");
    assert_eq!(toc.sections[2].content, "y");
    assert_eq!(toc.sections[0].id, "d_section_1");
    assert!(!toc.oversized);
}
