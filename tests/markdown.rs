use tpm_report::markdown::{LIST_INDENT_LEVEL, PLACEHOLDER, classify, field_blocks, tokenize};
use tpm_report::{Block, Style, StyledRun};

fn para(text: &str) -> Block {
    Block::Paragraph { text: text.into() }
}

fn item(text: &str) -> Block {
    Block::ListItem {
        text: text.into(),
        indent_level: LIST_INDENT_LEVEL,
    }
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.into(),
    }
}

#[test]
fn classifies_blocks_in_source_order() {
    let blocks = classify("# Overview\n\nFirst paragraph.\n\n- one\n- two\n\n## Details\n\nLast.");
    assert_eq!(
        blocks,
        vec![
            heading(1, "Overview"),
            para("First paragraph."),
            item("one"),
            item("two"),
            heading(2, "Details"),
            para("Last."),
        ]
    );
}

#[test]
fn deep_headings_clamp_to_level_three() {
    assert_eq!(classify("#### Four"), vec![heading(3, "Four")]);
    assert_eq!(classify("###### Six"), vec![heading(3, "Six")]);
}

#[test]
fn nested_items_flatten_to_one_level() {
    let blocks = classify("- parent\n  - child\n- sibling");
    assert_eq!(blocks, vec![item("parent"), item("child"), item("sibling")]);
}

#[test]
fn emphasis_survives_as_markers() {
    assert_eq!(classify("Some **bold** and _soft_ words"), vec![para("Some **bold** and _soft_ words")]);
    assert_eq!(classify("- a **key** point"), vec![item("a **key** point")]);
}

#[test]
fn headings_drop_emphasis() {
    assert_eq!(classify("## The **big** one"), vec![heading(2, "The big one")]);
}

#[test]
fn soft_breaks_join_lines() {
    assert_eq!(classify("line one\nline two"), vec![para("line one line two")]);
}

#[test]
fn blank_field_yields_placeholder() {
    for raw in [None, Some(""), Some("   \n  ")] {
        let (blocks, placeholder) = field_blocks(raw);
        assert!(placeholder);
        assert_eq!(blocks, vec![para(PLACEHOLDER)]);
    }
}

#[test]
fn field_without_visible_text_yields_placeholder() {
    let (blocks, placeholder) = field_blocks(Some("<!-- nothing to see -->"));
    assert!(placeholder);
    assert_eq!(blocks, vec![para(PLACEHOLDER)]);
}

#[test]
fn field_with_text_is_not_placeholder() {
    let (blocks, placeholder) = field_blocks(Some("-sensor\n-gateway"));
    assert!(!placeholder);
    assert_eq!(blocks, vec![item("sensor"), item("gateway")]);
}

#[test]
fn tokenize_splits_styles() {
    assert_eq!(
        tokenize("**bold** and _italic_ and plain"),
        vec![
            StyledRun::new("bold", Style::Bold),
            StyledRun::new(" and ", Style::Plain),
            StyledRun::new("italic", Style::Italic),
            StyledRun::new(" and plain", Style::Plain),
        ]
    );
}

#[test]
fn tokenize_keeps_stray_delimiters() {
    assert_eq!(tokenize("a **b"), vec![StyledRun::new("a **b", Style::Plain)]);
    assert_eq!(tokenize("x_y"), vec![StyledRun::new("x_y", Style::Plain)]);
}

#[test]
fn any_close_returns_to_plain() {
    assert_eq!(
        tokenize("**a _b** c_"),
        vec![
            StyledRun::new("a ", Style::Bold),
            StyledRun::new("b", Style::Italic),
            StyledRun::new(" c", Style::Plain),
        ]
    );
}

#[test]
fn tokenize_empty_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("****").is_empty());
}
