mod inline;
mod normalize;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::model::Block;

pub use inline::tokenize;
pub use normalize::{PLACEHOLDER, normalize};

pub(crate) use inline::has_visible_text;

/// List items are drawn one indent unit in from the body edge, whatever their nesting.
pub const LIST_INDENT_LEVEL: u8 = 1;

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        _ => 3,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Default)]
struct Classifier {
    blocks: Vec<Block>,
    buf: String,
    heading: Option<u8>,
    item_depth: usize,
}

impl Classifier {
    fn emit_text_block(&mut self, make: impl FnOnce(String) -> Block) {
        let text = collapse_whitespace(&self.buf);
        self.buf.clear();
        if has_visible_text(&text) {
            self.blocks.push(make(text));
        }
    }

    fn flush_item(&mut self) {
        self.emit_text_block(|text| Block::ListItem {
            text,
            indent_level: LIST_INDENT_LEVEL,
        });
    }

    fn push_marker(&mut self, marker: &str) {
        // Headings are drawn bold already; they carry plain text.
        if self.heading.is_none() {
            self.buf.push_str(marker);
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if self.item_depth == 0 => {
                self.buf.clear();
                self.heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) if self.item_depth == 0 => {
                if let Some(level) = self.heading.take() {
                    let text = collapse_whitespace(&self.buf);
                    self.buf.clear();
                    if !text.is_empty() {
                        self.blocks.push(Block::Heading { level, text });
                    }
                }
            }
            Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock(_)) => {
                if self.item_depth > 0 && !self.buf.is_empty() {
                    self.buf.push(' ');
                }
            }
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::CodeBlock) => {
                if self.item_depth == 0 {
                    self.emit_text_block(|text| Block::Paragraph { text });
                }
            }
            Event::Start(Tag::List(_)) => {
                // A nested list ends the parent item's own text.
                if self.item_depth > 0 {
                    self.flush_item();
                }
            }
            Event::Start(Tag::Item) => {
                self.item_depth += 1;
            }
            Event::End(TagEnd::Item) => {
                self.flush_item();
                self.item_depth = self.item_depth.saturating_sub(1);
            }
            Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => self.push_marker("**"),
            Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => self.push_marker("_"),
            Event::Text(text) | Event::Code(text) => self.buf.push_str(&text),
            Event::SoftBreak | Event::HardBreak => self.buf.push(' '),
            _ => {}
        }
    }
}

/// Parse normalized markdown and flatten it into blocks, in source order.
///
/// Headings deeper than level 3 clamp to 3. Every list item, nested or not,
/// becomes one `ListItem` at [`LIST_INDENT_LEVEL`]. Blocks without visible
/// text are dropped.
pub fn classify(text: &str) -> Vec<Block> {
    let mut classifier = Classifier::default();
    for event in Parser::new_ext(text, Options::empty()) {
        classifier.handle(event);
    }
    classifier.blocks
}

/// Blocks for one field's raw value. Never empty: a blank value, or one with
/// nothing renderable in it, yields the placeholder paragraph. The flag is
/// true when the placeholder was used.
pub fn field_blocks(raw: Option<&str>) -> (Vec<Block>, bool) {
    let blocks = classify(&normalize(raw));
    if normalize::is_blank(raw) || blocks.is_empty() {
        let placeholder = Block::Paragraph {
            text: PLACEHOLDER.to_string(),
        };
        return (vec![placeholder], true);
    }
    (blocks, false)
}
