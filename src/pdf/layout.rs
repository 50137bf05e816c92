use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, FontSet, sanitize, to_winansi_bytes};
use crate::markdown::tokenize;
use crate::model::{Block, Style, StyledRun};

const MM: f32 = 72.0 / 25.4;

// A4 portrait, points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 10.0 * MM;
/// Lowest y (measured from the top edge) any content may reach.
pub const PAGE_HEIGHT_LIMIT: f32 = PAGE_HEIGHT - 20.0 * MM;
/// A section starting below this y starts on a fresh page instead.
pub const SECTION_BREAK_THRESHOLD: f32 = 250.0 * MM;
/// First y below the page title.
pub const CONTENT_TOP: f32 = MARGIN + 20.0 * MM;

const BODY_INSET: f32 = 5.0 * MM;
const BODY_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN - 10.0 * MM;
const BOX_WIDTH: f32 = BODY_WIDTH + BODY_INSET;
const INDENT_UNIT: f32 = 5.0 * MM;
const BULLET_WIDTH: f32 = 5.0 * MM;
const BODY_FONT_SIZE: f32 = 10.0;
const BODY_LINE_H: f32 = 6.0 * MM;
const BLOCK_GAP: f32 = 2.0 * MM;
const SECTION_GAP: f32 = 5.0 * MM;
const MIN_BOX_HEIGHT: f32 = 5.0 * MM;
const FLOOR_BOX_HEIGHT: f32 = 10.0 * MM;

const BLACK: [u8; 3] = [0, 0, 0];
const RULE_GREY: [u8; 3] = [200, 200, 200];

/// Where the next thing gets drawn. `y` grows downward from the top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    /// Zero-based page index.
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub page_height_limit: f32,
}

/// One page's slice of a section's bordered body (top-down coordinates).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionFrame {
    pub page: usize,
    pub top: f32,
    pub bottom: f32,
}

impl SectionFrame {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

struct WordChunk {
    style: Style,
    text: String,
    x_offset: f32, // x relative to line start
}

struct TextLine {
    chunks: Vec<WordChunk>,
}

fn finish_line(chunks: &mut Vec<WordChunk>) -> TextLine {
    TextLine {
        chunks: std::mem::take(chunks),
    }
}

/// Word-wrap styled runs into lines no wider than `max_width`.
/// No space is inserted between runs unless one side of the boundary has
/// whitespace ("bold" + ", " → "bold," not "bold ,").
fn build_lines(runs: &[StyledRun], fonts: &FontSet, font_size: f32, max_width: f32) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_chunks: Vec<WordChunk> = Vec::new();
    let mut current_x: f32 = 0.0;
    let mut prev_ended_with_ws = false;
    let mut prev_space_w: f32 = 0.0;

    for run in runs {
        let entry = fonts.get(run.style);
        let text = sanitize(&run.text);
        let space_w = entry.space_width(font_size);
        let starts_with_ws = text.starts_with(char::is_whitespace);

        for (i, word) in text.split_whitespace().enumerate() {
            let ww = entry.text_width(word, font_size);
            let need_space =
                !current_chunks.is_empty() && (i > 0 || starts_with_ws || prev_ended_with_ws);
            let effective_space_w = if i > 0 || starts_with_ws {
                space_w
            } else {
                prev_space_w
            };
            let proposed_x = if need_space {
                current_x + effective_space_w
            } else {
                current_x
            };

            if !current_chunks.is_empty() && proposed_x + ww > max_width {
                lines.push(finish_line(&mut current_chunks));
                current_x = 0.0;
            } else {
                current_x = proposed_x;
            }

            current_chunks.push(WordChunk {
                style: run.style,
                text: word.to_string(),
                x_offset: current_x,
            });
            current_x += ww;
        }

        prev_ended_with_ws = text.ends_with(char::is_whitespace);
        prev_space_w = space_w;
    }

    if !current_chunks.is_empty() {
        lines.push(finish_line(&mut current_chunks));
    }
    if lines.is_empty() {
        lines.push(TextLine { chunks: vec![] });
    }
    lines
}

/// Baseline y (top-down) of text vertically centered in a cell.
fn cell_baseline(top: f32, cell_h: f32, font_size: f32) -> f32 {
    top + cell_h / 2.0 + 0.3 * font_size
}

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

fn show_text(content: &mut Content, font: &FontEntry, size: f32, color: [u8; 3], x: f32, baseline: f32, text: &str) {
    let (r, g, b) = rgb(color);
    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(Name(font.pdf_name.as_bytes()), size);
    content.next_line(x, PAGE_HEIGHT - baseline);
    content.show(Str(&to_winansi_bytes(text)));
    content.end_text();
}

fn stroke_line(content: &mut Content, color: [u8; 3], width: f32, x1: f32, x2: f32, y: f32) {
    let (r, g, b) = rgb(color);
    content.save_state();
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(width);
    content.move_to(x1, PAGE_HEIGHT - y);
    content.line_to(x2, PAGE_HEIGHT - y);
    content.stroke();
    content.restore_state();
}

fn stroke_rect(content: &mut Content, color: [u8; 3], width: f32, x: f32, top: f32, w: f32, h: f32) {
    let (r, g, b) = rgb(color);
    content.save_state();
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(width);
    content.rect(x, PAGE_HEIGHT - top - h, w, h);
    content.stroke();
    content.restore_state();
}

/// A block ready to flow: styled runs plus where and how to draw them.
struct LineBlock {
    runs: Vec<StyledRun>,
    font_size: f32,
    line_h: f32,
    x: f32,
    width: f32,
    color: [u8; 3],
    bullet_x: Option<f32>,
    gap_after: f32,
}

/// Body state for the section currently being drawn.
struct BodyFrame {
    top: f32,
    has_content: bool,
    frames: Vec<SectionFrame>,
}

fn heading_metrics(level: u8) -> (f32, f32) {
    match level {
        1 => (12.0, 8.0 * MM),
        2 => (11.0, 7.0 * MM),
        _ => (10.0, 7.0 * MM),
    }
}

/// Owns the cursor and the page content streams for one document.
pub(crate) struct LayoutEngine<'a> {
    fonts: &'a FontSet,
    title: String,
    highlight: [u8; 3],
    cursor: LayoutCursor,
    finished: Vec<Content>,
    current: Content,
}

impl<'a> LayoutEngine<'a> {
    pub(crate) fn new(fonts: &'a FontSet, title: &str, highlight: [u8; 3]) -> Self {
        let mut engine = Self {
            fonts,
            title: sanitize(title),
            highlight,
            cursor: LayoutCursor {
                page: 0,
                x: MARGIN,
                y: CONTENT_TOP,
                page_height_limit: PAGE_HEIGHT_LIMIT,
            },
            finished: Vec::new(),
            current: Content::new(),
        };
        engine.draw_page_furniture();
        engine
    }

    pub(crate) fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    /// All page content streams, in page order.
    pub(crate) fn finish(mut self) -> Vec<Content> {
        self.finished.push(self.current);
        self.finished
    }

    fn new_page(&mut self) {
        let done = std::mem::replace(&mut self.current, Content::new());
        self.finished.push(done);
        self.cursor.page += 1;
        self.cursor.x = MARGIN;
        self.cursor.y = CONTENT_TOP;
        self.draw_page_furniture();
        log::debug!("Page break: now on page {}", self.cursor.page + 1);
    }

    fn draw_page_furniture(&mut self) {
        let bold = self.fonts.get(Style::Bold);
        let title_w = bold.text_width(&self.title, 15.0);
        let title_x = (PAGE_WIDTH - title_w) / 2.0;
        show_text(
            &mut self.current,
            bold,
            15.0,
            BLACK,
            title_x,
            cell_baseline(MARGIN, 10.0 * MM, 15.0),
            &self.title,
        );

        let italic = self.fonts.get(Style::Italic);
        let footer = format!("Page {}", self.cursor.page + 1);
        let footer_w = italic.text_width(&footer, 8.0);
        show_text(
            &mut self.current,
            italic,
            8.0,
            BLACK,
            (PAGE_WIDTH - footer_w) / 2.0,
            cell_baseline(PAGE_HEIGHT - 15.0 * MM, 10.0 * MM, 8.0),
            &footer,
        );
    }

    fn labeled_line(&mut self, label: &str, label_w: f32, value: &str) {
        let line_h = 7.0 * MM;
        let baseline = cell_baseline(self.cursor.y, line_h, 11.0);
        show_text(&mut self.current, self.fonts.get(Style::Bold), 11.0, BLACK, MARGIN, baseline, label);
        show_text(
            &mut self.current,
            self.fonts.get(Style::Plain),
            11.0,
            BLACK,
            MARGIN + label_w,
            baseline,
            &sanitize(value),
        );
        self.cursor.y += line_h;
    }

    /// Project name and responsible person, followed by a light rule.
    pub(crate) fn project_header(&mut self, project_name: &str, responsible: &str) {
        self.labeled_line("Project:", 25.0 * MM, project_name);
        self.labeled_line("Responsible:", 28.0 * MM, responsible);
        self.cursor.y += 3.0 * MM;
        stroke_line(
            &mut self.current,
            RULE_GREY,
            0.2 * MM,
            MARGIN,
            PAGE_WIDTH - MARGIN,
            self.cursor.y,
        );
        self.cursor.y += 8.0 * MM;
    }

    pub(crate) fn caption(&mut self, text: &str) {
        let cell_h = 10.0 * MM;
        show_text(
            &mut self.current,
            self.fonts.get(Style::Italic),
            10.0,
            BLACK,
            MARGIN,
            cell_baseline(self.cursor.y, cell_h, 10.0),
            &sanitize(text),
        );
        self.cursor.y += cell_h + 2.0 * MM;
    }

    /// Page-break check, then the section title and its underline.
    pub(crate) fn begin_section(&mut self, title: &str) {
        if self.cursor.y > SECTION_BREAK_THRESHOLD {
            self.new_page();
        }
        let cell_h = 10.0 * MM;
        show_text(
            &mut self.current,
            self.fonts.get(Style::Bold),
            14.0,
            self.highlight,
            MARGIN,
            cell_baseline(self.cursor.y, cell_h, 14.0),
            &sanitize(title),
        );
        self.cursor.y += cell_h;
        stroke_line(
            &mut self.current,
            self.highlight,
            0.5 * MM,
            MARGIN,
            PAGE_WIDTH - MARGIN,
            self.cursor.y,
        );
        self.cursor.y += 5.0 * MM;
    }

    /// Draw the blocks of one section body and frame them.
    ///
    /// The border is drawn after the content, once its height is known; a body
    /// that spills onto further pages gets one frame per page.
    pub(crate) fn render_body(&mut self, blocks: &[Block]) -> Vec<SectionFrame> {
        let body_x = MARGIN + BODY_INSET;
        let mut body = BodyFrame {
            top: self.cursor.y,
            has_content: false,
            frames: Vec::new(),
        };

        let mut iter = blocks.iter().peekable();
        while let Some(block) = iter.next() {
            let line_block = match block {
                Block::Heading { level, text } => {
                    let (font_size, line_h) = heading_metrics(*level);
                    LineBlock {
                        runs: vec![StyledRun::new(text.as_str(), Style::Bold)],
                        font_size,
                        line_h,
                        x: body_x,
                        width: BODY_WIDTH,
                        color: self.highlight,
                        bullet_x: None,
                        gap_after: BLOCK_GAP,
                    }
                }
                Block::Paragraph { text } => LineBlock {
                    runs: tokenize(text),
                    font_size: BODY_FONT_SIZE,
                    line_h: BODY_LINE_H,
                    x: body_x,
                    width: BODY_WIDTH,
                    color: BLACK,
                    bullet_x: None,
                    gap_after: BLOCK_GAP,
                },
                Block::ListItem { text, indent_level } => {
                    let bullet_x = body_x + *indent_level as f32 * INDENT_UNIT;
                    let text_x = bullet_x + BULLET_WIDTH;
                    let list_ends = !matches!(iter.peek(), Some(Block::ListItem { .. }));
                    LineBlock {
                        runs: tokenize(text),
                        font_size: BODY_FONT_SIZE,
                        line_h: BODY_LINE_H,
                        x: text_x,
                        width: (BODY_WIDTH - (text_x - body_x)).max(BULLET_WIDTH),
                        color: BLACK,
                        bullet_x: Some(bullet_x),
                        gap_after: if list_ends { BLOCK_GAP } else { 0.0 },
                    }
                }
            };
            self.flow_block(&mut body, &line_block);
        }

        let frame = self.close_frame(&mut body);
        self.cursor.x = MARGIN;
        self.cursor.y = (frame.bottom + SECTION_GAP).min(self.cursor.page_height_limit);
        body.frames
    }

    fn flow_block(&mut self, body: &mut BodyFrame, block: &LineBlock) {
        let lines = build_lines(&block.runs, self.fonts, block.font_size, block.width);

        // Only a line that would cross the limit moves to the next page.
        for (i, line) in lines.iter().enumerate() {
            let overflows = self.cursor.y + block.line_h > self.cursor.page_height_limit;
            if overflows && (body.has_content || self.cursor.y > CONTENT_TOP) {
                self.break_frame(body);
            }
            if i == 0
                && let Some(bullet_x) = block.bullet_x
            {
                self.cursor.x = bullet_x;
                show_text(
                    &mut self.current,
                    self.fonts.get(Style::Bold),
                    BODY_FONT_SIZE,
                    self.highlight,
                    bullet_x,
                    cell_baseline(self.cursor.y, block.line_h, BODY_FONT_SIZE),
                    "-",
                );
            }
            self.draw_line(line, block);
            self.cursor.y += block.line_h;
            body.has_content = true;
        }
        self.cursor.y = (self.cursor.y + block.gap_after).min(self.cursor.page_height_limit);
    }

    fn draw_line(&mut self, line: &TextLine, block: &LineBlock) {
        self.cursor.x = block.x;
        if line.chunks.is_empty() {
            return;
        }
        let fonts = self.fonts;
        let baseline = PAGE_HEIGHT - cell_baseline(self.cursor.y, block.line_h, block.font_size);
        let content = &mut self.current;

        let (r, g, b) = rgb(block.color);
        content.set_fill_rgb(r, g, b);
        content.begin_text();
        let mut cur_font = "";
        let mut td_x = 0.0_f32;
        let mut td_y = 0.0_f32;
        for chunk in &line.chunks {
            let entry = fonts.get(chunk.style);
            if cur_font != entry.pdf_name {
                content.set_font(Name(entry.pdf_name.as_bytes()), block.font_size);
                cur_font = entry.pdf_name;
            }
            let x = block.x + chunk.x_offset;
            content.next_line(x - td_x, baseline - td_y);
            td_x = x;
            td_y = baseline;
            content.show(Str(&to_winansi_bytes(&chunk.text)));
        }
        content.end_text();
    }

    /// Frame what is on this page so far and continue the body on a new page.
    fn break_frame(&mut self, body: &mut BodyFrame) {
        if body.has_content {
            self.close_frame(body);
        }
        self.new_page();
        body.top = self.cursor.y;
        body.has_content = false;
    }

    fn close_frame(&mut self, body: &mut BodyFrame) -> SectionFrame {
        let mut height = self.cursor.y - body.top;
        if height < MIN_BOX_HEIGHT {
            height = FLOOR_BOX_HEIGHT;
        }
        stroke_rect(
            &mut self.current,
            self.highlight,
            0.3 * MM,
            MARGIN,
            body.top,
            BOX_WIDTH,
            height,
        );
        let frame = SectionFrame {
            page: self.cursor.page,
            top: body.top,
            bottom: body.top + height,
        };
        body.frames.push(frame);
        frame
    }
}
