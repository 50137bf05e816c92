mod layout;

use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::config::ReportConfig;
use crate::error::Error;
use crate::fonts::FontSet;
use crate::markdown::field_blocks;
use crate::model::ReportRequest;

use layout::LayoutEngine;
pub use layout::{
    CONTENT_TOP, LayoutCursor, PAGE_HEIGHT, PAGE_HEIGHT_LIMIT, PAGE_WIDTH,
    SECTION_BREAK_THRESHOLD, SectionFrame,
};

const NOT_PROVIDED: &str = "Not provided";

/// Where one field's section landed in the base document.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionLayout {
    pub key: &'static str,
    pub title: &'static str,
    /// Bordered body slices, one per page the body touches.
    pub frames: Vec<SectionFrame>,
    /// True when the field was absent or blank and the placeholder was drawn.
    pub placeholder: bool,
    pub block_count: usize,
}

impl SectionLayout {
    pub fn start_page(&self) -> usize {
        self.frames.first().map_or(0, |f| f.page)
    }

    pub fn end_page(&self) -> usize {
        self.frames.last().map_or(0, |f| f.page)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentLayout {
    pub page_count: usize,
    pub sections: Vec<SectionLayout>,
}

pub(crate) struct RenderedDocument {
    pub(crate) bytes: Vec<u8>,
    pub(crate) layout: DocumentLayout,
}

fn or_not_provided(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

/// Compose the base document: title, project header, optional caption, then
/// one bordered section per field of the report type's table, in table order.
pub(crate) fn render(request: &ReportRequest, config: &ReportConfig) -> Result<RenderedDocument, Error> {
    let t0 = Instant::now();
    let report_type = request.report_type;
    let fonts = FontSet::helvetica();

    let mut engine = LayoutEngine::new(&fonts, report_type.title(), config.highlight);
    engine.project_header(
        or_not_provided(&request.project_name),
        or_not_provided(&request.responsible),
    );
    if let Some(caption) = report_type.caption() {
        engine.caption(caption);
    }

    let table = report_type.field_table();
    let mut sections = Vec::with_capacity(table.len());
    for spec in table {
        engine.begin_section(spec.title);
        let (blocks, placeholder) = field_blocks(request.field(spec.key));
        let frames = engine.render_body(&blocks);
        let cursor = engine.cursor();
        log::debug!(
            "Section {}: {} blocks, pages {}..={}, cursor y={:.1}",
            spec.key,
            blocks.len(),
            frames.first().map_or(0, |f| f.page) + 1,
            cursor.page + 1,
            cursor.y,
        );
        sections.push(SectionLayout {
            key: spec.key,
            title: spec.title,
            frames,
            placeholder,
            block_count: blocks.len(),
        });
    }

    let pages = engine.finish();
    let page_count = pages.len();
    let t_layout = t0.elapsed();

    let bytes = assemble(pages, &fonts, config.compress)?;
    let t_total = t0.elapsed();

    log::info!(
        "Render {}: layout={:.1}ms, assembly={:.1}ms, {} pages, {} bytes",
        report_type,
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        page_count,
        bytes.len(),
    );

    Ok(RenderedDocument {
        bytes,
        layout: DocumentLayout {
            page_count,
            sections,
        },
    })
}

fn assemble(pages: Vec<Content>, fonts: &FontSet, compress: bool) -> Result<Vec<u8>, Error> {
    let n = pages.len();
    if n == 0 {
        return Err(Error::Render("no pages were laid out".into()));
    }
    let count = i32::try_from(n).map_err(|_| Error::Render(format!("too many pages: {n}")))?;

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let font_pairs = fonts.register(&mut pdf, &mut alloc);

    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in pages.into_iter().enumerate() {
        let raw = c.finish();
        if compress {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        } else {
            pdf.stream(content_ids[i], raw.as_slice());
        }
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(count);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for (name, font_ref) in &font_pairs {
            font_dict.pair(Name(name.as_bytes()), *font_ref);
        }
    }

    Ok(pdf.finish())
}
