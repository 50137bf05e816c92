mod config;
mod error;
mod fonts;
pub mod markdown;
mod merge;
mod model;
mod pdf;

pub use config::{DEFAULT_HIGHLIGHT, ReportConfig, parse_hex_color};
pub use error::{AttachmentError, Error};
pub use merge::{
    MergeOutcome, MergeReport, MergedAttachment, SkippedAttachment, merge_attachments,
    ordered_attachments,
};
pub use model::{
    Attachment, Block, FieldSpec, Origin, ReportRequest, ReportType, Style, StyledRun,
};
pub use pdf::{
    CONTENT_TOP, DocumentLayout, LayoutCursor, PAGE_HEIGHT, PAGE_HEIGHT_LIMIT, PAGE_WIDTH,
    SECTION_BREAK_THRESHOLD, SectionFrame, SectionLayout,
};

use std::collections::BTreeMap;
use std::time::Instant;

/// A finished report plus what went into it.
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub layout: DocumentLayout,
    pub merge: MergeReport,
}

/// Compose the base report and append the attachments the report type allows.
///
/// Uploaded attachments come before existing ones. Attachments on a report
/// type that takes none are listed as skipped and the base document is
/// returned as composed.
pub fn generate_report(
    request: &ReportRequest,
    attachments: &[Attachment],
    config: &ReportConfig,
) -> Result<GeneratedReport, Error> {
    let t0 = Instant::now();
    let rendered = pdf::render(request, config)?;
    let t_render = t0.elapsed();

    let report_type = request.report_type;
    let (bytes, merge) = if report_type.accepts_attachments() {
        let outcome = merge_attachments(rendered.bytes, ordered_attachments(attachments))?;
        (outcome.bytes, outcome.report)
    } else {
        let mut merge = MergeReport::default();
        for attachment in attachments {
            log::info!("Skipping {}: {report_type} takes no attachments", attachment.filename);
            merge.skip(&attachment.filename, AttachmentError::NotPermitted(report_type));
        }
        (rendered.bytes, merge)
    };
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, merge={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(GeneratedReport {
        bytes,
        layout: rendered.layout,
        merge,
    })
}

/// One-call entry point: parse the report type, build the request and return
/// the finished PDF bytes with the default look.
pub fn generate(
    report_type: &str,
    project_name: &str,
    responsible: &str,
    field_values: BTreeMap<String, String>,
    attachments: &[Attachment],
) -> Result<Vec<u8>, Error> {
    let report_type: ReportType = report_type.parse()?;
    let request = ReportRequest::new(report_type, project_name, responsible, field_values)?;
    generate_report(&request, attachments, &ReportConfig::default()).map(|report| report.bytes)
}
