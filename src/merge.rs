use std::path::Path;
use std::time::Instant;

use lopdf::{Dictionary, Document as LoDocument, Object as LoObject, ObjectId as LoObjectId};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::error::{AttachmentError, Error};
use crate::model::Attachment;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Hops up the page tree before giving up on a malformed (cyclic) parent chain.
const MAX_TREE_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttachmentKind {
    Pdf,
    Image,
}

/// Matches on the filename suffix, so a file named just ".pdf" still counts.
fn classify(filename: &str) -> Result<AttachmentKind, AttachmentError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        return Ok(AttachmentKind::Pdf);
    }
    if [".jpg", ".jpeg", ".png"].iter().any(|ext| lower.ends_with(*ext)) {
        return Ok(AttachmentKind::Image);
    }
    let ext = Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    Err(AttachmentError::UnsupportedExtension(ext))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedAttachment {
    pub filename: String,
    pub pages: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedAttachment {
    pub filename: String,
    pub reason: AttachmentError,
}

/// What happened to each attachment, in input order within each list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: Vec<MergedAttachment>,
    pub skipped: Vec<SkippedAttachment>,
}

impl MergeReport {
    pub fn merged_count(&self) -> usize {
        self.merged.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn appended_pages(&self) -> usize {
        self.merged.iter().map(|m| m.pages).sum()
    }

    pub(crate) fn skip(&mut self, filename: &str, reason: AttachmentError) {
        self.skipped.push(SkippedAttachment {
            filename: filename.to_string(),
            reason,
        });
    }
}

pub struct MergeOutcome {
    pub bytes: Vec<u8>,
    pub report: MergeReport,
}

/// Uploads first, then existing attachments; caller order kept within each group.
pub fn ordered_attachments(attachments: &[Attachment]) -> Vec<&Attachment> {
    let mut ordered: Vec<&Attachment> = attachments.iter().collect();
    ordered.sort_by_key(|a| a.origin);
    ordered
}

fn lopdf_err(err: lopdf::Error) -> AttachmentError {
    AttachmentError::InvalidPdf(err.to_string())
}

/// An attachment's pages, renumbered and detached from their source page tree,
/// ready to be spliced into the base document.
struct PreparedPages {
    objects: Vec<(LoObjectId, LoObject)>,
    pages: Vec<(LoObjectId, Dictionary)>,
    max_id: u32,
}

fn inherited_attribute(doc: &LoDocument, page: &Dictionary, key: &[u8]) -> Option<LoObject> {
    let mut parent = page.get(b"Parent").and_then(LoObject::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(LoObject::as_reference).ok();
    }
    None
}

fn is_tree_object(object: &LoObject) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(LoObject::as_name),
        Ok(b"Catalog" | b"Pages" | b"Outlines" | b"Outline")
    )
}

fn prepare_pages(mut src: LoDocument, first_id: u32) -> Result<PreparedPages, AttachmentError> {
    if src.is_encrypted() {
        return Err(AttachmentError::Encrypted);
    }
    src.renumber_objects_with(first_id);

    let page_ids: Vec<LoObjectId> = src.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(AttachmentError::EmptyDocument);
    }

    let mut pages = Vec::with_capacity(page_ids.len());
    for &page_id in &page_ids {
        let mut dict = src.get_dictionary(page_id).map_err(lopdf_err)?.clone();
        for key in INHERITABLE {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(&src, &dict, key) {
                dict.set(key.to_vec(), value);
            }
        }
        pages.push((page_id, dict));
    }

    let objects = src
        .objects
        .into_iter()
        .filter(|(id, object)| !page_ids.contains(id) && !is_tree_object(object))
        .collect();

    Ok(PreparedPages {
        objects,
        pages,
        max_id: src.max_id,
    })
}

/// Splice prepared pages onto the end of the base page tree. Existing pages are
/// left untouched; nothing is changed if the page root can't be updated.
fn append_pages(base: &mut LoDocument, root_id: LoObjectId, prepared: PreparedPages) -> Result<usize, Error> {
    let added = prepared.pages.len();
    {
        let root = base
            .get_object_mut(root_id)
            .and_then(LoObject::as_dict_mut)
            .map_err(|e| Error::Render(format!("base page tree: {e}")))?;
        let count = root.get(b"Count").and_then(LoObject::as_i64).unwrap_or(0);
        let kids = root
            .get_mut(b"Kids")
            .and_then(LoObject::as_array_mut)
            .map_err(|e| Error::Render(format!("base page tree: {e}")))?;
        kids.extend(prepared.pages.iter().map(|(id, _)| LoObject::Reference(*id)));
        root.set("Count", LoObject::Integer(count + added as i64));
    }

    for (id, mut dict) in prepared.pages {
        dict.set("Parent", LoObject::Reference(root_id));
        base.objects.insert(id, LoObject::Dictionary(dict));
    }
    base.objects.extend(prepared.objects);
    base.max_id = base.max_id.max(prepared.max_id);
    Ok(added)
}

/// Decode a PNG/JPEG, flatten it to RGB and write it as a one-page PDF whose
/// page is the image's pixel size in points.
pub(crate) fn image_to_pdf(data: &[u8]) -> Result<Vec<u8>, AttachmentError> {
    let decoded =
        image::load_from_memory(data).map_err(|e| AttachmentError::InvalidImage(e.to_string()))?;
    if decoded.color() != image::ColorType::Rgb8 {
        log::debug!("Converting {:?} image to RGB", decoded.color());
    }
    let rgb = decoded.to_rgb8();
    let (w, h) = rgb.dimensions();
    let (Ok(wi), Ok(hi)) = (i32::try_from(w), i32::try_from(h)) else {
        return Err(AttachmentError::InvalidImage(format!("image too large: {w}x{h}")));
    };
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb.as_raw(), 6);

    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let pages_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    let mut xobj = pdf.image_xobject(image_id, &compressed);
    xobj.filter(Filter::FlateDecode);
    xobj.width(wi);
    xobj.height(hi);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    drop(xobj);

    let (pw, ph) = (w as f32, h as f32);
    let mut content = pdf_writer::Content::new();
    content.save_state();
    content.transform([pw, 0.0, 0.0, ph, 0.0, 0.0]);
    content.x_object(Name(b"Im1"));
    content.restore_state();
    pdf.stream(content_id, content.finish().as_slice());

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, pw, ph))
        .parent(pages_id)
        .contents(content_id);
    page.resources().x_objects().pair(Name(b"Im1"), image_id);
    drop(page);

    Ok(pdf.finish())
}

fn load_attachment(attachment: &Attachment) -> Result<LoDocument, AttachmentError> {
    match classify(&attachment.filename)? {
        AttachmentKind::Pdf => LoDocument::load_mem(&attachment.bytes).map_err(lopdf_err),
        AttachmentKind::Image => {
            let bytes = image_to_pdf(&attachment.bytes)?;
            LoDocument::load_mem(&bytes).map_err(lopdf_err)
        }
    }
}

fn page_root(doc: &LoDocument) -> Result<LoObjectId, Error> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(LoObject::as_reference)
        .map_err(|e| Error::Render(format!("base document has no page tree: {e}")))
}

/// Append every attachment's pages to the base document, in the given order.
///
/// An attachment that can't be read is logged, recorded in the report and
/// skipped; it never aborts the merge. With no attachments the base bytes are
/// returned as they are.
pub fn merge_attachments<'a>(
    base: Vec<u8>,
    attachments: impl IntoIterator<Item = &'a Attachment>,
) -> Result<MergeOutcome, Error> {
    let attachments: Vec<&Attachment> = attachments.into_iter().collect();
    let mut report = MergeReport::default();
    if attachments.is_empty() {
        log::info!("No attachments to merge");
        return Ok(MergeOutcome { bytes: base, report });
    }

    let t0 = Instant::now();
    log::info!("Merging {} attachments", attachments.len());
    let mut doc = LoDocument::load_mem(&base)
        .map_err(|e| Error::Render(format!("base document does not parse: {e}")))?;
    let root_id = page_root(&doc)?;

    for attachment in attachments {
        let name = attachment.filename.as_str();
        let prepared = load_attachment(attachment).and_then(|src| prepare_pages(src, doc.max_id + 1));
        match prepared {
            Ok(prepared) => {
                let pages = append_pages(&mut doc, root_id, prepared)?;
                log::info!("Attached {name}: {pages} pages");
                report.merged.push(MergedAttachment {
                    filename: name.to_string(),
                    pages,
                });
            }
            Err(reason @ AttachmentError::UnsupportedExtension(_)) => {
                log::info!("Skipping {name}: {reason}");
                report.skip(name, reason);
            }
            Err(reason) => {
                log::warn!("Failed to attach {name}: {reason}");
                report.skip(name, reason);
            }
        }
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Error::Render(format!("writing merged document: {e}")))?;

    log::info!(
        "Merge: {} attached ({} pages), {} skipped in {:.1}ms",
        report.merged_count(),
        report.appended_pages(),
        report.skipped_count(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(MergeOutcome { bytes, report })
}
