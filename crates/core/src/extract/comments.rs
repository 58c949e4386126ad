//! Reviewer comments and the text they are attached to.

use serde::Serialize;
use tracing::debug;

use crate::annotation::Annotation;
use crate::document::PdfDocument;
use crate::error::Result;
use crate::params::ExtractParams;
use crate::text::PageText;

use super::page::PageContent;

/// A comment annotation with the passage it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    /// 1-based page number.
    pub page: usize,
    /// Marked-up text for text-markup annotations, otherwise the subject.
    pub reference: String,
    /// The comment typed by the reviewer.
    pub text: String,
}

/// Collects every annotation with a non-empty comment, in page order then
/// /Annots order.
pub fn extract_comments(doc: &PdfDocument, params: &ExtractParams) -> Result<Vec<CommentRecord>> {
    let mut records = Vec::new();
    for page in doc.pages() {
        let page = page?;
        // Pages without comments are not interpreted.
        if !page.annotations().iter().any(has_comment) {
            continue;
        }
        let content = PageContent::load(&page, params);
        let found = comments_on_page(content.index, &content.annotations, &content.text);
        debug!(page = page.number(), comments = found.len(), "extracted comments");
        records.extend(found);
    }
    Ok(records)
}

/// Comment records for one page's annotations.
pub fn comments_on_page(
    index: usize,
    annotations: &[Annotation],
    text: &PageText,
) -> Vec<CommentRecord> {
    annotations
        .iter()
        .filter(|annot| has_comment(annot))
        .map(|annot| CommentRecord {
            page: index + 1,
            reference: reference_text(annot, text),
            text: annot.contents.clone(),
        })
        .collect()
}

fn has_comment(annot: &Annotation) -> bool {
    !annot.contents.trim().is_empty()
}

fn reference_text(annot: &Annotation, text: &PageText) -> String {
    if !annot.kind.is_text_markup() {
        return annot.subject.clone();
    }
    let parts: Vec<String> = annot
        .regions()
        .iter()
        .map(|rect| text.clip_text(rect).trim_end().to_string())
        .filter(|part| !part.is_empty())
        .collect();
    parts.join("\n").trim_end().to_string()
}
