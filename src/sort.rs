//! Record ordering.
//!
//! Two orders exist. Inside an article, images follow the sequence number
//! embedded in their filename. An export spans several articles, so it sorts
//! by article first and sequence second. Both are applied with the standard
//! library's stable sort, so equal keys keep their input order.

use crate::naming::extract_sequence;
use crate::types::{ExportItem, ImageRecord};
use std::cmp::Ordering;

/// Ascending by filename sequence.
pub fn within_article(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    extract_sequence(&a.filename).cmp(&extract_sequence(&b.filename))
}

/// Ascending by article (code-point order), then by filename sequence.
pub fn export_order(a: &ExportItem, b: &ExportItem) -> Ordering {
    a.article
        .cmp(&b.article)
        .then_with(|| extract_sequence(&a.filename).cmp(&extract_sequence(&b.filename)))
}

pub fn sort_within_article(records: &mut [ImageRecord]) {
    records.sort_by_cached_key(|r| extract_sequence(&r.filename));
}

pub fn sort_for_export(items: &mut [ExportItem]) {
    items.sort_by(export_order);
}
