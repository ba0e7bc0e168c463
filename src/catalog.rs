//! Two-level catalog index: template → article → ordered images.
//!
//! ## Ordering
//!
//! The two levels are listed differently on purpose:
//!
//! - **Templates** come out in first-seen order, mirroring upload/arrival order.
//! - **Articles** inside a template come out in ascending code-point order so
//!   long SKU lists stay scannable.
//! - **Images** inside an article follow their filename sequence
//!   ([`crate::naming::extract_sequence`]), ties keeping input order.
//!
//! The index also keeps the flat record list in input order. The "show all"
//! view groups straight from that list and never looks at the buckets.
//!
//! Every input record lands in exactly one bucket, chosen only by its own
//! `template`/`article` fields. Nothing is dropped or duplicated.

use crate::sort::sort_within_article;
use crate::types::ImageRecord;
use std::collections::{BTreeMap, HashMap};

/// Articles of one template, keyed and iterated in code-point order.
pub type ArticleMap = BTreeMap<String, Vec<ImageRecord>>;

#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    records: Vec<ImageRecord>,
    template_order: Vec<String>,
    templates: HashMap<String, ArticleMap>,
}

impl CatalogIndex {
    /// Ingest the flat feed in order, then sort every article bucket.
    pub fn build(records: impl IntoIterator<Item = ImageRecord>) -> Self {
        let mut index = CatalogIndex::default();
        for record in records {
            if !index.templates.contains_key(&record.template) {
                index.template_order.push(record.template.clone());
            }
            index
                .templates
                .entry(record.template.clone())
                .or_default()
                .entry(record.article.clone())
                .or_default()
                .push(record.clone());
            index.records.push(record);
        }
        for articles in index.templates.values_mut() {
            for images in articles.values_mut() {
                sort_within_article(images);
            }
        }
        tracing::debug!(
            records = index.records.len(),
            templates = index.template_order.len(),
            "Built catalog index"
        );
        index
    }

    /// Template names in first-seen order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.template_order.iter().map(String::as_str)
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    /// Articles of `template` in code-point order. Empty for unknown templates.
    pub fn articles(&self, template: &str) -> Vec<&str> {
        self.templates
            .get(template)
            .map(|articles| articles.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whole article map of a template.
    pub fn template(&self, template: &str) -> Option<&ArticleMap> {
        self.templates.get(template)
    }

    /// Ordered images of one `(template, article)` bucket.
    pub fn images(&self, template: &str, article: &str) -> Option<&[ImageRecord]> {
        self.templates
            .get(template)?
            .get(article)
            .map(Vec::as_slice)
    }

    /// The flat record list in input order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.url == url)
    }

    /// Remove every record whose `url` matches, from the flat list and from
    /// its bucket. Buckets left empty are dropped, and so is a template left
    /// without articles. Returns the removed records in input order.
    pub fn remove_by_url(&mut self, url: &str) -> Vec<ImageRecord> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.url == url);
        self.records = kept;

        for record in &removed {
            let Some(articles) = self.templates.get_mut(&record.template) else {
                continue;
            };
            if let Some(images) = articles.get_mut(&record.article) {
                images.retain(|r| r.url != url);
                if images.is_empty() {
                    articles.remove(&record.article);
                }
            }
            if articles.is_empty() {
                self.templates.remove(&record.template);
                self.template_order.retain(|t| t != &record.template);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{record, sample_records, urls};
    use std::collections::HashSet;

    #[test]
    fn every_record_lands_in_exactly_one_bucket() {
        let input = sample_records();
        let index = CatalogIndex::build(input.clone());

        let mut seen = Vec::new();
        for template in index.templates() {
            for article in index.articles(template) {
                for image in index.images(template, article).unwrap() {
                    assert_eq!(image.template, template);
                    assert_eq!(image.article, article);
                    seen.push(image.url.clone());
                }
            }
        }
        assert_eq!(seen.len(), input.len());
        let unique: HashSet<&String> = seen.iter().collect();
        assert_eq!(unique.len(), input.len());
    }

    #[test]
    fn templates_listed_in_first_seen_order() {
        let index = CatalogIndex::build(vec![
            record("Zeta", "1", "a.jpg", "u1"),
            record("Alpha", "1", "b.jpg", "u2"),
            record("Zeta", "2", "c.jpg", "u3"),
            record("Mid", "1", "d.jpg", "u4"),
        ]);
        let templates: Vec<&str> = index.templates().collect();
        assert_eq!(templates, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn articles_listed_in_code_point_order() {
        let index = CatalogIndex::build(vec![
            record("A", "b", "a.jpg", "u1"),
            record("A", "B", "a.jpg", "u2"),
            record("A", "10", "a.jpg", "u3"),
            record("A", "9", "a.jpg", "u4"),
        ]);
        assert_eq!(index.articles("A"), ["10", "9", "B", "b"]);
    }

    #[test]
    fn unknown_template_has_no_articles() {
        let index = CatalogIndex::build(sample_records());
        assert!(index.articles("nope").is_empty());
        assert!(index.images("nope", "X").is_none());
        assert!(!index.has_template("nope"));
    }

    #[test]
    fn buckets_sorted_by_sequence_with_stable_ties() {
        let index = CatalogIndex::build(vec![
            record("A", "X", "p_2_aaaaaa.jpg", "two"),
            record("A", "X", "plain.jpg", "plain"),
            record("A", "X", "p_1_bbbbbb.jpg", "one-a"),
            record("A", "X", "q_1_cccccc.jpg", "one-b"),
        ]);
        let images = index.images("A", "X").unwrap();
        assert_eq!(urls(images), ["plain", "one-a", "one-b", "two"]);
    }

    #[test]
    fn flat_list_keeps_input_order() {
        let index = CatalogIndex::build(vec![
            record("A", "X", "p_2_aaaaaa.jpg", "u2"),
            record("A", "X", "p_1_bbbbbb.jpg", "u1"),
        ]);
        assert_eq!(urls(index.records()), ["u2", "u1"]);
    }

    #[test]
    fn missing_keys_are_indexed_under_empty_string() {
        let index = CatalogIndex::build(vec![record("", "", "a.jpg", "orphan")]);
        assert_eq!(index.templates().collect::<Vec<_>>(), [""]);
        assert_eq!(index.articles(""), [""]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_by_url_drops_record_everywhere() {
        let mut index = CatalogIndex::build(sample_records());
        let before = index.len();
        let removed = index.remove_by_url("u1");
        assert_eq!(removed.len(), 1);
        assert_eq!(index.len(), before - 1);
        assert!(!index.contains_url("u1"));
        assert_eq!(urls(index.images("A", "X").unwrap()), ["u2"]);
    }

    #[test]
    fn remove_last_image_drops_empty_buckets() {
        let mut index = CatalogIndex::build(vec![
            record("A", "X", "a.jpg", "u1"),
            record("B", "Y", "b.jpg", "u2"),
        ]);
        index.remove_by_url("u1");
        assert!(!index.has_template("A"));
        assert_eq!(index.templates().collect::<Vec<_>>(), ["B"]);

        index.remove_by_url("u2");
        assert!(index.is_empty());
        assert_eq!(index.templates().count(), 0);
    }

    #[test]
    fn remove_unknown_url_is_a_no_op() {
        let mut index = CatalogIndex::build(sample_records());
        let before = index.len();
        assert!(index.remove_by_url("missing").is_empty());
        assert_eq!(index.len(), before);
    }
}
