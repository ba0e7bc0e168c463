//! Export payload assembly for the spreadsheet generator.
//!
//! The payload is rebuilt from whatever is on screen. Each row takes its
//! `article` from the group the record is displayed under, so an `All` view
//! and a template view of the same records export the article they show.
//! The rows are then put in export order (article, then filename sequence)
//! regardless of display order.
//!
//! Validation happens here, before any request is built: an empty view and a
//! blank document name are both rejected.

use crate::catalog::CatalogIndex;
use crate::config::DocumentTemplate;
use crate::sort::sort_for_export;
use crate::types::{ExportItem, ExportPayload, Separator};
use crate::view::{Selection, VisibleSet};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExportError {
    #[error("No data for the current selection")]
    EmptySelection,
    #[error("Document template name is empty")]
    BlankTemplateName,
    #[error("Unknown document template: {0}")]
    UnknownTemplate(String),
}

/// What the user picked in the export dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub template_name: String,
    /// Present only for layouts that join several URLs into one cell.
    pub separator: Option<Separator>,
}

impl ExportOptions {
    /// Resolve a document template chosen by name against the configured
    /// layouts. `separator` is kept only when the layout joins in-cell.
    pub fn for_document(
        templates: &[DocumentTemplate],
        name: &str,
        separator: Separator,
    ) -> Result<Self, ExportError> {
        if name.trim().is_empty() {
            return Err(ExportError::BlankTemplateName);
        }
        let template = templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ExportError::UnknownTemplate(name.to_string()))?;
        Ok(Self {
            template_name: template.name.clone(),
            separator: template.in_cell.then_some(separator),
        })
    }
}

/// Build the payload from the visible records.
pub fn assemble(visible: &VisibleSet, options: &ExportOptions) -> Result<ExportPayload, ExportError> {
    let items = visible
        .entries()
        .map(|(article, record)| ExportItem {
            url: record.url.clone(),
            article: article.to_string(),
            filename: record.filename.clone(),
        })
        .collect();
    finish(items, options)
}

/// Build the payload straight from the flat feed filtered by `selection`,
/// without going through a rendered view. Articles come from the records.
pub fn assemble_from_selection(
    index: &CatalogIndex,
    selection: &Selection,
    options: &ExportOptions,
) -> Result<ExportPayload, ExportError> {
    let article = selection.effective_article(index);
    let items = index
        .records()
        .iter()
        .filter(|r| selection.template.is_empty() || r.template == selection.template)
        .filter(|r| article.is_none_or(|a| r.article == a))
        .map(|r| ExportItem {
            url: r.url.clone(),
            article: r.article.clone(),
            filename: r.filename.clone(),
        })
        .collect();
    finish(items, options)
}

fn finish(mut items: Vec<ExportItem>, options: &ExportOptions) -> Result<ExportPayload, ExportError> {
    if items.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    if options.template_name.trim().is_empty() {
        return Err(ExportError::BlankTemplateName);
    }
    sort_for_export(&mut items);
    Ok(ExportPayload {
        image_data: items,
        template_name: options.template_name.clone(),
        separator: options.separator,
    })
}

/// Name for the saved document: `<template>_<separator>_<timestamp>.xlsx`.
///
/// The separator segment is left out for layouts without one. The timestamp
/// is UTC, `YYYY-MM-DDTHH-MM-SS`.
pub fn export_filename(template_name: &str, separator: Option<Separator>, at: DateTime<Utc>) -> String {
    let safe_name: String = template_name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let timestamp = at.format("%Y-%m-%dT%H-%M-%S");
    match separator {
        Some(sep) => format!("{safe_name}_{sep}_{timestamp}.xlsx"),
        None => format!("{safe_name}_{timestamp}.xlsx"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{document_templates, record, sample_index, scenario_index};
    use crate::view::{ViewMode, ViewState, resolve};
    use chrono::TimeZone;

    fn row_options() -> ExportOptions {
        ExportOptions::for_document(&document_templates(), "В строку", Separator::Newline).unwrap()
    }

    fn articles(payload: &ExportPayload) -> Vec<&str> {
        payload.image_data.iter().map(|i| i.article.as_str()).collect()
    }

    fn urls(payload: &ExportPayload) -> Vec<&str> {
        payload.image_data.iter().map(|i| i.url.as_str()).collect()
    }

    #[test]
    fn template_view_exports_in_article_then_sequence_order() {
        let index = scenario_index();
        let view = ViewState::new().select_template(&index, "A");
        let payload = assemble(&view, &row_options()).unwrap();
        assert_eq!(urls(&payload), ["u1", "u2", "u3"]);
        assert_eq!(articles(&payload), ["X", "X", "Y"]);
        assert_eq!(payload.template_name, "В строку");
        assert_eq!(payload.separator, None);
    }

    #[test]
    fn export_order_ignores_display_order() {
        let index = CatalogIndex::build(vec![
            record("T", "Y", "q_1_aaaaaa.jpg", "y1"),
            record("T", "X", "p_2_aaaaaa.jpg", "x2"),
            record("T", "X", "p_1_bbbbbb.jpg", "x1"),
        ]);
        let view = resolve(&index, &Selection::default(), ViewMode::All);
        assert_eq!(view.urls(), ["y1", "x2", "x1"]);
        let payload = assemble(&view, &row_options()).unwrap();
        assert_eq!(urls(&payload), ["x1", "x2", "y1"]);
    }

    #[test]
    fn article_comes_from_the_displayed_group() {
        let index = scenario_index();
        let mut view = resolve(&index, &Selection::new("A", ""), ViewMode::ByTemplate);
        // A record that carries a stale article but sits under group "Y".
        view.groups[1].records[0].article = "stale".into();
        let payload = assemble(&view, &row_options()).unwrap();
        assert_eq!(articles(&payload), ["X", "X", "Y"]);
    }

    #[test]
    fn empty_view_is_rejected() {
        let index = scenario_index();
        let view = ViewState::new().visible(&index);
        assert_eq!(assemble(&view, &row_options()), Err(ExportError::EmptySelection));
    }

    #[test]
    fn blank_template_name_is_rejected() {
        let index = scenario_index();
        let view = resolve(&index, &Selection::new("A", ""), ViewMode::ByTemplate);
        let options = ExportOptions {
            template_name: "   ".into(),
            separator: None,
        };
        assert_eq!(assemble(&view, &options), Err(ExportError::BlankTemplateName));
        assert_eq!(
            ExportOptions::for_document(&document_templates(), " ", Separator::Comma),
            Err(ExportError::BlankTemplateName)
        );
    }

    #[test]
    fn unknown_document_template_is_rejected() {
        assert_eq!(
            ExportOptions::for_document(&document_templates(), "Other", Separator::Comma),
            Err(ExportError::UnknownTemplate("Other".into()))
        );
    }

    #[test]
    fn in_cell_layout_carries_separator() {
        let options =
            ExportOptions::for_document(&document_templates(), "В ячейку", Separator::Newline).unwrap();
        assert_eq!(options.separator, Some(Separator::Newline));
        assert_eq!(row_options().separator, None);
    }

    #[test]
    fn selection_variant_filters_flat_feed() {
        let index = sample_index();
        let payload =
            assemble_from_selection(&index, &Selection::new("A", "X"), &row_options()).unwrap();
        assert_eq!(urls(&payload), ["u1", "u2"]);

        let payload =
            assemble_from_selection(&index, &Selection::new("A", ""), &row_options()).unwrap();
        assert_eq!(articles(&payload), ["X", "X", "Y"]);
    }

    #[test]
    fn selection_variant_treats_foreign_article_as_absent() {
        let index = sample_index();
        let payload =
            assemble_from_selection(&index, &Selection::new("A", "Z"), &row_options()).unwrap();
        assert_eq!(payload.image_data.len(), 3);
    }

    #[test]
    fn selection_variant_rejects_unknown_template() {
        let index = sample_index();
        assert_eq!(
            assemble_from_selection(&index, &Selection::new("nope", ""), &row_options()),
            Err(ExportError::EmptySelection)
        );
    }

    #[test]
    fn filename_embeds_template_separator_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            export_filename("В ячейку", Some(Separator::Newline), at),
            "В ячейку_newline_2024-03-05T14-07-09.xlsx"
        );
        assert_eq!(
            export_filename("a/b", None, at),
            "a_b_2024-03-05T14-07-09.xlsx"
        );
    }
}
