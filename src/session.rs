//! One viewer session: the index, the selection, the carousel and the
//! bookkeeping for requests in flight.
//!
//! Every method is one input event and runs to completion before the next.
//! The visible set is recomputed after each selection change and after each
//! acknowledged deletion; it is never patched.
//!
//! Both network flows are split in two halves so a presentation layer with
//! an asynchronous transport can disable the matching control while the
//! request runs: [`ArchiveSession::begin_export`] /
//! [`ArchiveSession::finish_export`] and [`ArchiveSession::begin_delete`] /
//! [`ArchiveSession::finish_delete`]. Nothing locks out a second request, so
//! in-flight requests are counted rather than flagged. The index only
//! changes once the server has acknowledged a delete.
//! [`ArchiveSession::export`] and [`ArchiveSession::delete`] run both halves
//! with a blocking client.

use crate::carousel::{Carousel, CarouselImage, NavKey};
use crate::catalog::CatalogIndex;
use crate::client::{ArchiveClient, ClientError, Transport};
use crate::export::{ExportError, ExportOptions, assemble, export_filename};
use crate::types::{ExportPayload, ImageRecord};
use crate::view::{CopyFormat, ViewError, ViewState, VisibleSet};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("Could not save document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image is not in the archive: {0}")]
    UnknownImage(String),
}

/// A saved export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ArchiveSession {
    index: CatalogIndex,
    view: ViewState,
    visible: VisibleSet,
    carousel: Carousel,
    /// Outstanding delete requests per URL.
    pending_deletes: HashMap<String, usize>,
    exports_in_flight: usize,
}

impl ArchiveSession {
    pub fn new(records: impl IntoIterator<Item = ImageRecord>) -> Self {
        let index = CatalogIndex::build(records);
        let view = ViewState::new();
        let visible = view.visible(&index);
        Self {
            index,
            view,
            visible,
            carousel: Carousel::new(),
            pending_deletes: HashMap::new(),
            exports_in_flight: 0,
        }
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn templates(&self) -> Vec<&str> {
        self.index.templates().collect()
    }

    pub fn available_articles(&self) -> Vec<&str> {
        self.view.available_articles(&self.index)
    }

    pub fn select_template(&mut self, template: &str) -> &VisibleSet {
        self.visible = self.view.select_template(&self.index, template);
        &self.visible
    }

    pub fn select_article(&mut self, article: &str) -> &VisibleSet {
        self.visible = self.view.select_article(&self.index, article);
        &self.visible
    }

    pub fn show_all(&mut self) -> &VisibleSet {
        self.visible = self.view.show_all(&self.index);
        &self.visible
    }

    /// Text for the "copy all" buttons.
    pub fn copy_text(&self, format: CopyFormat) -> Result<String, ViewError> {
        self.visible.joined_urls(format)
    }

    /// Open the carousel on a preview of the current view.
    pub fn open_carousel(&mut self, clicked_url: &str) -> bool {
        let snapshot = CarouselImage::from_visible(&self.visible);
        self.carousel.activate(clicked_url, snapshot)
    }

    pub fn carousel_next(&mut self) {
        self.carousel.next();
    }

    pub fn carousel_prev(&mut self) {
        self.carousel.prev();
    }

    pub fn close_carousel(&mut self) {
        self.carousel.close();
    }

    pub fn handle_key(&mut self, key: NavKey) {
        self.carousel.handle_key(key);
    }

    /// Payload for the current view, validated and in export order.
    pub fn prepare_export(&self, options: &ExportOptions) -> Result<ExportPayload, ExportError> {
        assemble(&self.visible, options)
    }

    /// Whether the export control should be disabled.
    pub fn is_export_in_flight(&self) -> bool {
        self.exports_in_flight > 0
    }

    /// Validate the current view and mark an export as issued.
    ///
    /// Validation failures return before anything is marked, so no request
    /// should be sent for them.
    pub fn begin_export(&mut self, options: &ExportOptions) -> Result<ExportPayload, ExportError> {
        let payload = self.prepare_export(options)?;
        self.exports_in_flight += 1;
        tracing::info!(
            template = %payload.template_name,
            rows = payload.image_data.len(),
            "Requesting document export"
        );
        Ok(payload)
    }

    /// Apply the server's answer to an export issued by
    /// [`begin_export`](Self::begin_export) and save the document into `dir`.
    ///
    /// A server or network failure is returned as-is and not retried.
    pub fn finish_export(
        &mut self,
        payload: &ExportPayload,
        result: Result<Vec<u8>, ClientError>,
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome, SessionError> {
        self.exports_in_flight = self.exports_in_flight.saturating_sub(1);
        let document = result.inspect_err(|err| {
            tracing::warn!(error = %err, "Document export failed");
        })?;

        fs::create_dir_all(dir)?;
        let path = dir.join(export_filename(
            &payload.template_name,
            payload.separator,
            now,
        ));
        fs::write(&path, &document)?;
        tracing::info!("Saved export to {}", path.display());
        Ok(ExportOutcome {
            path,
            rows: payload.image_data.len(),
            bytes: document.len(),
        })
    }

    /// Export with a blocking client: begin, call, finish.
    pub fn export<T: Transport>(
        &mut self,
        client: &ArchiveClient<T>,
        options: &ExportOptions,
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome, SessionError> {
        let payload = self.begin_export(options)?;
        let result = client.export(&payload);
        self.finish_export(&payload, result, dir, now)
    }

    /// Whether the delete control for `url` should be disabled.
    pub fn is_delete_pending(&self, url: &str) -> bool {
        self.pending_deletes.contains_key(url)
    }

    /// Mark a delete as issued. Fails for URLs not in the archive.
    pub fn begin_delete(&mut self, url: &str) -> Result<(), SessionError> {
        if !self.index.contains_url(url) {
            return Err(SessionError::UnknownImage(url.to_string()));
        }
        *self.pending_deletes.entry(url.to_string()).or_default() += 1;
        tracing::info!(url, "Deleting image");
        Ok(())
    }

    /// Apply the server's answer to a delete.
    ///
    /// On success the record leaves the index, a selected article left
    /// without images is cleared, and the view is recomputed. On failure
    /// nothing changes. Either way the control stays disabled while another
    /// delete of the same URL is outstanding.
    pub fn finish_delete(
        &mut self,
        url: &str,
        outcome: Result<(), ClientError>,
    ) -> Result<Vec<ImageRecord>, SessionError> {
        if let Some(count) = self.pending_deletes.get_mut(url) {
            *count -= 1;
            if *count == 0 {
                self.pending_deletes.remove(url);
            }
        }
        match outcome {
            Ok(()) => {
                let removed = self.index.remove_by_url(url);
                self.visible = self.view.refresh(&self.index);
                tracing::info!(url, removed = removed.len(), "Image deleted");
                Ok(removed)
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "Image deletion failed");
                Err(err.into())
            }
        }
    }

    /// Delete with a blocking client: begin, call, finish.
    pub fn delete<T: Transport>(
        &mut self,
        client: &ArchiveClient<T>,
        url: &str,
    ) -> Result<Vec<ImageRecord>, SessionError> {
        self.begin_delete(url)?;
        let outcome = client.delete(url);
        self.finish_delete(url, outcome)
    }
}
