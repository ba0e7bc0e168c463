//! Shared test utilities for the catalog-view test suite.
//!
//! Provides record builders, the canonical fixture feeds, and a scripted
//! [`Transport`] that replays canned responses and records what was sent.
//!
//! # Fixture feeds
//!
//! ```text
//! scenario_records()            sample_records()
//! A ─ X ─ u2 (p_2)              A ─ X ─ u2 (p_2), u1 (p_1)
//!   │   └ u1 (p_1)                └ Y ─ u3
//!   └ Y ─ u3 (q_1)              B ─ X ─ u4
//!                                 └ Z ─ u5
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::catalog::CatalogIndex;
use crate::client::{HttpResponse, Transport, TransportError};
use crate::config::{DocumentTemplate, ExportConfig};
use crate::types::{ExportItem, ExportPayload, ImageRecord};

// =========================================================================
// Record builders
// =========================================================================

pub fn record(template: &str, article: &str, filename: &str, url: &str) -> ImageRecord {
    ImageRecord {
        template: template.to_string(),
        article: article.to_string(),
        url: url.to_string(),
        filename: filename.to_string(),
        thumbnail_url: None,
    }
}

pub fn item(article: &str, filename: &str, url: &str) -> ExportItem {
    ExportItem {
        url: url.to_string(),
        article: article.to_string(),
        filename: filename.to_string(),
    }
}

/// The three-record feed: template A, articles X and Y, X given out of order.
pub fn scenario_records() -> Vec<ImageRecord> {
    vec![
        record("A", "X", "p_2_aa11bb.jpg", "u2"),
        record("A", "X", "p_1_cc22dd.jpg", "u1"),
        record("A", "Y", "q_1_ee33ff.jpg", "u3"),
    ]
}

/// The scenario feed plus a second template B with articles X and Z.
pub fn sample_records() -> Vec<ImageRecord> {
    let mut records = scenario_records();
    records.push(record("B", "X", "r_1_aaaaaa.jpg", "u4"));
    records.push(record("B", "Z", "s_1_bbbbbb.jpg", "u5"));
    records
}

pub fn scenario_index() -> CatalogIndex {
    CatalogIndex::build(scenario_records())
}

pub fn sample_index() -> CatalogIndex {
    CatalogIndex::build(sample_records())
}

pub fn document_templates() -> Vec<DocumentTemplate> {
    ExportConfig::default().templates
}

/// Export payload of template A in the scenario feed, row layout.
pub fn scenario_payload() -> ExportPayload {
    ExportPayload {
        image_data: vec![
            item("X", "p_1_cc22dd.jpg", "u1"),
            item("X", "p_2_aa11bb.jpg", "u2"),
            item("Y", "q_1_ee33ff.jpg", "u3"),
        ],
        template_name: "В строку".to_string(),
        separator: None,
    }
}

/// URLs of a record slice, in order.
pub fn urls(records: &[ImageRecord]) -> Vec<&str> {
    records.iter().map(|r| r.url.as_str()).collect()
}

// =========================================================================
// Scripted transport
// =========================================================================

/// A request the scripted transport received, body decoded as JSON.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: serde_json::Value,
}

/// Replays queued responses in order and records every request.
///
/// Running out of responses yields a transport error so a test that makes
/// more calls than it scripted fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn push_response(&self, status: u16, body: Vec<u8>) {
        self.push(HttpResponse { status, body });
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError> {
        let body = serde_json::from_slice(body).expect("client must send JSON");
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            body,
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

pub fn json_response(status: u16, json: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: json.as_bytes().to_vec(),
    }
}
