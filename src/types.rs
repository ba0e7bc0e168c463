//! Shared types: the bootstrap record format and the wire bodies exchanged
//! with the export and delete endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One uploaded image as delivered by the page bootstrap feed.
///
/// `template` and `article` are assigned server-side. A record missing either
/// key (absent or `null`) gets the empty string and is still indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub template: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub article: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl ImageRecord {
    /// URL used for the small preview. Falls back to the full image.
    pub fn preview_url(&self) -> &str {
        match self.thumbnail_url.as_deref() {
            Some(thumb) if !thumb.is_empty() => thumb,
            _ => &self.url,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse the bootstrap feed: a JSON array of [`ImageRecord`].
pub fn parse_feed(json: &str) -> Result<Vec<ImageRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// How URLs of one article are joined inside a single spreadsheet cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    #[default]
    Comma,
    Newline,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Comma => "comma",
            Separator::Newline => "newline",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Separator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comma" => Ok(Separator::Comma),
            "newline" => Ok(Separator::Newline),
            other => Err(format!("unknown separator '{other}' (expected comma or newline)")),
        }
    }
}

/// One row of the export payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportItem {
    pub url: String,
    pub article: String,
    pub filename: String,
}

/// JSON body POSTed to the document generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub image_data: Vec<ExportItem>,
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<Separator>,
}

/// JSON body POSTed to the delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub image_url: String,
}

/// Reply of the delete endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body both endpoints return on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
