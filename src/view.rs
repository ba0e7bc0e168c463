//! Filtered views over the catalog.
//!
//! A view is a pure function of the index, the current [`Selection`] and a
//! [`ViewMode`]. It is recomputed from scratch on every selection change and
//! never patched in place.
//!
//! | Mode | Selection | Visible records |
//! |------|-----------|-----------------|
//! | `None` | no template | nothing |
//! | `ByTemplate` | template only | every article of the template in code-point order, one group per article |
//! | `ByArticle` | template + article | that single bucket |
//! | `All` | ignored (and cleared) | whole feed grouped by article in first-seen order, input order inside a group |
//!
//! Groups are part of the result's shape, not decoration: export reads each
//! record's article from the group it is displayed under.
//!
//! `All` groups by article alone and never sorts by sequence, so the same
//! article name coming from two templates ends up in one group.

use crate::catalog::CatalogIndex;
use crate::types::ImageRecord;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ViewError {
    #[error("No links to copy")]
    NothingToCopy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    None,
    ByTemplate,
    ByArticle,
    All,
}

/// The active filter. Empty strings mean "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub template: String,
    pub article: String,
}

impl Selection {
    pub fn new(template: impl Into<String>, article: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            article: article.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty() && self.article.is_empty()
    }

    /// The selected article, if it exists under the selected template.
    ///
    /// An article that isn't a key of the selected template counts as no
    /// selection at all.
    pub fn effective_article<'a>(&'a self, index: &CatalogIndex) -> Option<&'a str> {
        if self.template.is_empty() || self.article.is_empty() {
            return None;
        }
        index
            .images(&self.template, &self.article)
            .map(|_| self.article.as_str())
    }

    /// Mode implied by this selection.
    pub fn mode(&self, index: &CatalogIndex) -> ViewMode {
        if self.template.is_empty() {
            ViewMode::None
        } else if self.effective_article(index).is_some() {
            ViewMode::ByArticle
        } else {
            ViewMode::ByTemplate
        }
    }
}

/// Title shown above the visible records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heading {
    SelectCatalog,
    CatalogNotFound,
    Template(String),
    Article { template: String, article: String },
    All,
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heading::SelectCatalog => f.write_str("Select a catalog"),
            Heading::CatalogNotFound => f.write_str("Catalog not found"),
            Heading::Template(t) => write!(f, "Album: {t}"),
            Heading::Article { template, article } => {
                write!(f, "Catalog: {template}, Article: {article}")
            }
            Heading::All => f.write_str("All links"),
        }
    }
}

/// A run of records displayed under one article header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleGroup {
    pub article: String,
    /// Template named in the header. Only set in the `All` view, where groups
    /// are not scoped to a single template; it is the template of the
    /// group's first record.
    pub template: Option<String>,
    pub records: Vec<ImageRecord>,
}

/// How copied URLs are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFormat {
    /// `", "` between URLs.
    Inline,
    /// One URL per line.
    List,
}

impl CopyFormat {
    fn joiner(self) -> &'static str {
        match self {
            CopyFormat::Inline => ", ",
            CopyFormat::List => "\n",
        }
    }
}

/// The ordered, grouped records currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    pub mode: ViewMode,
    pub heading: Heading,
    pub groups: Vec<VisibleGroup>,
}

impl VisibleSet {
    fn empty(mode: ViewMode, heading: Heading) -> Self {
        Self {
            mode,
            heading,
            groups: Vec::new(),
        }
    }

    /// Records in display order, paired with the article of their group.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ImageRecord)> {
        self.groups
            .iter()
            .flat_map(|g| g.records.iter().map(move |r| (g.article.as_str(), r)))
    }

    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.records.is_empty())
    }

    /// Whether each group gets an article header when rendered. A single
    /// article view is one group and shows none.
    pub fn shows_group_headers(&self) -> bool {
        matches!(self.mode, ViewMode::ByTemplate | ViewMode::All)
    }

    pub fn urls(&self) -> Vec<&str> {
        self.records().map(|r| r.url.as_str()).collect()
    }

    /// All visible URLs joined for the clipboard.
    pub fn joined_urls(&self, format: CopyFormat) -> Result<String, ViewError> {
        if self.is_empty() {
            return Err(ViewError::NothingToCopy);
        }
        Ok(self.urls().join(format.joiner()))
    }
}

/// Compute the visible records for `selection` under `mode`.
///
/// `ByArticle` with an article that doesn't belong to the selected template
/// falls back to the template view. A template missing from the index gives
/// an empty set headed "catalog not found".
pub fn resolve(index: &CatalogIndex, selection: &Selection, mode: ViewMode) -> VisibleSet {
    match mode {
        ViewMode::All => resolve_all(index),
        ViewMode::None => VisibleSet::empty(ViewMode::None, Heading::SelectCatalog),
        ViewMode::ByTemplate | ViewMode::ByArticle if selection.template.is_empty() => {
            VisibleSet::empty(ViewMode::None, Heading::SelectCatalog)
        }
        ViewMode::ByArticle => match selection.effective_article(index) {
            Some(article) => resolve_article(index, &selection.template, article),
            None => resolve_template(index, &selection.template),
        },
        ViewMode::ByTemplate => resolve_template(index, &selection.template),
    }
}

fn resolve_template(index: &CatalogIndex, template: &str) -> VisibleSet {
    let Some(articles) = index.template(template) else {
        return VisibleSet::empty(ViewMode::ByTemplate, Heading::CatalogNotFound);
    };
    let groups = articles
        .iter()
        .map(|(article, images)| VisibleGroup {
            article: article.clone(),
            template: None,
            records: images.clone(),
        })
        .collect();
    VisibleSet {
        mode: ViewMode::ByTemplate,
        heading: Heading::Template(template.to_string()),
        groups,
    }
}

fn resolve_article(index: &CatalogIndex, template: &str, article: &str) -> VisibleSet {
    let records = index
        .images(template, article)
        .map(<[ImageRecord]>::to_vec)
        .unwrap_or_default();
    VisibleSet {
        mode: ViewMode::ByArticle,
        heading: Heading::Article {
            template: template.to_string(),
            article: article.to_string(),
        },
        groups: vec![VisibleGroup {
            article: article.to_string(),
            template: None,
            records,
        }],
    }
}

fn resolve_all(index: &CatalogIndex) -> VisibleSet {
    let mut groups: Vec<VisibleGroup> = Vec::new();
    for record in index.records() {
        match groups.iter_mut().find(|g| g.article == record.article) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(VisibleGroup {
                article: record.article.clone(),
                template: Some(record.template.clone()),
                records: vec![record.clone()],
            }),
        }
    }
    VisibleSet {
        mode: ViewMode::All,
        heading: Heading::All,
        groups,
    }
}

/// Selection plus active mode, driven by selector events.
///
/// Each transition runs to completion and returns the freshly resolved view.
#[derive(Debug, Clone)]
pub struct ViewState {
    selection: Selection,
    mode: ViewMode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            mode: ViewMode::None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch catalog. Always clears the article.
    pub fn select_template(&mut self, index: &CatalogIndex, template: &str) -> VisibleSet {
        self.selection = Selection::new(template, "");
        self.mode = if template.is_empty() {
            ViewMode::None
        } else {
            ViewMode::ByTemplate
        };
        tracing::debug!(template, mode = ?self.mode, "Template selected");
        self.visible(index)
    }

    /// Switch article under the current catalog. An empty or foreign article
    /// goes back to the whole catalog.
    pub fn select_article(&mut self, index: &CatalogIndex, article: &str) -> VisibleSet {
        let candidate = Selection::new(self.selection.template.clone(), article);
        self.mode = candidate.mode(index);
        self.selection = match self.mode {
            ViewMode::ByArticle => candidate,
            _ => Selection::new(candidate.template, ""),
        };
        tracing::debug!(article, mode = ?self.mode, "Article selected");
        self.visible(index)
    }

    /// Show every record regardless of catalog. Clears the selection.
    pub fn show_all(&mut self, index: &CatalogIndex) -> VisibleSet {
        self.selection = Selection::default();
        self.mode = ViewMode::All;
        tracing::debug!("Showing all records");
        self.visible(index)
    }

    /// Re-check the selection against a changed index and recompute.
    ///
    /// A selected article that no longer exists under its template is
    /// cleared and the mode drops back to `ByTemplate`.
    pub fn refresh(&mut self, index: &CatalogIndex) -> VisibleSet {
        if self.mode == ViewMode::ByArticle && self.selection.effective_article(index).is_none() {
            tracing::debug!(article = %self.selection.article, "Selected article is gone");
            self.selection.article.clear();
            self.mode = ViewMode::ByTemplate;
        }
        self.visible(index)
    }

    /// Recompute the view for the current state.
    pub fn visible(&self, index: &CatalogIndex) -> VisibleSet {
        resolve(index, &self.selection, self.mode)
    }

    /// Articles offered by the article selector. Empty (selector disabled)
    /// while no catalog is selected.
    pub fn available_articles<'a>(&self, index: &'a CatalogIndex) -> Vec<&'a str> {
        if self.selection.template.is_empty() {
            return Vec::new();
        }
        index.articles(&self.selection.template)
    }
}
