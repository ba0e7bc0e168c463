//! CLI output formatting.
//!
//! The terminal is this crate's presentation layer. Every view has a
//! `format_*` function returning lines (pure, testable) and a `print_*`
//! wrapper writing them to stdout.
//!
//! # Output Format
//!
//! ## Templates
//!
//! ```text
//! Templates
//! 001 Summer (12 images)
//! 002 Winter (4 images)
//! ```
//!
//! ## Visible set
//!
//! ```text
//! Album: Summer
//! Article: 4296278785
//!     001 http://host/images/Summer/4296278785/4296278785_1_ffe8e5.jpg
//!         4296278785_1_ffe8e5.jpg
//!     002 ...
//! Article: 4296278786
//!     001 ...
//!
//! 3 images
//! ```
//!
//! Positions restart at 001 under each article header. A single-article
//! view has no header and its images sit at depth 0.

use crate::catalog::CatalogIndex;
use crate::session::ExportOutcome;
use crate::view::VisibleSet;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Show empty keys visibly instead of as blank text.
fn label(key: &str) -> &str {
    if key.is_empty() { "(none)" } else { key }
}

pub fn format_templates(index: &CatalogIndex) -> Vec<String> {
    let mut lines = vec!["Templates".to_string()];
    let templates: Vec<&str> = index.templates().collect();
    if templates.is_empty() {
        lines.push(format!("{}No templates", indent(1)));
        return lines;
    }
    for (i, template) in templates.iter().enumerate() {
        let count: usize = index
            .template(template)
            .map(|articles| articles.values().map(Vec::len).sum())
            .unwrap_or(0);
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            label(template),
            plural(count, "image", "images")
        ));
    }
    lines
}

pub fn format_articles(index: &CatalogIndex, template: &str) -> Vec<String> {
    let mut lines = vec![format!("Articles in {}", label(template))];
    let articles = index.articles(template);
    if articles.is_empty() {
        lines.push(format!("{}No articles", indent(1)));
        return lines;
    }
    for (i, article) in articles.iter().enumerate() {
        let count = index.images(template, article).map_or(0, |images| images.len());
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            label(article),
            plural(count, "image", "images")
        ));
    }
    lines
}

pub fn format_visible(visible: &VisibleSet) -> Vec<String> {
    let mut lines = vec![visible.heading.to_string()];
    let headers = visible.shows_group_headers();
    let depth = if headers { 1 } else { 0 };

    for group in &visible.groups {
        if headers {
            match &group.template {
                Some(template) => lines.push(format!(
                    "Template: {}, Article: {}",
                    label(template),
                    label(&group.article)
                )),
                None => lines.push(format!("Article: {}", label(&group.article))),
            }
        }
        for (i, record) in group.records.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(depth), format_index(i + 1), record.url));
            if !record.filename.is_empty() {
                lines.push(format!("{}{}", indent(depth + 1), record.filename));
            }
        }
    }

    if !visible.is_empty() {
        lines.push(String::new());
        lines.push(plural(visible.len(), "image", "images"));
    }
    lines
}

pub fn format_export(outcome: &ExportOutcome) -> Vec<String> {
    vec![
        format!(
            "Exported {} ({} bytes)",
            plural(outcome.rows, "row", "rows"),
            outcome.bytes
        ),
        format!("{}Saved: {}", indent(1), outcome.path.display()),
    ]
}

pub fn format_delete(url: &str, remaining: usize) -> Vec<String> {
    vec![
        format!("Deleted {url}"),
        format!("{}{} left in archive", indent(1), plural(remaining, "image", "images")),
    ]
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_templates(index: &CatalogIndex) {
    print_lines(format_templates(index));
}

pub fn print_articles(index: &CatalogIndex, template: &str) {
    print_lines(format_articles(index, template));
}

pub fn print_visible(visible: &VisibleSet) {
    print_lines(format_visible(visible));
}

pub fn print_export(outcome: &ExportOutcome) {
    print_lines(format_export(outcome));
}

pub fn print_delete(url: &str, remaining: usize) {
    print_lines(format_delete(url, remaining));
}
