//! # Catalog View
//!
//! The engine behind an archive of uploaded product images. Each image was
//! filed server-side under a *template* (album/catalog) and an *article*
//! (SKU-like key). This crate turns the flat record list the server hands
//! out into a browsable, filterable catalog, builds the export payload for
//! the spreadsheet generator, and drives deletion.
//!
//! # Data Flow
//!
//! ```text
//! feed (JSON array)  →  CatalogIndex  →  VisibleSet  →  Carousel
//!                                            │
//!                                            └──→  ExportPayload  →  server
//! ```
//!
//! The flat feed is never mutated. [`catalog::CatalogIndex`] owns all derived
//! structure; views are recomputed from it on every selection change.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | `<name>_<seq>_<hash>.<ext>` filename parser, sequence extraction |
//! | [`types`] | Feed record and wire bodies shared with the server |
//! | [`sort`] | Within-article and export comparators |
//! | [`catalog`] | Template → article → images index |
//! | [`view`] | Selection state machine and visible-set resolution |
//! | [`export`] | Export payload assembly and validation |
//! | [`carousel`] | Image carousel navigation |
//! | [`client`] | Export and delete endpoints behind a `Transport` seam |
//! | [`session`] | Event-driven owner of index, view, carousel and in-flight requests |
//! | [`config`] | TOML configuration with stock defaults |
//! | [`output`] | CLI text rendering |
//!
//! # Design Decisions
//!
//! ## Asymmetric Ordering
//!
//! Templates are listed in the order they first appear in the feed, which
//! follows upload order. Articles are listed alphabetically because a
//! template can hold hundreds of SKUs. Images follow the sequence number the
//! server embedded in the filename. Names without one sort as sequence 0,
//! they are never rejected.
//!
//! ## Export Follows the Screen
//!
//! The export payload is built from the visible set, not from the raw feed.
//! Each row takes its article from the group it is displayed under and the
//! rows are re-sorted by article and sequence, so what you export is what
//! you see, in a deterministic order.
//!
//! ## Delete Is Never Optimistic
//!
//! A record only leaves the index after the server acknowledges the delete.
//! A failed delete leaves everything as it was.

pub mod carousel;
pub mod catalog;
pub mod client;
pub mod config;
pub mod export;
pub mod naming;
pub mod output;
pub mod session;
pub mod sort;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
