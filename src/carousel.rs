//! Full-size image carousel over the visible records.
//!
//! Activating a preview snapshots the images currently on screen and opens at
//! the clicked one. Navigation clamps at both ends. Closing keeps the
//! snapshot; the next activation replaces it anyway.

use crate::view::VisibleSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselImage {
    pub display_url: String,
    pub filename: String,
}

impl CarouselImage {
    /// Snapshot of a visible set in display order.
    pub fn from_visible(visible: &VisibleSet) -> Vec<CarouselImage> {
        visible
            .records()
            .map(|r| CarouselImage {
                display_url: r.url.clone(),
                filename: r.filename.clone(),
            })
            .collect()
    }
}

/// Keyboard input while the carousel may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Escape,
    Other,
}

#[derive(Debug, Clone, Default)]
pub struct Carousel {
    images: Vec<CarouselImage>,
    current: usize,
    open: bool,
}

impl Carousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn images(&self) -> &[CarouselImage] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Image shown right now, `None` while closed.
    pub fn current(&self) -> Option<&CarouselImage> {
        if !self.open {
            return None;
        }
        self.images.get(self.current)
    }

    /// Open at the image whose URL is `clicked_url`.
    ///
    /// Ignored entirely (state untouched) when the URL isn't among `visible`.
    /// Returns whether the carousel opened.
    pub fn activate(&mut self, clicked_url: &str, visible: Vec<CarouselImage>) -> bool {
        let Some(position) = visible.iter().position(|i| i.display_url == clicked_url) else {
            tracing::debug!(clicked_url, "Activated image not in visible set");
            return false;
        };
        self.images = visible;
        self.current = position;
        self.open = true;
        true
    }

    /// Step forward. No-op at the last image or while closed.
    pub fn next(&mut self) {
        if self.open && self.current + 1 < self.images.len() {
            self.current += 1;
        }
    }

    /// Step back. No-op at the first image or while closed.
    pub fn prev(&mut self) {
        if self.open && self.current > 0 {
            self.current -= 1;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn has_next(&self) -> bool {
        self.open && self.current + 1 < self.images.len()
    }

    pub fn has_prev(&self) -> bool {
        self.open && self.current > 0
    }

    /// Left/Right/Escape map to prev/next/close while open; everything is
    /// ignored while closed.
    pub fn handle_key(&mut self, key: NavKey) {
        if !self.open {
            return;
        }
        match key {
            NavKey::Left => self.prev(),
            NavKey::Right => self.next(),
            NavKey::Escape => self.close(),
            NavKey::Other => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::scenario_index;
    use crate::view::ViewState;

    fn images(urls: &[&str]) -> Vec<CarouselImage> {
        urls.iter()
            .map(|u| CarouselImage {
                display_url: u.to_string(),
                filename: format!("{u}.jpg"),
            })
            .collect()
    }

    fn opened_at(url: &str) -> Carousel {
        let mut carousel = Carousel::new();
        assert!(carousel.activate(url, images(&["a", "b", "c"])));
        carousel
    }

    #[test]
    fn activate_opens_at_clicked_image() {
        let carousel = opened_at("b");
        assert!(carousel.is_open());
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.current().unwrap().display_url, "b");
    }

    #[test]
    fn activate_unknown_url_is_ignored() {
        let mut carousel = Carousel::new();
        assert!(!carousel.activate("zzz", images(&["a", "b"])));
        assert!(!carousel.is_open());
        assert!(carousel.images().is_empty());
    }

    #[test]
    fn prev_at_start_is_no_op() {
        let mut carousel = opened_at("a");
        carousel.prev();
        assert_eq!(carousel.current_index(), 0);
        assert!(carousel.is_open());
        assert!(!carousel.has_prev());
    }

    #[test]
    fn next_at_end_is_no_op() {
        let mut carousel = opened_at("c");
        carousel.next();
        assert_eq!(carousel.current_index(), 2);
        assert!(!carousel.has_next());
    }

    #[test]
    fn navigates_without_wraparound() {
        let mut carousel = opened_at("a");
        carousel.next();
        carousel.next();
        carousel.next();
        assert_eq!(carousel.current_index(), 2);
        carousel.prev();
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn keys_drive_navigation_while_open() {
        let mut carousel = opened_at("b");
        carousel.handle_key(NavKey::Right);
        assert_eq!(carousel.current_index(), 2);
        carousel.handle_key(NavKey::Left);
        carousel.handle_key(NavKey::Left);
        assert_eq!(carousel.current_index(), 0);
        carousel.handle_key(NavKey::Other);
        assert_eq!(carousel.current_index(), 0);
        carousel.handle_key(NavKey::Escape);
        assert!(!carousel.is_open());
    }

    #[test]
    fn keys_ignored_while_closed() {
        let mut carousel = opened_at("b");
        carousel.close();
        carousel.handle_key(NavKey::Right);
        assert_eq!(carousel.current_index(), 1);
        assert!(carousel.current().is_none());
        // Snapshot survives close.
        assert_eq!(carousel.images().len(), 3);
    }

    #[test]
    fn reactivation_replaces_snapshot() {
        let mut carousel = opened_at("c");
        carousel.close();
        assert!(carousel.activate("y", images(&["x", "y"])));
        assert_eq!(carousel.images().len(), 2);
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn snapshot_follows_visible_order() {
        let index = scenario_index();
        let view = ViewState::new().select_template(&index, "A");
        let snapshot = CarouselImage::from_visible(&view);
        let urls: Vec<&str> = snapshot.iter().map(|i| i.display_url.as_str()).collect();
        assert_eq!(urls, ["u1", "u2", "u3"]);
    }
}
