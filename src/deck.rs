//! In-memory slide list for the live editing session.
//!
//! Slides live only here until they are captured into a banner; dropping the
//! deck discards them. Updates are addressed by list index.

use tracing::{debug, trace};

use crate::model::{AspectRatio, Banner, Slide};

/// Partial update for a slide. `Some(value)` sets a field; an empty string
/// clears the optional overlay fields.
#[derive(Debug, Clone, Default)]
pub struct SlidePatch {
    pub image_url: Option<String>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub caption: Option<String>,
}

/// The editor's ordered slide list.
#[derive(Debug, Clone, Default)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    /// Create an empty deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck from an existing slide list.
    #[must_use]
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    /// The slides in display order.
    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Appends a slide.
    pub fn push(&mut self, slide: Slide) {
        trace!(id = %slide.id, "Slide added");
        self.slides.push(slide);
    }

    /// Removes the slide at `index`, returning it. Out-of-range indexes
    /// return `None`.
    pub fn remove(&mut self, index: usize) -> Option<Slide> {
        if index >= self.slides.len() {
            return None;
        }
        let slide = self.slides.remove(index);
        trace!(id = %slide.id, index, "Slide removed");
        Some(slide)
    }

    /// Moves the slide at `from` to position `to`. Returns false when either
    /// index is out of range.
    pub fn move_slide(&mut self, from: usize, to: usize) -> bool {
        if from >= self.slides.len() || to >= self.slides.len() {
            return false;
        }
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        trace!(from, to, "Slide moved");
        true
    }

    /// Applies a partial update to the slide at `index`. Returns false when
    /// the index is out of range.
    pub fn update(&mut self, index: usize, patch: SlidePatch) -> bool {
        let Some(slide) = self.slides.get_mut(index) else {
            return false;
        };
        if let Some(url) = patch.image_url {
            slide.image_url = url;
            slide.image_bytes = None;
        }
        if let Some(name) = patch.product_name {
            slide.product_name = normalize(name);
        }
        if let Some(link) = patch.product_link {
            slide.product_link = normalize(link);
        }
        if let Some(caption) = patch.caption {
            slide.caption = normalize(caption);
        }
        trace!(index, "Slide updated");
        true
    }

    /// Discards all slides.
    pub fn clear(&mut self) {
        debug!(count = self.slides.len(), "Deck cleared");
        self.slides.clear();
    }

    /// Captures the current slide list into a banner: a frozen copy taken at
    /// save time, detached from the live deck. In-memory image bytes are not
    /// part of the snapshot.
    #[must_use]
    pub fn freeze(&self, aspect_ratio: AspectRatio, name: Option<String>) -> Banner {
        let slides = self
            .slides
            .iter()
            .map(|s| Slide {
                image_bytes: None,
                ..s.clone()
            })
            .collect();
        Banner::new(slides, aspect_ratio, name)
    }
}

fn normalize(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(n: usize) -> SlideDeck {
        let mut deck = SlideDeck::new();
        for i in 0..n {
            deck.push(Slide::new(format!("https://cdn/img-{i}.png")));
        }
        deck
    }

    #[test]
    fn test_push_and_remove() {
        let mut deck = deck_of(2);
        assert_eq!(deck.len(), 2);

        let removed = deck.remove(0).unwrap();
        assert_eq!(removed.image_url, "https://cdn/img-0.png");
        assert_eq!(deck.len(), 1);

        assert!(deck.remove(5).is_none());

        deck.clear();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_move_slide() {
        let mut deck = deck_of(3);
        assert!(deck.move_slide(0, 2));
        assert_eq!(deck.slides()[2].image_url, "https://cdn/img-0.png");
        assert_eq!(deck.slides()[0].image_url, "https://cdn/img-1.png");

        assert!(!deck.move_slide(0, 9));
    }

    #[test]
    fn test_update_sets_and_clears() {
        let mut deck = deck_of(1);
        assert!(deck.update(
            0,
            SlidePatch {
                caption: Some("sale".to_string()),
                product_name: Some("Widget".to_string()),
                ..SlidePatch::default()
            }
        ));
        assert_eq!(deck.slides()[0].caption.as_deref(), Some("sale"));

        // Empty string clears the field.
        assert!(deck.update(
            0,
            SlidePatch {
                caption: Some(String::new()),
                ..SlidePatch::default()
            }
        ));
        assert!(deck.slides()[0].caption.is_none());
        assert_eq!(deck.slides()[0].product_name.as_deref(), Some("Widget"));

        assert!(!deck.update(4, SlidePatch::default()));
    }

    #[test]
    fn test_update_image_drops_stale_bytes() {
        let mut deck = SlideDeck::new();
        deck.push(Slide::new("https://cdn/a.png").with_bytes(vec![1, 2, 3]));

        deck.update(
            0,
            SlidePatch {
                image_url: Some("https://cdn/b.png".to_string()),
                ..SlidePatch::default()
            },
        );
        assert!(deck.slides()[0].image_bytes.is_none());
    }

    #[test]
    fn test_freeze_is_detached_copy() {
        let mut deck = SlideDeck::new();
        deck.push(Slide::new("https://cdn/a.png").with_bytes(vec![1, 2, 3]));

        let banner = deck.freeze(AspectRatio::Ratio1x1, Some("promo".to_string()));
        assert_eq!(banner.slides.len(), 1);
        assert!(banner.slides[0].image_bytes.is_none());

        // Later edits do not reach the frozen copy.
        deck.update(
            0,
            SlidePatch {
                caption: Some("changed".to_string()),
                ..SlidePatch::default()
            },
        );
        assert!(banner.slides[0].caption.is_none());
    }
}
