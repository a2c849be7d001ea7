//! Recognized words and the pages that carry them.

use serde::{Deserialize, Serialize};

use super::config::DpiScaling;

/// A recognized word with an axis-aligned pixel bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Recognized text.
    pub text: String,
    /// Left edge in pixels.
    pub left: i32,
    /// Top edge in pixels (origin at the top of the page).
    pub top: i32,
    /// Right edge in pixels.
    pub right: i32,
    /// Bottom edge in pixels.
    pub bottom: i32,
}

impl Word {
    pub fn new(text: impl Into<String>, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the box in pixels.
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the box in pixels.
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Rescale every coordinate from `dpi.source_dpi` to `dpi.target_dpi`.
    pub fn scaled(&self, dpi: &DpiScaling) -> Self {
        Self {
            text: self.text.clone(),
            left: dpi.scale(self.left as f64),
            top: dpi.scale(self.top as f64),
            right: dpi.scale(self.right as f64),
            bottom: dpi.scale(self.bottom as f64),
        }
    }
}

/// Union box over a set of words as `(left, top, right, bottom)`.
pub fn union_box<'a>(words: impl IntoIterator<Item = &'a Word>) -> Option<(i32, i32, i32, i32)> {
    words.into_iter().fold(None, |acc, w| {
        Some(match acc {
            None => (w.left, w.top, w.right, w.bottom),
            Some((l, t, r, b)) => (l.min(w.left), t.min(w.top), r.max(w.right), b.max(w.bottom)),
        })
    })
}

/// One page of words in a single pixel space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Words in the source's native scan order.
    pub words: Vec<Word>,
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
}

impl Page {
    pub fn new(words: Vec<Word>, width: u32, height: u32) -> Self {
        Self {
            words,
            width,
            height,
        }
    }

    /// Words joined with spaces, for logging and plain-text output.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
