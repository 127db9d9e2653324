//! Splitting a tall snapshot across fixed-height pages

/// Remaining heights at or below this are treated as fully placed
const EPSILON: f64 = 1e-6;

/// Where the full snapshot is drawn on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based page index
    pub page: usize,
    /// Vertical draw offset of the snapshot's top edge from the page top.
    /// Negative values shift the snapshot up, revealing a lower slice.
    pub offset_y: f64,
}

/// Plan the pages for a snapshot of `image_height` on pages of `page_height`
///
/// A snapshot that fits is placed once at the top of a single page.
/// Otherwise page `k` draws the same snapshot shifted up by `k` page heights
/// until the remaining height is used up, which yields
/// `ceil(image_height / page_height)` pages and never a trailing blank page.
pub fn paginate(image_height: f64, page_height: f64) -> Vec<Placement> {
    if !(page_height > 0.0) || image_height <= page_height {
        return vec![Placement {
            page: 0,
            offset_y: 0.0,
        }];
    }

    let mut placements = Vec::new();
    let mut remaining = image_height;
    let mut position = 0.0;

    while remaining > EPSILON {
        placements.push(Placement {
            page: placements.len(),
            offset_y: -position,
        });
        let portion = remaining.min(page_height);
        position += portion;
        remaining -= portion;
    }

    placements
}
