//! Decomposition of a selection into the overlay's opaque shape regions.

use xengine::Rect;

/// Opaque regions of the overlay for a selection `rect`.
///
/// Highlight mode fills the selection itself. Outline mode produces four
/// strips of thickness `border` that sit entirely outside `rect`, so the
/// interior stays transparent. The left and right strips are `2 * border`
/// taller than the horizontal ones; that closes the corners, and since the
/// shape combine is a union the overlap at the outer corners is harmless.
pub fn bounding_regions(rect: &Rect, border: u32, highlight: bool) -> Vec<Rect> {
    if highlight {
        return vec![*rect];
    }

    let b = border as i32;
    vec![
        // Left
        Rect::new(rect.x - b, rect.y - b, border, rect.height + 2 * border),
        // Top
        Rect::new(rect.x, rect.y - b, rect.width + border, border),
        // Right
        Rect::new(rect.right(), rect.y - b, border, rect.height + 2 * border),
        // Bottom
        Rect::new(rect.x, rect.bottom(), rect.width + border, border),
    ]
}

/// Zero-size input region: with this as the input shape the overlay never
/// receives pointer or keyboard events, everything falls through to the
/// windows beneath it.
pub fn input_passthrough_region() -> Rect {
    Rect::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_strips_frame_the_rect() {
        let rect = Rect::new(10, 10, 50, 30);
        let regions = bounding_regions(&rect, 4, false);

        assert_eq!(
            regions,
            vec![
                Rect::new(6, 6, 4, 38),
                Rect::new(10, 6, 54, 4),
                Rect::new(60, 6, 4, 38),
                Rect::new(10, 40, 54, 4),
            ]
        );
    }

    #[test]
    fn strips_leave_the_interior_uncovered() {
        let rect = Rect::new(10, 10, 50, 30);
        let regions = bounding_regions(&rect, 4, false);

        for x in rect.x..rect.right() {
            for y in rect.y..rect.bottom() {
                assert!(
                    !regions.iter().any(|r| r.contains(x, y)),
                    "interior point ({x},{y}) is covered"
                );
            }
        }
    }

    #[test]
    fn strips_cover_the_full_frame() {
        let rect = Rect::new(10, 10, 50, 30);
        let border = 4;
        let regions = bounding_regions(&rect, border, false);
        let b = border as i32;

        // Every pixel of the border frame, corners included, belongs to at
        // least one strip.
        for x in rect.x - b..rect.right() + b {
            for y in rect.y - b..rect.bottom() + b {
                let inside = rect.contains(x, y);
                let covered = regions.iter().any(|r| r.contains(x, y));
                assert_eq!(covered, !inside, "frame gap at ({x},{y})");
            }
        }
    }

    #[test]
    fn highlight_ignores_border() {
        let rect = Rect::new(0, 0, 100, 50);

        assert_eq!(bounding_regions(&rect, 0, true), vec![rect]);
        assert_eq!(bounding_regions(&rect, 7, true), vec![rect]);
    }

    #[test]
    fn zero_border_outline_degenerates() {
        let rect = Rect::new(10, 10, 50, 30);
        let regions = bounding_regions(&rect, 0, false);

        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| r.width == 0 || r.height == 0));
    }

    #[test]
    fn identical_input_gives_identical_regions() {
        let rect = Rect::new(3, 4, 20, 10);
        assert_eq!(
            bounding_regions(&rect, 2, false),
            bounding_regions(&rect, 2, false)
        );
    }

    #[test]
    fn input_region_is_empty() {
        let region = input_passthrough_region();
        assert_eq!(region, Rect::new(0, 0, 0, 0));
    }
}
