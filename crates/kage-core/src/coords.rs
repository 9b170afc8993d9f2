//! Transforms between region-relative and absolute desktop coordinates.
//!
//! A full-display capture uses the origin `(0, 0)`, which makes both
//! functions the identity, so callers apply them unconditionally.

use kage_types::{BoxRect, CoordinateSpace, DetectionSet, Point, TranslatedDetection};

/// Shift both corners of `bbox` by `origin`.
pub fn to_absolute(bbox: BoxRect, origin: Point) -> BoxRect {
    BoxRect::new(
        bbox.x1 + origin.x,
        bbox.y1 + origin.y,
        bbox.x2 + origin.x,
        bbox.y2 + origin.y,
    )
}

/// Inverse of [`to_absolute`].
pub fn to_relative(bbox: BoxRect, origin: Point) -> BoxRect {
    BoxRect::new(
        bbox.x1 - origin.x,
        bbox.y1 - origin.y,
        bbox.x2 - origin.x,
        bbox.y2 - origin.y,
    )
}

/// Move every box of a region-relative set into absolute space.
///
/// The recorded canvas is kept as is. Already absolute sets pass through.
pub fn into_absolute(set: DetectionSet) -> DetectionSet {
    let (items, space, canvas) = set.into_parts();
    let origin = match space {
        CoordinateSpace::Absolute => Point::ORIGIN,
        CoordinateSpace::RegionRelative { origin } => origin,
    };

    let items = items
        .into_iter()
        .map(|mut item: TranslatedDetection| {
            item.detection.bbox = to_absolute(item.detection.bbox, origin);
            item
        })
        .collect();

    DetectionSet::absolute(items, canvas)
}

#[cfg(test)]
mod tests {
    use kage_types::{CanvasSize, Detection, TranslationSource};

    use super::*;

    fn item(bbox: BoxRect) -> TranslatedDetection {
        TranslatedDetection {
            detection: Detection::new(bbox, "テスト", 0.9),
            translated_text: "test".to_string(),
            source: TranslationSource::Primary,
        }
    }

    #[test]
    fn zero_origin_is_identity() {
        let bbox = BoxRect::new(10, 10, 50, 30);
        assert_eq!(to_absolute(bbox, Point::ORIGIN), bbox);
        assert_eq!(to_relative(bbox, Point::ORIGIN), bbox);
    }

    #[test]
    fn both_corners_shift_by_origin() {
        let bbox = BoxRect::new(5, 5, 60, 25);
        let origin = Point::new(100, 200);

        let absolute = to_absolute(bbox, origin);
        assert_eq!(absolute, BoxRect::new(105, 205, 160, 225));
        assert_eq!(to_relative(absolute, origin), bbox);
    }

    #[test]
    fn negative_origin_round_trips() {
        let bbox = BoxRect::new(0, 3, 7, 9);
        let origin = Point::new(-1920, -40);
        assert_eq!(to_relative(to_absolute(bbox, origin), origin), bbox);
    }

    #[test]
    fn region_set_becomes_absolute() {
        let canvas = CanvasSize::new(1920, 1080);
        let set = DetectionSet::region_relative(
            vec![item(BoxRect::new(5, 5, 60, 25))],
            Point::new(100, 200),
            canvas,
        );

        let absolute = into_absolute(set);
        assert_eq!(absolute.space(), CoordinateSpace::Absolute);
        assert_eq!(absolute.canvas(), canvas);
        assert_eq!(absolute.items()[0].bbox(), BoxRect::new(105, 205, 160, 225));
    }

    #[test]
    fn absolute_set_passes_through() {
        let set = DetectionSet::absolute(
            vec![item(BoxRect::new(10, 10, 50, 30))],
            CanvasSize::new(800, 600),
        );
        assert_eq!(into_absolute(set.clone()), set);
    }
}
