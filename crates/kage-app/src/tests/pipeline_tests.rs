use kage_types::{
    BoxRect, CanvasSize, CoordinateSpace, Detection, SelectionRegion, TranslationSource,
};

use super::*;
use crate::pipeline::PipelineError;

#[tokio::test]
async fn full_capture_end_to_end() {
    let screen = FakeScreen::new(geometry(800, 600));
    let detector = ScriptedDetector::replying(vec![Detection::new(
        BoxRect::new(10, 10, 50, 30),
        "こんにちは",
        0.9,
    )]);
    let primary = FixedTranslator::replying("DeepL", "Hello");
    let pipeline = pipeline(screen.clone(), detector, Some(primary), None);

    let set = pipeline.run(None).await.unwrap();

    assert_eq!(set.space(), CoordinateSpace::Absolute);
    assert_eq!(set.canvas(), CanvasSize::new(800, 600));
    assert_eq!(set.len(), 1);
    let item = &set.items()[0];
    assert_eq!(item.bbox(), BoxRect::new(10, 10, 50, 30));
    assert_eq!(item.translated_text, "Hello");
    assert_eq!(item.source, TranslationSource::Primary);

    let frame = renderer().render(&set).unwrap();
    assert_eq!(frame.dimensions(), (800, 600));
    assert_eq!(frame.get_pixel(10, 10).0[3], 200);
    assert_eq!(frame.get_pixel(9, 10).0[3], 0);
    assert_eq!(frame.get_pixel(50, 29).0[3], 0);
    assert_eq!(frame.get_pixel(49, 30).0[3], 0);
    assert_eq!(screen.requests.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn region_capture_lands_in_absolute_space() {
    let screen = FakeScreen::new(geometry(1920, 1080));
    let detector = ScriptedDetector::replying(vec![Detection::new(
        BoxRect::new(5, 5, 60, 25),
        "猫",
        0.8,
    )]);
    let primary = FixedTranslator::replying("DeepL", "Cat");
    let pipeline = pipeline(screen.clone(), detector.clone(), Some(primary), None);
    let region = SelectionRegion::new(100, 200, 300, 150).unwrap();

    let set = pipeline.run(Some(region)).await.unwrap();

    assert_eq!(detector.seen_sizes.lock().unwrap().as_slice(), &[(300, 150)]);
    assert_eq!(set.space(), CoordinateSpace::Absolute);
    assert_eq!(set.canvas(), CanvasSize::new(1920, 1080));
    assert_eq!(set.items()[0].bbox(), BoxRect::new(105, 205, 160, 225));
    assert_eq!(screen.requests.lock().unwrap().as_slice(), &[Some(region)]);
}

#[tokio::test]
async fn both_modes_share_the_display_raster_canvas() {
    // Backend reports logical geometry but hands back physical pixels
    let screen = FakeScreen::with_raster(geometry(800, 600), CanvasSize::new(1600, 1200));
    let detector = ScriptedDetector::replying(vec![Detection::new(
        BoxRect::new(10, 10, 60, 40),
        "夜",
        0.9,
    )]);
    let primary = FixedTranslator::replying("DeepL", "Night");
    let pipeline = pipeline(screen, detector, Some(primary), None);
    let region = SelectionRegion::new(1000, 900, 100, 100).unwrap();

    let full = pipeline.run(None).await.unwrap();
    let set = pipeline.run(Some(region)).await.unwrap();

    assert_eq!(full.canvas(), CanvasSize::new(1600, 1200));
    assert_eq!(set.canvas(), full.canvas());
    assert_eq!(set.items()[0].bbox(), BoxRect::new(1010, 910, 1060, 940));

    let frame = renderer().render(&set).unwrap();
    assert_eq!(frame.dimensions(), (1600, 1200));
    assert_eq!(frame.get_pixel(1010, 910).0[3], 200);
}

#[tokio::test]
async fn weak_and_blank_detections_are_not_translated() {
    let screen = FakeScreen::new(geometry(400, 300));
    let detector = ScriptedDetector::replying(vec![
        Detection::new(BoxRect::new(0, 0, 10, 10), "  ", 0.99),
        Detection::new(BoxRect::new(20, 20, 40, 40), "かすれ", 0.1),
        Detection::new(BoxRect::new(50, 50, 90, 70), " 本 ", 0.7),
    ]);
    let primary = FixedTranslator::replying("DeepL", "Book");
    let pipeline = pipeline(screen, detector, Some(primary.clone()), None);

    let set = pipeline.run(None).await.unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.items()[0].original_text(), "本");
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn failing_primary_falls_back_per_detection() {
    let screen = FakeScreen::new(geometry(400, 300));
    let detector = ScriptedDetector::replying(vec![
        Detection::new(BoxRect::new(0, 0, 40, 20), "一", 0.9),
        Detection::new(BoxRect::new(0, 30, 40, 50), "二", 0.9),
    ]);
    let primary = FixedTranslator::failing("DeepL");
    let secondary = FixedTranslator::replying("Local", "number");
    let pipeline = pipeline(screen, detector, Some(primary.clone()), Some(secondary.clone()));

    let set = pipeline.run(None).await.unwrap();

    assert!(set
        .items()
        .iter()
        .all(|item| item.translated_text == "number" && item.source == TranslationSource::Secondary));
    assert_eq!(primary.calls(), 2);
    assert_eq!(secondary.calls(), 2);
}

#[tokio::test]
async fn nothing_configured_marks_the_text() {
    let screen = FakeScreen::new(geometry(400, 300));
    let detector =
        ScriptedDetector::replying(vec![Detection::new(BoxRect::new(0, 0, 40, 20), "水", 0.9)]);
    let pipeline = pipeline(screen, detector, None, None);

    let set = pipeline.run(None).await.unwrap();

    assert_eq!(set.items()[0].translated_text, "[No Translator] 水");
    assert_eq!(set.items()[0].source, TranslationSource::None);
}

#[tokio::test]
async fn detection_failure_is_reported_with_its_stage() {
    let screen = FakeScreen::new(geometry(400, 300));
    let pipeline = pipeline(screen, ScriptedDetector::failing(), None, None);

    let err = pipeline.run(None).await.unwrap_err();
    assert!(matches!(err, PipelineError::Detect(_)));
    assert!(err.to_string().starts_with("detection stage failed"));
}

#[tokio::test]
async fn out_of_bounds_region_fails_in_capture() {
    struct CroppingScreen;

    impl ScreenCapture for CroppingScreen {
        fn display_geometry(&self) -> Result<DisplayGeometry, CaptureError> {
            Ok(geometry(100, 100))
        }

        fn capture(&self, region: Option<SelectionRegion>) -> Result<Captured, CaptureError> {
            let full = RgbImage::new(100, 100);
            match region {
                Some(region) => Captured::region(&full, region),
                None => Ok(Captured::full(full)),
            }
        }
    }

    let pipeline = CapturePipeline::new(
        Arc::new(CroppingScreen),
        ScriptedDetector::replying(Vec::new()),
        DetectionFilter::new(0.0, Arc::new(AnyScript)),
        FallbackChain::new(None, None, "ja", "en-US"),
    );
    let region = SelectionRegion::new(80, 80, 50, 50).unwrap();

    let err = pipeline.run(Some(region)).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Capture(CaptureError::OutOfBounds { .. })
    ));
}
