use std::sync::Arc;

use kage_types::Detection;

use crate::language::ScriptPredicate;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};

/// Keeps detections worth translating.
///
/// Text is preprocessed first; a detection survives when the cleaned text
/// is non-empty, its confidence reaches the threshold and the text matches
/// the subject script.
pub struct DetectionFilter {
    min_confidence: f32,
    script: Arc<dyn ScriptPredicate>,
    preprocessor: DefaultPreprocessor,
}

impl DetectionFilter {
    pub fn new(min_confidence: f32, script: Arc<dyn ScriptPredicate>) -> Self {
        Self {
            min_confidence,
            script,
            preprocessor: DefaultPreprocessor,
        }
    }

    pub fn retain(&self, detections: Vec<Detection>) -> Vec<Detection> {
        let total = detections.len();
        let kept: Vec<Detection> = detections
            .into_iter()
            .filter_map(|mut detection| {
                detection.text = self.preprocessor.process(&detection.text);
                if self.accepts(&detection) {
                    Some(detection)
                } else {
                    tracing::trace!(
                        "Dropping detection {:?} (confidence {:.2})",
                        detection.text,
                        detection.confidence
                    );
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Kept {}/{} detections (min confidence {:.2}, script {})",
            kept.len(),
            total,
            self.min_confidence,
            self.script.name()
        );
        kept
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        !detection.text.is_empty()
            && detection.confidence >= self.min_confidence
            && self.script.matches(&detection.text)
    }
}
