use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::detection::domain::age_gender_predictor::AgeGenderPredictor;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::identification::domain::creator_estimate::IdentificationOutcome;
use crate::identification::domain::creator_identifier::CreatorIdentifier;
use crate::identification::domain::face_observation::FaceObservation;
use crate::identification::domain::feature_extractor::FeatureExtractor;
use crate::identification::domain::identification_error::IdentificationError;
use crate::imaging::domain::batch_image::BatchImage;
use crate::imaging::domain::image_loader::ImageLoader;
use crate::pipeline::pipeline_logger::{PipelineLogger, Skip};
use crate::shared::constants::DEFAULT_GENDER_CONFIDENCE;

/// Where one account's run currently stands.
///
/// Every transition is reported through [`PipelineLogger::info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    /// Running detection and prediction over image group `i` (zero-based).
    DetectingBatch(usize),
    /// Appending a finished group's observations to the account's list.
    AccumulatingObservations,
    Identifying,
    Done,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Idle => write!(f, "idle"),
            OrchestratorState::DetectingBatch(i) => write!(f, "detecting batch {}", i + 1),
            OrchestratorState::AccumulatingObservations => write!(f, "accumulating observations"),
            OrchestratorState::Identifying => write!(f, "identifying"),
            OrchestratorState::Done => write!(f, "done"),
        }
    }
}

/// Drives detection and prediction over an account's images, collects the
/// usable face observations and hands the full list to the identifier.
///
/// Images are visited in fixed-size groups; grouping never changes the
/// result because identification always sees the whole account at once.
pub struct IdentifyCreatorUseCase {
    loader: Box<dyn ImageLoader>,
    detector: Box<dyn FaceDetector>,
    predictor: Box<dyn AgeGenderPredictor>,
    extractor: Box<dyn FeatureExtractor>,
    identifier: CreatorIdentifier,
    batch_size: usize,
    logger: Box<dyn PipelineLogger>,
    state: OrchestratorState,
}

impl IdentifyCreatorUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loader: Box<dyn ImageLoader>,
        detector: Box<dyn FaceDetector>,
        predictor: Box<dyn AgeGenderPredictor>,
        extractor: Box<dyn FeatureExtractor>,
        identifier: CreatorIdentifier,
        batch_size: usize,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            loader,
            detector,
            predictor,
            extractor,
            identifier,
            batch_size: batch_size.max(1),
            logger,
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Identifies the subject of `account_id` from `images`.
    ///
    /// Unreadable images and detector or predictor failures are logged and
    /// skipped. Only an invariant violation inside identification is
    /// returned as an error.
    pub fn execute(
        &mut self,
        account_id: &str,
        images: &[PathBuf],
    ) -> Result<IdentificationOutcome, IdentificationError> {
        let total = images.len();
        let mut observations: Vec<FaceObservation> = Vec::new();

        for (group, chunk) in images.chunks(self.batch_size).enumerate() {
            self.enter(OrchestratorState::DetectingBatch(group));
            let mut found = Vec::new();
            for (offset, path) in chunk.iter().enumerate() {
                found.extend(self.observe_image(path));
                self.logger
                    .progress(group * self.batch_size + offset + 1, total);
            }

            self.enter(OrchestratorState::AccumulatingObservations);
            observations.append(&mut found);
        }

        self.enter(OrchestratorState::Identifying);
        self.logger.info(&format!(
            "{} observations across {total} images",
            observations.len()
        ));

        let t0 = Instant::now();
        let result = self.identifier.identify(account_id, &observations);
        self.logger
            .timing("identify", t0.elapsed().as_secs_f64() * 1000.0);
        self.logger.summary();

        self.enter(OrchestratorState::Done);
        result
    }

    fn enter(&mut self, state: OrchestratorState) {
        self.state = state;
        self.logger.info(&state.to_string());
    }

    /// Runs one image through load, detect and predict. Any failure counts
    /// as an image with no faces.
    fn observe_image(&mut self, path: &Path) -> Vec<FaceObservation> {
        let t0 = Instant::now();
        let image = match self.loader.load(path) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Skipping {}: failed to load: {e}", path.display());
                self.logger.skipped(Skip::UnreadableImage);
                return Vec::new();
            }
        };
        self.logger
            .timing("load", t0.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        let mut detections = match self.detector.detect(&image) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("Skipping {}: detection failed: {e}", image.image_ref);
                self.logger.skipped(Skip::DetectionFailed);
                return Vec::new();
            }
        };
        self.logger
            .timing("detect", t0.elapsed().as_secs_f64() * 1000.0);

        if !detections.iter().any(|d| d.is_face()) {
            log::debug!("No faces in {}", image.image_ref);
            return Vec::new();
        }

        let t0 = Instant::now();
        if let Err(e) = self.predictor.predict(&image, &mut detections) {
            log::warn!("Skipping {}: prediction failed: {e}", image.image_ref);
            self.logger.skipped(Skip::PredictionFailed);
            return Vec::new();
        }
        self.logger
            .timing("predict", t0.elapsed().as_secs_f64() * 1000.0);

        let mut observations = Vec::new();
        for detection in detections.iter().filter(|d| d.is_face()) {
            match self.to_observation(&image, detection) {
                Ok(observation) => {
                    self.logger.face_kept();
                    observations.push(observation);
                }
                Err(skip) => {
                    log::debug!("Skipping face in {}: {skip}", image.image_ref);
                    self.logger.skipped(skip);
                }
            }
        }
        observations
    }

    fn to_observation(
        &self,
        image: &BatchImage,
        detection: &Detection,
    ) -> Result<FaceObservation, Skip> {
        let (Some(age), Some(gender)) = (detection.age, detection.gender) else {
            return Err(Skip::MissingAttributes);
        };
        if !age.is_finite() || age < 0.0 {
            return Err(Skip::InvalidAge);
        }
        let rect = detection
            .bounding_box
            .to_pixel_rect(image.frame.width(), image.frame.height())
            .ok_or(Skip::DegenerateBox)?;

        let features = self.extractor.extract(&image.frame.crop(&rect));
        let confidence = detection
            .gender_confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_GENDER_CONFIDENCE)
            .clamp(0.0, 1.0);

        Ok(FaceObservation {
            image_ref: image.image_ref.clone(),
            bounding_box: detection.bounding_box,
            features,
            age,
            gender,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection::{DetectionCategory, Gender};
    use crate::identification::domain::creator_estimate::NoResultReason;
    use crate::identification::infrastructure::dbscan_clusterer::DbscanClusterer;
    use crate::identification::infrastructure::grayscale_feature_extractor::GrayscaleFeatureExtractor;
    use crate::identification::infrastructure::pca_reducer::PcaReducer;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    /// Serves solid-colour 40x40 frames keyed by file name; unknown names fail.
    struct StubLoader {
        shades: HashMap<String, u8>,
    }

    impl ImageLoader for StubLoader {
        fn load(&self, path: &Path) -> Result<BatchImage, Box<dyn std::error::Error>> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let shade = *self.shades.get(&name).ok_or("unreadable image")?;
            Ok(BatchImage::new(name, Frame::new(vec![shade; 40 * 40 * 3], 40, 40, 3)))
        }
    }

    /// Annotated detections per image; names listed in `failing` error out.
    #[derive(Clone, Default)]
    struct StubAnnotations {
        detections: HashMap<String, Vec<Detection>>,
        failing_detect: Vec<String>,
        failing_predict: Vec<String>,
    }

    struct StubDetector(StubAnnotations);

    impl FaceDetector for StubDetector {
        fn detect(
            &mut self,
            image: &BatchImage,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            if self.0.failing_detect.contains(&image.image_ref) {
                return Err("detector crashed".into());
            }
            Ok(self
                .0
                .detections
                .get(&image.image_ref)
                .map(|ds| {
                    ds.iter()
                        .map(|d| Detection::new(d.bounding_box, d.category))
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    struct StubPredictor(StubAnnotations);

    impl AgeGenderPredictor for StubPredictor {
        fn predict(
            &mut self,
            image: &BatchImage,
            detections: &mut [Detection],
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.0.failing_predict.contains(&image.image_ref) {
                return Err("predictor crashed".into());
            }
            let annotated = &self.0.detections[&image.image_ref];
            for (d, a) in detections.iter_mut().zip(annotated) {
                d.age = a.age;
                d.gender = a.gender;
                d.gender_confidence = a.gender_confidence;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorded {
        infos: Vec<String>,
        kept: usize,
        skips: Vec<Skip>,
    }

    /// Keeps every event so tests can inspect them after `execute`.
    #[derive(Clone, Default)]
    struct RecordingLogger(Arc<Mutex<Recorded>>);

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, _current: usize, _total: usize) {}
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}

        fn face_kept(&mut self) {
            self.0.lock().unwrap().kept += 1;
        }

        fn skipped(&mut self, skip: Skip) {
            self.0.lock().unwrap().skips.push(skip);
        }

        fn info(&mut self, message: &str) {
            self.0.lock().unwrap().infos.push(message.to_string());
        }
    }

    fn face(age: Option<f64>, gender: Option<Gender>) -> Detection {
        Detection {
            bounding_box: BoundingBox::new(5.0, 5.0, 35.0, 35.0),
            category: DetectionCategory::Face,
            age,
            gender,
            gender_confidence: Some(0.9),
        }
    }

    fn use_case(
        shades: &[(&str, u8)],
        annotations: StubAnnotations,
        batch_size: usize,
    ) -> IdentifyCreatorUseCase {
        recorded_use_case(shades, annotations, batch_size, Box::new(NullPipelineLogger))
    }

    fn recorded_use_case(
        shades: &[(&str, u8)],
        annotations: StubAnnotations,
        batch_size: usize,
        logger: Box<dyn PipelineLogger>,
    ) -> IdentifyCreatorUseCase {
        let loader = StubLoader {
            shades: shades.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
        };
        IdentifyCreatorUseCase::new(
            Box::new(loader),
            Box::new(StubDetector(annotations.clone())),
            Box::new(StubPredictor(annotations)),
            Box::new(GrayscaleFeatureExtractor::default()),
            CreatorIdentifier::new(
                Box::new(PcaReducer::default()),
                Box::new(DbscanClusterer::default()),
            ),
            batch_size,
            logger,
        )
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/acct/{n}"))).collect()
    }

    fn annotations(entries: Vec<(&str, Vec<Detection>)>) -> StubAnnotations {
        StubAnnotations {
            detections: entries
                .into_iter()
                .map(|(n, d)| (n.to_string(), d))
                .collect(),
            ..Default::default()
        }
    }

    // --- Tests ---

    #[test]
    fn test_same_face_across_images() {
        let ann = annotations(vec![
            ("a.jpg", vec![face(Some(20.0), Some(Gender::Female))]),
            ("b.jpg", vec![face(Some(22.0), Some(Gender::Female))]),
            ("c.jpg", vec![face(Some(24.0), Some(Gender::Female))]),
        ]);
        let mut uc = use_case(&[("a.jpg", 100), ("b.jpg", 100), ("c.jpg", 100)], ann, 16);
        assert_eq!(uc.state(), OrchestratorState::Idle);

        let outcome = uc.execute("alice", &paths(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();
        let estimate = outcome.estimate().unwrap();
        assert_eq!(estimate.age, 22.0);
        assert_eq!(estimate.gender, Gender::Female);
        assert_eq!(estimate.appearances, 3);
        assert_eq!(estimate.total_faces, 3);
        assert_eq!(uc.state(), OrchestratorState::Done);
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let ann = annotations(vec![
            ("a.jpg", vec![face(Some(30.0), Some(Gender::Male))]),
            ("b.jpg", vec![face(Some(34.0), Some(Gender::Male))]),
        ]);
        let mut uc = use_case(&[("a.jpg", 90), ("b.jpg", 90)], ann, 16);

        let outcome = uc
            .execute("bob", &paths(&["a.jpg", "missing.jpg", "b.jpg"]))
            .unwrap();
        assert_eq!(outcome.estimate().unwrap().total_faces, 2);
    }

    #[test]
    fn test_detector_and_predictor_failures_are_skipped() {
        let mut ann = annotations(vec![
            ("a.jpg", vec![face(Some(30.0), Some(Gender::Male))]),
            ("b.jpg", vec![face(Some(99.0), Some(Gender::Female))]),
            ("c.jpg", vec![face(Some(98.0), Some(Gender::Female))]),
        ]);
        ann.failing_detect.push("b.jpg".into());
        ann.failing_predict.push("c.jpg".into());
        let mut uc = use_case(&[("a.jpg", 90), ("b.jpg", 90), ("c.jpg", 90)], ann, 2);

        let outcome = uc.execute("bob", &paths(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();
        let estimate = outcome.estimate().unwrap();
        assert_eq!(estimate.total_faces, 1);
        assert_eq!(estimate.age, 30.0);
    }

    #[test]
    fn test_faces_without_attributes_are_dropped() {
        let ann = annotations(vec![(
            "a.jpg",
            vec![
                face(Some(30.0), None),
                face(None, Some(Gender::Male)),
                face(Some(-1.0), Some(Gender::Male)),
                face(Some(40.0), Some(Gender::Male)),
            ],
        )]);
        let mut uc = use_case(&[("a.jpg", 90)], ann, 16);

        let outcome = uc.execute("carol", &paths(&["a.jpg"])).unwrap();
        let estimate = outcome.estimate().unwrap();
        assert_eq!(estimate.total_faces, 1);
        assert_eq!(estimate.age, 40.0);
    }

    #[test]
    fn test_person_and_degenerate_boxes_are_dropped() {
        let mut person = face(Some(50.0), Some(Gender::Female));
        person.category = DetectionCategory::Person;
        let mut degenerate = face(Some(60.0), Some(Gender::Female));
        degenerate.bounding_box = BoundingBox::new(10.0, 10.0, 10.0, 30.0);
        let mut outside = face(Some(70.0), Some(Gender::Female));
        outside.bounding_box = BoundingBox::new(100.0, 100.0, 120.0, 120.0);

        let ann = annotations(vec![(
            "a.jpg",
            vec![person, degenerate, outside, face(Some(25.0), Some(Gender::Male))],
        )]);
        let mut uc = use_case(&[("a.jpg", 90)], ann, 16);

        let outcome = uc.execute("dave", &paths(&["a.jpg"])).unwrap();
        let estimate = outcome.estimate().unwrap();
        assert_eq!(estimate.total_faces, 1);
        assert_eq!(estimate.gender, Gender::Male);
    }

    #[test]
    fn test_no_faces_anywhere_is_no_result() {
        let ann = annotations(vec![("a.jpg", Vec::new()), ("b.jpg", Vec::new())]);
        let mut uc = use_case(&[("a.jpg", 10), ("b.jpg", 10)], ann, 16);

        let outcome = uc.execute("erin", &paths(&["a.jpg", "b.jpg"])).unwrap();
        assert_eq!(
            outcome,
            IdentificationOutcome::NoResult {
                account_id: "erin".into(),
                reason: NoResultReason::NoUsableObservations,
            }
        );
        assert_eq!(uc.state(), OrchestratorState::Done);
    }

    #[test]
    fn test_empty_image_list_is_no_result() {
        let mut uc = use_case(&[], StubAnnotations::default(), 16);
        let outcome = uc.execute("frank", &[]).unwrap();
        assert!(outcome.estimate().is_none());
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let entries = || {
            annotations(vec![
                ("a.jpg", vec![face(Some(30.0), Some(Gender::Male))]),
                ("b.jpg", vec![face(Some(32.0), Some(Gender::Male))]),
                ("c.jpg", vec![face(Some(50.0), Some(Gender::Female))]),
                ("d.jpg", vec![face(Some(34.0), Some(Gender::Male))]),
            ])
        };
        let shades = [("a.jpg", 80), ("b.jpg", 80), ("c.jpg", 250), ("d.jpg", 80)];
        let images = paths(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);

        let whole = use_case(&shades, entries(), 16).execute("g", &images).unwrap();
        let split = use_case(&shades, entries(), 1).execute("g", &images).unwrap();
        assert_eq!(whole, split);

        let estimate = whole.estimate().unwrap();
        assert_eq!(estimate.age, 32.0);
        assert_eq!(estimate.appearances, 3);
        assert_eq!(estimate.total_faces, 4);
        assert_eq!(estimate.identities, 2);
    }

    #[test]
    fn test_missing_confidence_defaults() {
        let mut f = face(Some(30.0), Some(Gender::Male));
        f.gender_confidence = None;
        let ann = annotations(vec![("a.jpg", vec![f])]);
        let mut uc = use_case(&[("a.jpg", 90)], ann, 16);

        let outcome = uc.execute("h", &paths(&["a.jpg"])).unwrap();
        assert_eq!(outcome.estimate().unwrap().mean_confidence, 0.5);
    }

    #[test]
    fn test_state_changes_at_group_boundaries() {
        let ann = annotations(vec![
            ("a.jpg", vec![face(Some(30.0), Some(Gender::Male))]),
            ("b.jpg", vec![face(Some(31.0), Some(Gender::Male))]),
            ("c.jpg", vec![face(Some(32.0), Some(Gender::Male))]),
        ]);
        let logger = RecordingLogger::default();
        let mut uc = recorded_use_case(
            &[("a.jpg", 90), ("b.jpg", 90), ("c.jpg", 90)],
            ann,
            2,
            Box::new(logger.clone()),
        );
        uc.execute("ivy", &paths(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();

        let recorded = logger.0.lock().unwrap();
        let states: Vec<&str> = recorded
            .infos
            .iter()
            .map(|m| m.as_str())
            .filter(|m| !m.contains("observations across"))
            .collect();
        assert_eq!(
            states,
            vec![
                "detecting batch 1",
                "accumulating observations",
                "detecting batch 2",
                "accumulating observations",
                "identifying",
                "done",
            ]
        );
        assert!(recorded
            .infos
            .contains(&"3 observations across 3 images".to_string()));
    }

    #[test]
    fn test_kept_and_skipped_faces_reported() {
        let mut degenerate = face(Some(60.0), Some(Gender::Female));
        degenerate.bounding_box = BoundingBox::new(10.0, 10.0, 10.0, 30.0);
        let mut ann = annotations(vec![
            (
                "a.jpg",
                vec![
                    face(Some(30.0), None),
                    face(Some(f64::NAN), Some(Gender::Male)),
                    degenerate,
                    face(Some(40.0), Some(Gender::Male)),
                ],
            ),
            ("b.jpg", vec![face(Some(41.0), Some(Gender::Male))]),
            ("c.jpg", vec![face(Some(42.0), Some(Gender::Male))]),
        ]);
        ann.failing_predict.push("c.jpg".into());
        let logger = RecordingLogger::default();
        let mut uc = recorded_use_case(
            &[("a.jpg", 90), ("b.jpg", 90), ("c.jpg", 90)],
            ann,
            16,
            Box::new(logger.clone()),
        );
        uc.execute("jo", &paths(&["a.jpg", "missing.jpg", "b.jpg", "c.jpg"]))
            .unwrap();

        let recorded = logger.0.lock().unwrap();
        assert_eq!(recorded.kept, 2);
        assert_eq!(
            recorded.skips,
            vec![
                Skip::MissingAttributes,
                Skip::InvalidAge,
                Skip::DegenerateBox,
                Skip::UnreadableImage,
                Skip::PredictionFailed,
            ]
        );
    }
}
