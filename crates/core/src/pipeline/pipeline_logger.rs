use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Instant;

/// Why an image or a single face contributed no observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Skip {
    UnreadableImage,
    DetectionFailed,
    PredictionFailed,
    MissingAttributes,
    InvalidAge,
    DegenerateBox,
}

impl Skip {
    /// True for skips that drop every face of an image at once.
    pub fn is_whole_image(self) -> bool {
        matches!(
            self,
            Skip::UnreadableImage | Skip::DetectionFailed | Skip::PredictionFailed
        )
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Skip::UnreadableImage => "unreadable",
            Skip::DetectionFailed => "detection failed",
            Skip::PredictionFailed => "prediction failed",
            Skip::MissingAttributes => "missing age or gender",
            Skip::InvalidAge => "invalid age",
            Skip::DegenerateBox => "degenerate box",
        };
        f.write_str(label)
    }
}

/// Observer for one account's identification run.
///
/// The use case reports progress, stage timings and the fate of every
/// detected face here; callers decide where the events go.
pub trait PipelineLogger: Send {
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one image or the whole account.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A face became an observation.
    fn face_kept(&mut self);

    fn skipped(&mut self, skip: Skip);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn face_kept(&mut self) {}
    fn skipped(&mut self, _skip: Skip) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger for one account. Events go through the `log` crate, prefixed
/// with the account label; progress lines every `throttle_images` images.
pub struct StdoutPipelineLogger {
    label: String,
    throttle_images: usize,
    timings: HashMap<String, Vec<f64>>,
    faces_kept: usize,
    skips: BTreeMap<Skip, usize>,
    start_time: Instant,
    total_images: usize,
}

impl StdoutPipelineLogger {
    pub fn new(label: impl Into<String>, throttle_images: usize) -> Self {
        Self {
            label: label.into(),
            throttle_images: throttle_images.max(1),
            timings: HashMap::new(),
            faces_kept: 0,
            skips: BTreeMap::new(),
            start_time: Instant::now(),
            total_images: 0,
        }
    }

    /// Returns the formatted summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.faces_kept == 0 && self.skips.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Summary for {} ({} images, {elapsed_s:.1}s):",
            self.label, self.total_images
        )];

        let (image_skips, face_skips): (Vec<_>, Vec<_>) =
            self.skips.iter().partition(|(skip, _)| skip.is_whole_image());
        lines.push(format!(
            "  faces: {} kept, {} skipped{}",
            self.faces_kept,
            face_skips.iter().map(|(_, n)| **n).sum::<usize>(),
            breakdown(&face_skips)
        ));
        if !image_skips.is_empty() {
            lines.push(format!(
                "  images skipped: {}{}",
                image_skips.iter().map(|(_, n)| **n).sum::<usize>(),
                breakdown(&image_skips)
            ));
        }

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            lines.push(format!(
                "  {stage:8}: avg {:6.1}ms  total {total_ms:7.0}ms",
                total_ms / durations.len() as f64
            ));
        }

        Some(lines.join("\n"))
    }
}

/// ` (reason n, reason n)`, or nothing when there are no entries.
fn breakdown(entries: &[(&Skip, &usize)]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = entries.iter().map(|(s, n)| format!("{s} {n}")).collect();
    format!(" ({})", parts.join(", "))
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_images = total;
        if total > 0 && (current % self.throttle_images == 0 || current == total) {
            log::info!("{}: {current}/{total} images", self.label);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn face_kept(&mut self) {
        self.faces_kept += 1;
    }

    fn skipped(&mut self, skip: Skip) {
        *self.skips.entry(skip).or_insert(0) += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{}: {message}", self.label);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
