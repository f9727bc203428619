//! Per-session assessment state
//!
//! One `SessionState` holds everything a user has declared and everything
//! computed for them. Sessions never share mutable state; the service keeps
//! them in a map keyed by session id.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use poss_common::demographics::{AgeGroup, Sex};
use poss_common::questions::{Perspective, Question};
use poss_compositor::{CameraOrientation, Composition, CompositionOutcome};
use poss_engine::{AssessmentInput, ScoredCandidate};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Background composition owned by a session
#[derive(Debug, Clone)]
struct InFlight {
    job_id: Uuid,
    cancel: CancellationToken,
}

/// Everything the background task needs to compose one image
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    pub job_id: Uuid,
    pub photo: PathBuf,
    pub entity_id: String,
    pub camera: CameraOrientation,
    pub cancel: CancellationToken,
    /// Output of the previous composition, now unreferenced
    pub replaced_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Last time a client changed the session
    pub last_active: DateTime<Utc>,
    pub perspective: Perspective,
    /// Questions drawn when the session was created
    pub questions: Vec<Question>,
    pub sex: Option<Sex>,
    pub age_group: AgeGroup,
    pub answers: HashMap<String, bool>,
    pub photo: Option<PathBuf>,
    pub camera: CameraOrientation,
    pub top_results: Vec<ScoredCandidate>,
    pub result: Option<ScoredCandidate>,
    pub result_image: Option<PathBuf>,
    pub composition_outcome: Option<CompositionOutcome>,
    pub processing: bool,
    #[serde(skip)]
    in_flight: Option<InFlight>,
}

impl SessionState {
    pub fn new(perspective: Perspective, questions: Vec<Question>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            perspective,
            questions,
            sex: None,
            age_group: AgeGroup::default(),
            answers: HashMap::new(),
            photo: None,
            camera: CameraOrientation::default(),
            top_results: Vec::new(),
            result: None,
            result_image: None,
            composition_outcome: None,
            processing: false,
            in_flight: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// True when untouched for longer than `ttl` as of `now`
    pub fn is_idle(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_active) > ttl
    }

    /// Clear the composed image.
    ///
    /// Returns the file to delete: a composed output belongs to the session,
    /// a passthrough points at the user's own photo and is never returned.
    pub fn take_output(&mut self) -> Option<PathBuf> {
        let image = self.result_image.take();
        match self.composition_outcome.take() {
            Some(CompositionOutcome::Passthrough) | None => None,
            Some(_) => image,
        }
    }

    /// Scoring input from the current declarations
    pub fn assessment_input(&self) -> AssessmentInput {
        AssessmentInput {
            sex: self.sex.map(|s| s.as_str().to_string()),
            age_group: self.age_group.as_str().to_string(),
            answers: self.answers.clone(),
            photo: self.photo.clone(),
        }
    }

    /// Mark a composition of the current result as running.
    ///
    /// Returns `None` (and changes nothing) when there is no photo, no
    /// result, or a composition is already in flight.
    pub fn begin_composition(&mut self) -> Option<CompositionRequest> {
        if self.processing {
            return None;
        }
        let photo = self.photo.clone()?;
        let entity_id = self.result.as_ref().map(|r| r.entity_id.clone())?;
        if entity_id.is_empty() {
            return None;
        }

        let job = InFlight {
            job_id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        };
        let request = CompositionRequest {
            job_id: job.job_id,
            photo,
            entity_id,
            camera: self.camera,
            cancel: job.cancel.clone(),
            replaced_output: self.take_output(),
        };

        self.processing = true;
        self.in_flight = Some(job);
        Some(request)
    }

    /// Store the outcome of job `job_id`.
    ///
    /// Returns false when the job is no longer the session's current one
    /// (reset or replaced meanwhile); the state is then left untouched.
    pub fn finish_composition(&mut self, job_id: Uuid, composition: Composition) -> bool {
        match &self.in_flight {
            Some(job) if job.job_id == job_id => {}
            _ => return false,
        }
        self.in_flight = None;
        self.processing = false;
        self.result_image = Some(composition.image);
        self.composition_outcome = Some(composition.outcome);
        true
    }

    /// Cancel the in-flight composition, if any
    pub fn cancel_composition(&mut self) -> bool {
        self.processing = false;
        match self.in_flight.take() {
            Some(job) => {
                job.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Back to defaults, keeping the session identity and its questions.
    ///
    /// Returns the composed output that is no longer referenced.
    pub fn reset(&mut self) -> Option<PathBuf> {
        self.cancel_composition();
        self.sex = None;
        self.age_group = AgeGroup::default();
        self.answers.clear();
        self.photo = None;
        self.camera = CameraOrientation::default();
        self.top_results.clear();
        self.result = None;
        self.take_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_result() -> SessionState {
        let mut session = SessionState::new(Perspective::First, Vec::new());
        session.photo = Some(PathBuf::from("/tmp/me.jpg"));
        session.result = Some(ScoredCandidate {
            entity_id: "legiao".to_string(),
            ..ScoredCandidate::none()
        });
        session
    }

    fn composed(path: &str) -> Composition {
        Composition {
            image: PathBuf::from(path),
            outcome: CompositionOutcome::Composited,
        }
    }

    #[test]
    fn test_defaults() {
        let session = SessionState::new(Perspective::Third, Vec::new());
        assert_eq!(session.age_group, AgeGroup::Adult);
        assert_eq!(session.camera, CameraOrientation::Rear);
        assert!(session.sex.is_none());
        assert!(!session.processing);
    }

    #[test]
    fn test_assessment_input_uses_labels() {
        let mut session = SessionState::new(Perspective::First, Vec::new());
        session.sex = Some(Sex::Female);
        session.age_group = AgeGroup::Child;
        session.answers.insert("voice_shift".to_string(), true);

        let input = session.assessment_input();
        assert_eq!(input.sex.as_deref(), Some("Feminino"));
        assert_eq!(input.age_group, "Criança");
        assert!(input.answered_yes("voice_shift"));
    }

    #[test]
    fn test_begin_requires_photo_and_result() {
        let mut session = SessionState::new(Perspective::First, Vec::new());
        assert!(session.begin_composition().is_none());

        session.photo = Some(PathBuf::from("/tmp/me.jpg"));
        assert!(session.begin_composition().is_none());

        session.result = Some(ScoredCandidate::none());
        assert!(session.begin_composition().is_none());
        assert!(!session.processing);
    }

    #[test]
    fn test_single_composition_in_flight() {
        let mut session = session_with_result();
        let request = session.begin_composition().unwrap();
        assert_eq!(request.entity_id, "legiao");
        assert_eq!(request.camera, CameraOrientation::Rear);
        assert!(session.processing);
        assert!(session.begin_composition().is_none());

        assert!(session.finish_composition(request.job_id, composed("/out/a.jpg")));
        assert!(!session.processing);
        assert_eq!(session.result_image, Some(PathBuf::from("/out/a.jpg")));
        assert_eq!(session.composition_outcome, Some(CompositionOutcome::Composited));
    }

    #[test]
    fn test_reset_cancels_and_ignores_late_result() {
        let mut session = session_with_result();
        session.answers.insert("mood_swings".to_string(), true);
        let request = session.begin_composition().unwrap();

        assert!(session.reset().is_none());
        assert!(request.cancel.is_cancelled());
        assert!(!session.processing);
        assert!(session.answers.is_empty());
        assert!(session.photo.is_none());

        assert!(!session.finish_composition(request.job_id, composed("/out/late.jpg")));
        assert!(session.result_image.is_none());
    }

    #[test]
    fn test_stale_job_does_not_overwrite_newer_one() {
        let mut session = session_with_result();
        let first = session.begin_composition().unwrap();
        session.cancel_composition();
        let second = session.begin_composition().unwrap();

        assert!(!session.finish_composition(first.job_id, composed("/out/first.jpg")));
        assert!(session.processing);
        assert!(session.finish_composition(second.job_id, composed("/out/second.jpg")));
        assert_eq!(session.result_image, Some(PathBuf::from("/out/second.jpg")));
    }

    #[test]
    fn test_recompose_hands_back_previous_output() {
        let mut session = session_with_result();
        let first = session.begin_composition().unwrap();
        assert!(first.replaced_output.is_none());
        assert!(session.finish_composition(first.job_id, composed("/out/first.jpg")));

        let second = session.begin_composition().unwrap();
        assert_eq!(second.replaced_output, Some(PathBuf::from("/out/first.jpg")));
        assert!(session.result_image.is_none());
        assert!(session.composition_outcome.is_none());
    }

    #[test]
    fn test_passthrough_photo_is_never_handed_back() {
        let mut session = session_with_result();
        let request = session.begin_composition().unwrap();
        let passthrough = Composition {
            image: PathBuf::from("/tmp/me.jpg"),
            outcome: CompositionOutcome::Passthrough,
        };
        assert!(session.finish_composition(request.job_id, passthrough));

        assert!(session.reset().is_none());
        assert!(session.result_image.is_none());
    }

    #[test]
    fn test_reset_hands_back_composed_output() {
        let mut session = session_with_result();
        let request = session.begin_composition().unwrap();
        let horror = Composition {
            image: PathBuf::from("/out/tone.jpg"),
            outcome: CompositionOutcome::HorrorTone,
        };
        assert!(session.finish_composition(request.job_id, horror));

        assert_eq!(session.reset(), Some(PathBuf::from("/out/tone.jpg")));
        assert!(session.take_output().is_none());
    }

    #[test]
    fn test_idle_after_ttl() {
        let mut session = SessionState::new(Perspective::First, Vec::new());
        let ttl = chrono::Duration::minutes(30);
        let start = session.last_active;

        assert!(!session.is_idle(ttl, start + chrono::Duration::minutes(30)));
        assert!(session.is_idle(ttl, start + chrono::Duration::minutes(31)));

        session.last_active = start + chrono::Duration::minutes(20);
        assert!(!session.is_idle(ttl, start + chrono::Duration::minutes(31)));
    }
}
