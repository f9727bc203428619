//! Assessment session endpoints
//!
//! POST /sessions, GET/DELETE /sessions/:id, PUT profile/answers/photo,
//! POST result/select/manual/reset.
//!
//! Composition runs in a background task; clients poll `GET /sessions/:id`
//! until `processing` is false.

use std::collections::HashMap;
use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use poss_common::demographics::{AgeGroup, Sex};
use poss_common::questions::{
    is_known_trait, random_questions, Perspective, Question, DEFAULT_QUESTION_COUNT, TRAIT_QUESTIONS,
};
use poss_common::EntityDefinition;
use poss_compositor::{CameraOrientation, CompositionOutcome};
use poss_engine::ScoredCandidate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{CompositionRequest, SessionState},
    services::discard_output,
    AppState,
};

/// Candidates kept for display alongside the chosen result
pub const TOP_RESULTS: usize = 3;

/// POST /sessions request (every field optional)
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub perspective: Perspective,
    pub question_count: Option<usize>,
}

/// POST /sessions response
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub perspective: Perspective,
    pub questions: Vec<Question>,
}

/// Session as returned to clients, with the chosen entity resolved
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: SessionState,
    pub entity: Option<EntityDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub sex: Option<String>,
    pub age_group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    pub answers: HashMap<String, bool>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    pub path: String,
    /// Camera tag; anything containing "traseira" is the rear camera
    pub camera: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntityChoiceRequest {
    pub entity_id: String,
}

/// POST result/select/manual response
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub session_id: Uuid,
    pub result: Option<ScoredCandidate>,
    pub top_results: Vec<ScoredCandidate>,
    pub entity: Option<EntityDefinition>,
    /// True when a composition was started for this result
    pub processing: bool,
}

fn session_not_found(session_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session not found: {}", session_id))
}

fn view(state: &AppState, session: &SessionState) -> SessionView {
    let entity = session
        .result
        .as_ref()
        .and_then(|r| state.catalog.get(&r.entity_id))
        .cloned();
    SessionView {
        session: session.clone(),
        entity,
    }
}

fn result_response(state: &AppState, session: &SessionState) -> ResultResponse {
    ResultResponse {
        session_id: session.id,
        result: session.result.clone(),
        top_results: session.top_results.clone(),
        entity: session
            .result
            .as_ref()
            .and_then(|r| state.catalog.get(&r.entity_id))
            .cloned(),
        processing: session.processing,
    }
}

/// Run `f` on the session under the write lock, marking it active
async fn update_session<T, F>(state: &AppState, session_id: Uuid, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut SessionState) -> ApiResult<T>,
{
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    session.touch();
    f(session)
}

/// Start `request` in the background after deleting the output it replaces
async fn start_composition(state: &AppState, session_id: Uuid, mut request: CompositionRequest) {
    if let Some(path) = request.replaced_output.take() {
        discard_output(&path).await;
    }
    spawn_composition(state.clone(), session_id, request);
}

/// POST /sessions
///
/// Draws the session's questions. The body may be omitted.
pub async fn create_session(
    State(state): State<AppState>,
    request: Option<Json<CreateSessionRequest>>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let quantity = request.question_count.unwrap_or(DEFAULT_QUESTION_COUNT);
    if quantity == 0 || quantity > TRAIT_QUESTIONS.len() {
        return Err(ApiError::BadRequest(format!(
            "question_count must be between 1 and {}",
            TRAIT_QUESTIONS.len()
        )));
    }

    let questions = random_questions(request.perspective, quantity, &mut rand::thread_rng());
    let session = SessionState::new(request.perspective, questions);
    let response = CreateSessionResponse {
        session_id: session.id,
        perspective: session.perspective,
        questions: session.questions.clone(),
    };

    state.sessions.write().await.insert(session.id, session);
    info!(
        session_id = %response.session_id,
        perspective = ?response.perspective,
        questions = response.questions.len(),
        "Session created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(view(&state, session)))
}

/// PUT /sessions/:id/profile
pub async fn set_profile(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<Json<SessionView>> {
    let sex = request.sex.as_deref().map(str::parse::<Sex>).transpose()?;
    let age_group = request
        .age_group
        .as_deref()
        .map(str::parse::<AgeGroup>)
        .transpose()?;

    update_session(&state, session_id, |session| {
        if let Some(sex) = sex {
            session.sex = Some(sex);
        }
        if let Some(age_group) = age_group {
            session.age_group = age_group;
        }
        debug!(%session_id, sex = ?session.sex, age_group = %session.age_group, "Profile updated");
        Ok(Json(view(&state, session)))
    })
    .await
}

/// PUT /sessions/:id/answers
///
/// Merges into the existing answers; later values win.
pub async fn set_answers(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswersRequest>,
) -> ApiResult<Json<SessionView>> {
    let mut unknown: Vec<&str> = request
        .answers
        .keys()
        .map(String::as_str)
        .filter(|tag| !is_known_trait(tag))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(ApiError::BadRequest(format!("Unknown trait tags: {}", unknown.join(", "))));
    }

    update_session(&state, session_id, |session| {
        session.answers.extend(request.answers);
        debug!(%session_id, answered = session.answers.len(), "Answers updated");
        Ok(Json(view(&state, session)))
    })
    .await
}

/// PUT /sessions/:id/photo
pub async fn set_photo(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PhotoRequest>,
) -> ApiResult<Json<SessionView>> {
    if request.path.trim().is_empty() {
        return Err(ApiError::BadRequest("Photo path is empty".to_string()));
    }
    let camera = request
        .camera
        .as_deref()
        .map(CameraOrientation::from_tag)
        .unwrap_or_default();

    update_session(&state, session_id, |session| {
        session.photo = Some(PathBuf::from(&request.path));
        session.camera = camera;
        debug!(%session_id, photo = %request.path, %camera, "Photo set");
        Ok(Json(view(&state, session)))
    })
    .await
}

/// POST /sessions/:id/result
///
/// Ranks the catalog, picks one entity and, when a photo is set, starts
/// composing it in the background. 409 while a composition is running.
pub async fn generate_result(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<ResultResponse>> {
    let (response, stale, request) = update_session(&state, session_id, |session| {
        if session.processing {
            return Err(ApiError::Conflict("Composition already running".to_string()));
        }

        let input = session.assessment_input();
        let top = state.engine.rank(&input, TOP_RESULTS);
        let chosen = state.engine.choose(&input);

        let summary = top
            .iter()
            .map(|c| format!("{}({:.0}%)", c.entity_id, c.confidence * 100.0))
            .collect::<Vec<_>>()
            .join(",");
        info!(
            %session_id,
            top = %summary,
            chosen = %chosen.entity_id,
            entities = state.catalog.len(),
            "Result generated"
        );

        session.top_results = top;
        session.result = (!chosen.is_none()).then_some(chosen);
        let stale = session.take_output();
        let request = session.begin_composition();
        Ok((result_response(&state, session), stale, request))
    })
    .await?;

    if let Some(path) = stale {
        discard_output(&path).await;
    }
    if let Some(request) = request {
        start_composition(&state, session_id, request).await;
    }

    Ok(Json(response))
}

/// POST /sessions/:id/select
///
/// Promotes one of the top results; an id outside them becomes a
/// zero-confidence result with no matched traits.
pub async fn select_result(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<EntityChoiceRequest>,
) -> ApiResult<Json<ResultResponse>> {
    update_session(&state, session_id, |session| {
        let selected = session
            .top_results
            .iter()
            .find(|c| c.entity_id == request.entity_id)
            .cloned()
            .unwrap_or_else(|| ScoredCandidate {
                entity_id: request.entity_id.clone(),
                ..ScoredCandidate::none()
            });

        info!(%session_id, entity_id = %selected.entity_id, confidence = selected.confidence, "Result selected");
        session.result = Some(selected);
        Ok(Json(result_response(&state, session)))
    })
    .await
}

/// POST /sessions/:id/manual
///
/// Forces a catalog entity as the result (confidence 1.0) and composes the
/// photo with it.
pub async fn select_manual(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<EntityChoiceRequest>,
) -> ApiResult<Json<ResultResponse>> {
    if state.catalog.get(&request.entity_id).is_none() {
        return Err(ApiError::NotFound(format!("Entity not found: {}", request.entity_id)));
    }

    let (response, composition) = update_session(&state, session_id, |session| {
        if session.processing {
            return Err(ApiError::Conflict("Composition already running".to_string()));
        }

        info!(%session_id, entity_id = %request.entity_id, "Manual entity selected");
        session.result = Some(ScoredCandidate {
            entity_id: request.entity_id.clone(),
            confidence: 1.0,
            ..ScoredCandidate::none()
        });
        let composition = session.begin_composition();
        Ok((result_response(&state, session), composition))
    })
    .await?;

    if let Some(composition) = composition {
        start_composition(&state, session_id, composition).await;
    }

    Ok(Json(response))
}

/// POST /sessions/:id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let (response, stale) = update_session(&state, session_id, |session| {
        let stale = session.reset();
        info!(%session_id, "Session reset");
        Ok((Json(view(&state, session)), stale))
    })
    .await?;

    if let Some(path) = stale {
        discard_output(&path).await;
    }
    Ok(response)
}

/// DELETE /sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut session = state
        .sessions
        .write()
        .await
        .remove(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let cancelled = session.cancel_composition();
    if let Some(path) = session.take_output() {
        discard_output(&path).await;
    }
    info!(%session_id, cancelled, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Compose in the background and store the outcome on the session.
///
/// A result arriving after the session was reset, re-composed or deleted is
/// discarded along with its output file.
fn spawn_composition(state: AppState, session_id: Uuid, request: CompositionRequest) {
    tokio::spawn(async move {
        info!(
            %session_id,
            job_id = %request.job_id,
            entity_id = %request.entity_id,
            "Background composition task started"
        );

        let composition = state
            .compositor
            .compose(&request.photo, &request.entity_id, request.camera, &request.cancel)
            .await;

        if composition.outcome == CompositionOutcome::Passthrough && !request.cancel.is_cancelled() {
            *state.last_error.write().await = Some(format!(
                "Composition for session {} returned the original photo",
                session_id
            ));
        }

        let applied = {
            let mut sessions = state.sessions.write().await;
            sessions
                .get_mut(&session_id)
                .map(|s| s.finish_composition(request.job_id, composition.clone()))
                .unwrap_or(false)
        };

        if applied {
            info!(
                %session_id,
                image = %composition.image.display(),
                outcome = ?composition.outcome,
                "Background composition task completed"
            );
            return;
        }

        info!(%session_id, job_id = %request.job_id, "Discarding stale composition");
        if composition.outcome != CompositionOutcome::Passthrough {
            discard_output(&composition.image).await;
        }
    });
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/profile", put(set_profile))
        .route("/sessions/:id/answers", put(set_answers))
        .route("/sessions/:id/photo", put(set_photo))
        .route("/sessions/:id/result", post(generate_result))
        .route("/sessions/:id/select", post(select_result))
        .route("/sessions/:id/manual", post(select_manual))
        .route("/sessions/:id/reset", post(reset_session))
}
