//! Axum route handlers for the Session API.
//!
//! Each handler takes a snapshot of the session, runs any LLM calls without
//! holding the store lock, then commits the result through `Session::apply`.

use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::diagnosis::classifier::classify;
use crate::errors::AppError;
use crate::generation::sections::parse_sections;
use crate::generation::strategies::{generate_questions, generate_strategies};
use crate::generation::template::{download_file_name, generate_template};
use crate::intake::{extract_fields, transcribe_audio, DEFAULT_AUDIO_NAME};
use crate::models::note::NoteFields;
use crate::models::template::{TemplateKind, TemplateSection};
use crate::session::{Event, FlowError, Page, Session};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub session: Session,
    pub transcript: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaseTextResponse {
    pub case_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub session: Session,
    pub project: String,
    pub template_kind: TemplateKind,
    pub template: String,
    pub sections: Vec<TemplateSection>,
    pub download_file_name: String,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct BackRequest {
    pub to: Page,
}

#[derive(Debug, Deserialize)]
pub struct SaveResponsesRequest {
    pub responses: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponsesResponse {
    pub saved: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

async fn commit(state: &AppState, id: Uuid, event: Event) -> Result<Session, AppError> {
    state
        .sessions
        .update(id, |session| session.apply(event).map(|_| session.clone()))
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?
        .map_err(AppError::from)
}

/// Project name shown for a plan: the case's project, else the assessment title.
fn project_name(session: &Session) -> String {
    session
        .selected()
        .map(|c| c.case.project.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .unwrap_or_else(|| session.fields.title.clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> (StatusCode, Json<Session>) {
    let session = state.sessions.create().await;
    info!("Session {} created", session.id);
    (StatusCode::CREATED, Json(session))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(load_session(&state, id).await?))
}

/// POST /api/v1/sessions/:id/transcribe
///
/// Multipart upload with an `audio` file field. On success the transcript is
/// split into note fields and the session moves to Edit. A failed
/// transcription is reported in the body and the session stays put.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let session = load_session(&state, id).await?;
    if !session.page.accepts_note() {
        return Err(AppError::Conflict(format!(
            "Cannot upload audio on the '{}' page",
            session.page
        )));
    }

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("audio") {
            let file_name = field
                .file_name()
                .map(String::from)
                .unwrap_or_else(|| DEFAULT_AUDIO_NAME.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read audio: {e}")))?;
            upload = Some((file_name, data));
            break;
        }
    }

    let (file_name, audio) =
        upload.ok_or_else(|| AppError::Validation("Missing 'audio' file field".to_string()))?;
    if audio.is_empty() {
        return Err(AppError::Validation("Audio file is empty".to_string()));
    }

    let transcription = transcribe_audio(state.llm.as_ref(), audio, &file_name).await;
    let Some(transcript) = transcription.transcript else {
        return Ok(Json(TranscribeResponse {
            session,
            transcript: None,
            error: transcription.error,
        }));
    };

    let fields = extract_fields(state.llm.as_ref(), &transcript).await?;
    let session = commit(
        &state,
        id,
        Event::Transcribed {
            transcript: transcript.clone(),
            fields,
        },
    )
    .await?;

    Ok(Json(TranscribeResponse {
        session,
        transcript: Some(transcript),
        error: None,
    }))
}

/// POST /api/v1/sessions/:id/diagnose
///
/// Classifies the note and retrieves similar cases. Input/Edit → Results.
pub async fn handle_diagnose(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<NoteFields>,
) -> Result<Json<Session>, AppError> {
    if fields.gap.trim().is_empty() {
        return Err(AppError::Validation("gap cannot be empty".to_string()));
    }

    let session = load_session(&state, id).await?;
    if !session.page.accepts_note() {
        return Err(AppError::Conflict(format!(
            "Cannot submit a note on the '{}' page",
            session.page
        )));
    }

    let note = fields.compose();
    info!("Diagnosing note for session {}", id);
    let diagnosis = classify(state.llm.as_ref(), &state.resources.codebook, &note).await?;

    let similar_cases = state
        .retriever
        .find_similar(
            state.llm.as_ref(),
            &state.resources.cases,
            &diagnosis,
            &fields.gap,
            &fields.auxiliary(),
        )
        .await?;

    let session = commit(
        &state,
        id,
        Event::Diagnosed {
            fields,
            note,
            diagnosis,
            similar_cases,
        },
    )
    .await?;

    Ok(Json(session))
}

/// Snapshot and validated case index for the per-case Results endpoints.
async fn results_case(
    state: &AppState,
    id: Uuid,
    index: usize,
) -> Result<(Session, usize), AppError> {
    let session = load_session(state, id).await?;
    session.expect_page(Page::Results)?;
    let index = session.case_index(index)?;
    Ok((session, index))
}

/// GET /api/v1/sessions/:id/cases/:index/strategies
pub async fn handle_strategies(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<CaseTextResponse>, AppError> {
    let (session, index) = results_case(&state, id, index).await?;
    let case = &session.similar_cases[index].case;
    let diagnosis = session.diagnosis.clone().unwrap_or_default();
    let note = session.note.clone().unwrap_or_default();

    let text = generate_strategies(state.llm.as_ref(), &note, &diagnosis, case).await?;
    Ok(Json(CaseTextResponse {
        case_id: case.id.clone(),
        text,
    }))
}

/// GET /api/v1/sessions/:id/cases/:index/questions
pub async fn handle_questions(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<CaseTextResponse>, AppError> {
    let (session, index) = results_case(&state, id, index).await?;
    let case = &session.similar_cases[index].case;
    let diagnosis = session.diagnosis.clone().unwrap_or_default();
    let note = session.note.clone().unwrap_or_default();

    let text = generate_questions(state.llm.as_ref(), &note, &diagnosis, case).await?;
    Ok(Json(CaseTextResponse {
        case_id: case.id.clone(),
        text,
    }))
}

/// POST /api/v1/sessions/:id/cases/:index/template
///
/// Results → Template. The plan is generated only when this session has no
/// cached plan for the same case index. A plan that finishes after the
/// session was re-diagnosed or moved off this case is returned but not cached.
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<TemplateResponse>, AppError> {
    let mut session = commit(&state, id, Event::SelectCase(index)).await?;
    let revision = session.revision;
    let diagnosis = session.diagnosis.clone().unwrap_or_default();
    let template_kind = TemplateKind::for_diagnosis(&diagnosis);

    let (template, cached) = match session.cached_template() {
        Some(template) => (template.to_string(), true),
        None => {
            let case = &session.similar_cases[index].case;
            let note = session.note.clone().unwrap_or_default();
            let template =
                generate_template(state.llm.as_ref(), &state.resources, &note, &diagnosis, case)
                    .await?;
            let stored = template.clone();
            let cached_now = state
                .sessions
                .update(id, move |s| s.store_template(revision, index, stored))
                .await;
            if cached_now != Some(true) {
                warn!(
                    "Session {} changed while generating case {} plan; not caching it",
                    id, index
                );
            }
            session.templates.insert(index, template.clone());
            (template, false)
        }
    };

    let project = project_name(&session);
    Ok(Json(TemplateResponse {
        sections: parse_sections(&template),
        download_file_name: download_file_name(&project),
        project,
        template_kind,
        template,
        cached,
        session,
    }))
}

/// GET /api/v1/sessions/:id/template/download
pub async fn handle_download_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = load_session(&state, id).await?;
    session.expect_page(Page::Template)?;
    let template = session
        .cached_template()
        .ok_or_else(|| AppError::NotFound("No template generated for this case".to_string()))?
        .to_string();

    let file_name = download_file_name(&project_name(&session));
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        template,
    ))
}

/// POST /api/v1/sessions/:id/responses
///
/// Stores the student's per-section responses in the session (memory only).
pub async fn handle_save_responses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveResponsesRequest>,
) -> Result<Json<SaveResponsesResponse>, AppError> {
    let saved = state
        .sessions
        .update(id, |s| {
            s.expect_page(Page::Template)?;
            let saved = request.responses.len();
            s.responses.extend(request.responses);
            Ok::<_, FlowError>(saved)
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))??;

    info!("Saved {} responses for session {}", saved, id);
    Ok(Json(SaveResponsesResponse { saved }))
}

/// POST /api/v1/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BackRequest>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(commit(&state, id, Event::Back(request.to)).await?))
}
