use crate::{
    error::{Result, StudioError},
    models::ImageSize,
    server::{sessions::SESSION_COOKIE, AppState},
    studio::{apply, artifact, Action, Notice, SessionState},
};
use actix_web::{
    cookie::{Cookie, SameSite},
    http::header,
    web, HttpRequest, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// The page's form controls; every button posts all of them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControlsForm {
    pub prompt: String,
    pub negative_prompt: String,
    pub style: Option<String>,
    pub size: Option<String>,
}

impl ControlsForm {
    fn apply_to(&self, state: &SessionState) -> Result<SessionState> {
        let mut next = apply(state, Action::EditPrompt(self.prompt.clone()))?;
        next = apply(&next, Action::EditNegativePrompt(self.negative_prompt.clone()))?;
        if let Some(style) = &self.style {
            next = apply(&next, Action::ChangeStyle(style.clone()))?;
        }
        if let Some(size) = &self.size {
            next = apply(&next, Action::ChangeSize(size.parse::<ImageSize>()?))?;
        }
        Ok(next)
    }
}

fn session_id(req: &HttpRequest, state: &AppState) -> Uuid {
    let requested = req
        .cookie(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    state.sessions.open(requested)
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn redirect_home(id: Uuid) -> HttpResponse {
    HttpResponse::SeeOther()
        .cookie(session_cookie(id))
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Store the outcome of an action. A failed action keeps the previous state
/// and reports the error on the next render.
fn commit(
    state: &AppState,
    id: Uuid,
    current: SessionState,
    action: &str,
    outcome: Result<SessionState>,
) {
    let next = match outcome {
        Ok(next) => {
            log::debug!("Session {} applied {}", id, action);
            next
        }
        Err(err) => {
            log::warn!("Session {} rejected {}: {}", id, action, err);
            current.with_notice(Notice::from(&err))
        }
    };
    state.sessions.store(id, next);
}

fn png_attachment(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = session_id(&req, &state);
    let (session, notice) = state.sessions.snapshot_for_render(id);
    let generating = state.sessions.is_generating(id);
    let html = state
        .pages
        .render_index(&state.studio, &session, notice, generating)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(id))
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub async fn generate(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ControlsForm>,
) -> HttpResponse {
    let id = session_id(&req, &state);
    let current = state.sessions.snapshot(id);

    let edited = match form.apply_to(&current) {
        Ok(edited) => edited,
        Err(err) => {
            commit(&state, id, current, "generate", Err(err));
            return redirect_home(id);
        }
    };

    match state.sessions.begin_generation(id, edited.clone()) {
        Some(ticket) => {
            let outcome = state.studio.run_generation(&edited).await;
            ticket.finish(outcome);
        }
        None => commit(
            &state,
            id,
            current,
            "generate",
            Err(StudioError::GenerationInProgress),
        ),
    }

    redirect_home(id)
}

pub async fn random_prompt(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ControlsForm>,
) -> HttpResponse {
    let id = session_id(&req, &state);
    let current = state.sessions.snapshot(id);
    let outcome = form
        .apply_to(&current)
        .and_then(|edited| state.studio.pick_random_prompt(&edited));
    commit(&state, id, current, "pick_random_prompt", outcome);
    redirect_home(id)
}

pub async fn update_settings(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ControlsForm>,
) -> HttpResponse {
    let id = session_id(&req, &state);
    let current = state.sessions.snapshot(id);
    let outcome = form.apply_to(&current);
    commit(&state, id, current, "update_settings", outcome);
    redirect_home(id)
}

async fn history_action(
    req: HttpRequest,
    state: web::Data<AppState>,
    action: Action,
) -> HttpResponse {
    let id = session_id(&req, &state);
    let current = state.sessions.snapshot(id);
    let name = action.name();
    let outcome = apply(&current, action);
    commit(&state, id, current, name, outcome);
    redirect_home(id)
}

pub async fn reuse_history_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    index: web::Path<usize>,
) -> HttpResponse {
    history_action(req, state, Action::ReuseHistoryItem(index.into_inner())).await
}

pub async fn delete_history_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    index: web::Path<usize>,
) -> HttpResponse {
    history_action(req, state, Action::RemoveHistoryItem(index.into_inner())).await
}

pub async fn clear_history(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    history_action(req, state, Action::ClearHistory).await
}

pub async fn image(
    req: HttpRequest,
    state: web::Data<AppState>,
    image_id: web::Path<Uuid>,
) -> HttpResponse {
    let id = session_id(&req, &state);
    let session = state.sessions.snapshot(id);
    match session.find_result(image_id.into_inner()) {
        Some(result) => HttpResponse::Ok()
            .content_type("image/png")
            .insert_header((header::CACHE_CONTROL, "private, max-age=3600"))
            .body(result.png.clone()),
        None => HttpResponse::NotFound().body("Image not found"),
    }
}

pub async fn download_latest(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let id = session_id(&req, &state);
    match state.sessions.snapshot(id).last_result {
        Some(result) => png_attachment(result.png.clone(), artifact::LATEST_FILENAME),
        None => HttpResponse::NotFound().body("No image has been generated yet"),
    }
}

pub async fn download_history_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    index: web::Path<usize>,
) -> Result<HttpResponse> {
    let id = session_id(&req, &state);
    let index = index.into_inner();
    let session = state.sessions.snapshot(id);
    let result = session.history.get(index)?;
    Ok(png_attachment(
        result.png.clone(),
        &artifact::history_filename(index),
    ))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model": state.studio.model(),
        "backend": state.studio.backend_name(),
        "sessions": state.sessions.len(),
    }))
}

impl actix_web::ResponseError for StudioError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            StudioError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
            StudioError::GenerationInProgress => StatusCode::CONFLICT,
            StudioError::EmptyPrompt
            | StudioError::UnknownStyle(_)
            | StudioError::UnknownSize(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
