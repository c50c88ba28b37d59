//! Storyboard Studio Gateway — synopsis in, script and storyboard frames out.
//! HTML forms at `/`, JSON mirror under `/api/v1`. One session per browser (cookie).

mod page;
mod session_cookie;

use axum::{
    body::Body,
    extract::{Form, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use storyboard_core::{
    extract_image_prompts, GenerationBackend, OpenAiBridge, ScriptOutcome, ScriptRequest,
    ScriptWriter, SessionContext, SessionHandle, SessionId, SessionStore, StoryboardArtist, StoryboardConfig,
    StoryboardError, StoryboardFrame, StoryboardOptions, StoryboardStyle,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use page::PageView;

#[derive(Clone)]
struct AppState {
    config: Arc<StoryboardConfig>,
    sessions: Arc<SessionStore>,
    writer: ScriptWriter,
    artist: StoryboardArtist,
}

impl AppState {
    fn new(config: StoryboardConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        let writer = ScriptWriter::new(Arc::clone(&backend), config.text_model.clone());
        let artist = StoryboardArtist::new(
            backend,
            config.image_model.clone(),
            config.image_size.clone(),
            config.image_quality.clone(),
        );
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            writer,
            artist,
        }
    }

    /// Session named by the request cookie, or a new one. Only script submissions open sessions.
    fn session(&self, headers: &HeaderMap) -> (SessionId, SessionHandle, bool) {
        self.sessions
            .resume_or_open(session_cookie::session_id(headers))
    }

    /// Session named by the request cookie, or a blank context that is not stored.
    fn existing_or_blank(&self, headers: &HeaderMap) -> SessionHandle {
        self.sessions
            .resume(session_cookie::session_id(headers))
            .unwrap_or_default()
    }

    /// Page showing the session's script and last form inputs.
    fn page(&self, ctx: &SessionContext) -> PageView {
        PageView {
            title: self.config.page_title.clone(),
            script_form: ctx.script_request().clone(),
            script: ctx.generated_script().to_string(),
            storyboard_form: *ctx.storyboard_options(),
            ..PageView::default()
        }
    }
}

/// Form body of "Generate Storyboard". Unchecked boxes are absent from the body.
#[derive(Deserialize)]
struct StoryboardForm {
    #[serde(default)]
    style: StoryboardStyle,
    #[serde(default)]
    detailed: Option<String>,
    #[serde(default)]
    colored: Option<String>,
}

impl StoryboardForm {
    fn options(&self) -> StoryboardOptions {
        StoryboardOptions::new(self.style, self.detailed.is_some(), self.colored.is_some())
    }
}

#[derive(Deserialize)]
struct StoryboardApiRequest {
    #[serde(default)]
    style: StoryboardStyle,
    #[serde(default)]
    detailed: bool,
    #[serde(default)]
    colored: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoryboardConfig::load()?;
    if !config.has_api_key() {
        tracing::warn!(
            "No API key configured (STORYBOARD_API_KEY or OPENAI_API_KEY); every generation will fall back"
        );
    }

    let bind_addr = config.bind_addr.clone();
    let backend: Arc<dyn GenerationBackend> = Arc::new(OpenAiBridge::from_config(&config));
    let app = app(AppState::new(config, backend));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Storyboard Studio {} listening on {}", storyboard_core::version(), bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/script", post(script_handler))
        .route("/storyboard", post(storyboard_handler))
        .route("/session/end", post(end_session))
        .route("/api/v1/script", post(api_script))
        .route("/api/v1/storyboard", post(api_storyboard))
        .route("/api/v1/prompts", get(api_prompts))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_interaction))
}

async fn log_interaction(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let res = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Interaction handled"
    );
    res
}

fn with_session_cookie(mut res: Response, id: SessionId, created: bool) -> Response {
    if created {
        session_cookie::set(&mut res, id);
    }
    res
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let handle = state.existing_or_blank(&headers);
    let ctx = handle.lock().await;
    Html(page::render(&state.page(&ctx)))
}

/// POST /script: generate a script and store it in the session, even when generation failed.
async fn script_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<ScriptRequest>,
) -> Response {
    let (id, handle, created) = state.session(&headers);
    let mut ctx = handle.lock().await;
    let outcome = ctx.submit_script(&state.writer, &request).await;

    let view = PageView {
        script_failure: match outcome {
            ScriptOutcome::Failed { reason } => Some(reason),
            ScriptOutcome::Generated { .. } => None,
        },
        ..state.page(&ctx)
    };
    with_session_cookie(Html(page::render(&view)).into_response(), id, created)
}

/// POST /storyboard: draw the stored script. Frames are shown as they were reported by the artist.
async fn storyboard_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<StoryboardForm>,
) -> Html<String> {
    let handle = state.existing_or_blank(&headers);
    let mut ctx = handle.lock().await;
    let options = form.options();

    let mut frames: Vec<StoryboardFrame> = Vec::new();
    let error = match ctx
        .request_storyboard(&state.artist, &options, |frame| frames.push(frame.clone()))
        .await
    {
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    };

    let view = PageView {
        frames,
        error,
        ..state.page(&ctx)
    };
    Html(page::render(&view))
}

/// POST /session/end: forget the session and start over.
async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_cookie::session_id(&headers) {
        state.sessions.end(&id);
    }
    let mut res = Redirect::to("/").into_response();
    session_cookie::clear(&mut res);
    res
}

async fn api_script(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ScriptRequest>,
) -> Response {
    let (id, handle, created) = state.session(&headers);
    let mut ctx = handle.lock().await;
    let outcome = ctx.submit_script(&state.writer, &request).await;
    with_session_cookie(Json(outcome).into_response(), id, created)
}

async fn api_storyboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StoryboardApiRequest>,
) -> Response {
    let handle = state.existing_or_blank(&headers);
    let mut ctx = handle.lock().await;
    let options = StoryboardOptions::new(body.style, body.detailed, body.colored);

    match ctx.request_storyboard(&state.artist, &options, |_| {}).await {
        Ok(board) => {
            let results: Vec<serde_json::Value> = board
                .entries()
                .map(|(prompt, result)| {
                    let kind = if result.is_image() { "image" } else { "placeholder" };
                    serde_json::json!({
                        "kind": kind,
                        "url": result.locator(),
                        "prompt": prompt,
                    })
                })
                .collect();
            Json(serde_json::json!({ "prompts": board.prompts, "results": results }))
                .into_response()
        }
        Err(e) => storyboard_error_response(&e),
    }
}

async fn api_prompts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = state.existing_or_blank(&headers);
    let ctx = handle.lock().await;
    match extract_image_prompts(ctx.generated_script()) {
        Ok(prompts) => Json(serde_json::json!({ "prompts": prompts })).into_response(),
        Err(e) => storyboard_error_response(&StoryboardError::from(e)),
    }
}

fn storyboard_error_response(e: &StoryboardError) -> Response {
    let status = match e {
        StoryboardError::NoScript => StatusCode::CONFLICT,
        StoryboardError::Extract(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}
