//! Interactive editor served by `emlang repl`.
//!
//! The page posts the editor content to `/render` as the user types and
//! shows the diagram, the parse error or the lint issues it gets back.
//! `/format` returns the canonical text of the content.

use std::{fs, io::Write, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    response::Html,
    routing::{get, post},
};
use serde::Serialize;

use emlang::{DocumentBuilder, EmlangError, lint::Issue};

use super::{Listen, block_on, shutdown_signal};

/// Port used when neither a flag nor the configuration sets one.
pub const DEFAULT_PORT: u16 = 8275;

const PAGE: &str = include_str!("repl.html");

/// A lint issue as sent to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintItem {
    rule: String,
    message: String,
    line: usize,
    column: usize,
    severity: String,
}

impl From<&Issue> for LintItem {
    fn from(issue: &Issue) -> Self {
        Self {
            rule: issue.rule().to_string(),
            message: issue.message().to_string(),
            line: issue.line(),
            column: issue.column(),
            severity: issue.severity().to_string(),
        }
    }
}

/// Result of `/render`: either the diagram and its lint issues, or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lint: Vec<LintItem>,
}

/// Result of `/format`: either the formatted text or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    yaml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug)]
pub struct ReplState {
    builder: DocumentBuilder,
    initial: String,
}

impl ReplState {
    pub fn new(builder: DocumentBuilder, initial: impl Into<String>) -> Self {
        Self {
            builder,
            initial: initial.into(),
        }
    }

    pub fn render(&self, source: &str) -> RenderResponse {
        match self.builder.parse(source) {
            Ok(document) => RenderResponse {
                html: Some(self.builder.render_html(&document)),
                error: None,
                lint: self
                    .builder
                    .lint(&document)
                    .iter()
                    .map(LintItem::from)
                    .collect(),
            },
            Err(err) => RenderResponse {
                error: Some(err.to_string()),
                ..RenderResponse::default()
            },
        }
    }

    pub fn format(&self, source: &str) -> FormatResponse {
        match self.builder.parse(source) {
            Ok(document) => FormatResponse {
                yaml: Some(self.builder.format(&document)),
                error: None,
            },
            Err(err) => FormatResponse {
                yaml: None,
                error: Some(err.to_string()),
            },
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(PAGE)
}

async fn initial(State(state): State<Arc<ReplState>>) -> String {
    state.initial.clone()
}

async fn render(State(state): State<Arc<ReplState>>, body: String) -> Json<RenderResponse> {
    Json(state.render(&body))
}

async fn format(State(state): State<Arc<ReplState>>, body: String) -> Json<FormatResponse> {
    Json(state.format(&body))
}

pub fn router(state: Arc<ReplState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/initial", get(initial))
        .route("/render", post(render))
        .route("/format", post(format))
        .with_state(state)
}

/// Serve the editor until Ctrl+C, starting from the content of `input`.
///
/// # Errors
///
/// Fails if `input` cannot be read or the address cannot be bound. The
/// initial content does not have to parse.
pub fn serve(
    input: Option<&str>,
    listen: &Listen,
    builder: DocumentBuilder,
    out: &mut impl Write,
) -> Result<(), EmlangError> {
    let initial = match input {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    let state = Arc::new(ReplState::new(builder, initial));

    block_on(async {
        let listener = listen.bind().await?;

        writeln!(out, "REPL running at {}", listen.url())?;
        out.flush()?;

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok::<(), EmlangError>(())
    })?
}
