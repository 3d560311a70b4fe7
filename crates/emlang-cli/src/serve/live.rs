//! Live-reload server for `emlang diagram --serve`.
//!
//! The input file is polled and re-rendered when its content hash changes.
//! The served page asks `/hash` every second and reloads itself once the
//! hash of the rendered page differs from the one it was loaded with.

use std::{io::Write, path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, extract::State, response::Html, routing::get};
use log::{info, warn};
use tokio::{sync::RwLock, time};

use emlang::{DocumentBuilder, EmlangError, layout::content_hash};

use super::{Listen, block_on, shutdown_signal};

/// Port used when neither a flag nor the configuration sets one.
pub const DEFAULT_PORT: u16 = 8274;

/// How often the input file is checked for changes.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

const RELOAD_SCRIPT: &str = r#"<script>
(function() {
  var hash = "";
  setInterval(function() {
    fetch("/hash").then(function(r) { return r.text(); }).then(function(h) {
      if (hash && h !== hash) location.reload();
      hash = h;
    });
  }, 1000);
})();
</script>"#;

/// Wrap a diagram fragment in a complete page that reloads itself.
pub fn page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>emlang diagram</title></head>\n<body>\n{fragment}{RELOAD_SCRIPT}\n</body></html>\n"
    )
}

/// The page being served.
#[derive(Debug, Default)]
struct Current {
    /// Hash of the source the page was last rendered from, successfully or not.
    source_hash: String,
    html: String,
    hash: String,
}

/// Shared state of the live-reload server.
#[derive(Debug, Clone)]
pub struct LiveState {
    path: PathBuf,
    builder: Arc<DocumentBuilder>,
    current: Arc<RwLock<Current>>,
}

impl LiveState {
    /// Render `path` for the first time.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse.
    pub async fn new(
        path: impl Into<PathBuf>,
        builder: DocumentBuilder,
    ) -> Result<Self, EmlangError> {
        let state = Self {
            path: path.into(),
            builder: Arc::new(builder),
            current: Arc::default(),
        };
        state.refresh().await?;
        Ok(state)
    }

    /// Re-render the page if the file content changed since the last check.
    ///
    /// Returns `true` when the served page was replaced. If the new content
    /// does not parse, the previous page keeps being served and the same
    /// content is not tried again.
    pub async fn refresh(&self) -> Result<bool, EmlangError> {
        let source = tokio::fs::read_to_string(&self.path).await?;
        let source_hash = content_hash(&source);
        if self.current.read().await.source_hash == source_hash {
            return Ok(false);
        }

        let rendered = self.render(&source);
        let mut current = self.current.write().await;
        current.source_hash = source_hash;
        let html = page(&rendered?);
        let hash = content_hash(&html);
        if current.hash == hash {
            return Ok(false);
        }
        current.html = html;
        current.hash = hash;
        Ok(true)
    }

    pub async fn html(&self) -> String {
        self.current.read().await.html.clone()
    }

    pub async fn hash(&self) -> String {
        self.current.read().await.hash.clone()
    }

    fn render(&self, source: &str) -> Result<String, EmlangError> {
        let document = self.builder.parse(source)?;
        Ok(self.builder.render_html(&document))
    }
}

async fn index(State(state): State<LiveState>) -> Html<String> {
    Html(state.html().await)
}

async fn hash(State(state): State<LiveState>) -> String {
    state.hash().await
}

pub fn router(state: LiveState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/hash", get(hash))
        .with_state(state)
}

async fn watch(state: LiveState) {
    let mut interval = time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        match state.refresh().await {
            Ok(true) => info!(path = state.path.display().to_string(); "Diagram updated"),
            Ok(false) => {}
            Err(err) => warn!(err = err.to_string(); "Regeneration error"),
        }
    }
}

/// Serve the diagram of `path` until Ctrl+C.
///
/// # Errors
///
/// Fails if the first render fails or the address cannot be bound.
pub fn serve(
    path: &str,
    listen: &Listen,
    builder: DocumentBuilder,
    out: &mut impl Write,
) -> Result<(), EmlangError> {
    block_on(async {
        let state = LiveState::new(path, builder).await?;
        let listener = listen.bind().await?;

        writeln!(out, "Serving diagram at {}", listen.url())?;
        out.flush()?;

        let watcher = tokio::spawn(watch(state.clone()));
        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        watcher.abort();
        Ok::<(), EmlangError>(())
    })?
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_page() {
        let page = page("<style>.x{}</style><div>hello</div>");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>emlang diagram</title>"));
        assert!(page.contains("<div>hello</div>"));
        assert!(page.contains("fetch(\"/hash\")"));
        assert!(page.ends_with("</body></html>\n"));
    }

    #[tokio::test]
    async fn test_handlers_serve_current_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        fs::write(&path, "slices:\n  a:\n    - e: Started\n").unwrap();

        let state = LiveState::new(&path, DocumentBuilder::default())
            .await
            .unwrap();

        let Html(html) = index(State(state.clone())).await;
        assert!(html.contains(">Started</span>"));
        assert_eq!(hash(State(state)).await, content_hash(&html));
    }

    #[tokio::test]
    async fn test_refresh_follows_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        fs::write(&path, "slices:\n  a:\n    - e: Started\n").unwrap();
        let state = LiveState::new(&path, DocumentBuilder::default())
            .await
            .unwrap();
        let first = state.hash().await;

        assert!(!state.refresh().await.unwrap(), "unchanged file");

        fs::write(&path, "slices:\n  a:\n    - e: Finished\n").unwrap();
        assert!(state.refresh().await.unwrap());
        assert_ne!(state.hash().await, first);
        assert!(state.html().await.contains(">Finished</span>"));
    }

    #[tokio::test]
    async fn test_invalid_content_keeps_previous_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        fs::write(&path, "slices:\n  a:\n    - e: Started\n").unwrap();
        let state = LiveState::new(&path, DocumentBuilder::default())
            .await
            .unwrap();
        let served = state.hash().await;

        fs::write(&path, "slices:\n  a:\n    - q: Broken\n").unwrap();
        assert!(matches!(
            state.refresh().await,
            Err(EmlangError::Parse { .. })
        ));
        assert_eq!(state.hash().await, served);
        assert!(!state.refresh().await.unwrap(), "same content is not retried");
    }

    #[tokio::test]
    async fn test_unparsable_input_fails_to_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        fs::write(&path, "slices: [").unwrap();

        assert!(
            LiveState::new(&path, DocumentBuilder::default())
                .await
                .is_err()
        );
    }
}
