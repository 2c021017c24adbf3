//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::Gazette;

/// Reloads the page when the server announces a rebuild
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function () {
  var scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var socket = new WebSocket(scheme + location.host + '/__livereload');
  socket.onmessage = function (event) {
    if (event.data === 'reload') location.reload();
  };
  socket.onclose = function () {
    setTimeout(function () { location.reload(); }, 1000);
  };
})();
</script>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    root: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(gazette: &Gazette, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: gazette.public_dir.clone(),
        root: gazette.config.root.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // SocketAddr does not resolve host names
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, gazette.config.root);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let gazette = gazette.clone();

        tokio::task::spawn_blocking(move || {
            let result = generate::watch_changes(&gazette, |_| {
                // No connected clients is not an error
                let _ = reload_tx.send(());
                true
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serves the public dir under the site root, injecting the live reload
/// script into HTML pages
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let Some(relative) = strip_root(&state.root, request.uri().path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    if let Some(page) = resolve_page(&state.public_dir, &relative) {
        return match tokio::fs::read_to_string(&page).await {
            Ok(content) if state.live_reload => Html(inject_live_reload(&content)).into_response(),
            Ok(content) => Html(content).into_response(),
            Err(e) => {
                tracing::debug!("Failed to read {:?}: {}", page, e);
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
        };
    }

    let uri = match request.uri().query() {
        Some(query) => format!("{}?{}", relative, query),
        None => relative,
    };
    match uri.parse() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return (StatusCode::BAD_REQUEST, "Bad request").into_response(),
    }

    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Request path relative to the site root, always starting with `/`.
/// `None` when the request is outside the root.
fn strip_root(root: &str, path: &str) -> Option<String> {
    let root = root.trim_end_matches('/');
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() {
        return Some("/".to_string());
    }
    rest.starts_with('/').then(|| rest.to_string())
}

/// The HTML page a request path maps to, if there is one
fn resolve_page(public_dir: &Path, relative: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(relative).decode_utf8().ok()?;
    let clean = decoded.trim_matches('/');
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let candidate = public_dir.join(clean);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }

    let is_html = candidate
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);
    (is_html && candidate.is_file()).then_some(candidate)
}

/// Insert the live reload script before the closing body tag
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], LIVE_RELOAD_SCRIPT, &html[pos..]),
        None => format!("{}{}", html, LIVE_RELOAD_SCRIPT),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body><p>x</p></body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</script>\n</body></html>"));

        let bare = inject_live_reload("<p>x</p>");
        assert!(bare.starts_with("<p>x</p>"));
        assert!(bare.contains("/__livereload"));
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("/", "/hello").as_deref(), Some("/hello"));
        assert_eq!(strip_root("/", "/").as_deref(), Some("/"));
        assert_eq!(strip_root("/blog/", "/blog/hello").as_deref(), Some("/hello"));
        assert_eq!(strip_root("/blog/", "/blog").as_deref(), Some("/"));
        assert_eq!(strip_root("/blog/", "/blogger"), None);
        assert_eq!(strip_root("/blog/", "/hello"), None);
    }

    #[test]
    fn test_resolve_page() {
        let dir = TempDir::new().unwrap();
        let public = dir.path();
        fs::create_dir_all(public.join("hello world")).unwrap();
        fs::write(public.join("index.html"), "home").unwrap();
        fs::write(public.join("hello world/index.html"), "post").unwrap();
        fs::create_dir_all(public.join("styles")).unwrap();
        fs::write(public.join("styles/index.module.css"), "").unwrap();

        assert_eq!(resolve_page(public, "/"), Some(public.join("index.html")));
        assert_eq!(
            resolve_page(public, "/hello%20world/"),
            Some(public.join("hello world").join("index.html"))
        );
        assert_eq!(resolve_page(public, "/styles/index.module.css"), None);
        assert_eq!(resolve_page(public, "/styles"), None);
        assert_eq!(resolve_page(public, "/../index.html"), None);
        assert_eq!(resolve_page(public, "/missing"), None);
    }
}
