use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::catalog::proxy::{error_reply, CardProxy};
use crate::catalog::transport::CatalogTransport;
use crate::gallery::render::{render_body, render_shell, PageContext};
use crate::gallery::state::GalleryView;
use crate::gallery::videos::VideoLookup;
use crate::logger;
use crate::tcp::request::{HttpRequest, Method};
use crate::tcp::response::{streaming_head, HttpResponse, CONTENT_HTML};
use crate::utils::errors::ServerError;

/// Immutable state shared by every connection.
pub struct AppState<T: CatalogTransport> {
    pub proxy: CardProxy<T>,
    pub videos: VideoLookup,
    pub background_url: String,
}

/// Routes parsed requests to the card proxy and the gallery page.
pub struct Router<T: CatalogTransport> {
    pub state: Arc<AppState<T>>,
}

const KNOWN_PATHS: [&str; 3] = ["/", "/api/cards", "/health"];

/// How often a half-closed client is checked for still reading.
const HANGUP_PROBE_INTERVAL: Duration = Duration::from_millis(250);

impl<T: CatalogTransport> Router<T> {
    pub fn new(state: AppState<T>) -> Self {
        Self { state: Arc::new(state) }
    }

    /// Answers one request.
    ///
    /// The gallery page is streamed straight to `writer`; every other route
    /// produces a single buffered response. `reader` is only watched for the
    /// client going away while the card request is in flight.
    pub async fn dispatch<R, W>(
        &self,
        request: &HttpRequest,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        logger!(INFO, "[HTTP] {} {}", &request.method, &request.path);
        logger!(
            DEBUG,
            "[HTTP] User-Agent: {}",
            request.header("user-agent").unwrap_or("-")
        );

        let response = match (&request.method, request.path.as_str()) {
            (Method::Get, "/") => return self.serve_gallery(request, reader, writer).await,
            (Method::Get, "/api/cards") => {
                let reply = self.state.proxy.handle().await;
                HttpResponse::json(reply.status, reply.body)
            }
            (Method::Get, "/health") => HttpResponse::text(200, "ok"),
            (_, path) if KNOWN_PATHS.contains(&path) => {
                let reply = error_reply(405, &format!("Method {} is not allowed.", request.method));
                HttpResponse::json(reply.status, reply.body).with_header("Allow", "GET")
            }
            (_, path) => {
                let reply = error_reply(404, &format!("No route for {}.", path));
                HttpResponse::json(reply.status, reply.body)
            }
        };

        writer.write_all(&response.wrap_response()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn serve_gallery<R, W>(
        &self,
        request: &HttpRequest,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let ctx = PageContext {
            background_url: &self.state.background_url,
            videos: &self.state.videos,
        };
        let mut view = GalleryView::from_query(&request.query);

        writer.write_all(&streaming_head(200, CONTENT_HTML)).await?;
        writer.write_all(render_shell(&view.state, &ctx).as_bytes()).await?;
        writer.flush().await?;

        let reply = tokio::select! {
            biased;
            _ = wait_for_hangup(reader, writer) => {
                logger!(DEBUG, "[GALLERY] Client left before the cards arrived");
                return Ok(());
            }
            reply = self.state.proxy.handle() => reply,
        };

        {
            let mut rng = rand::thread_rng();
            view.resolve(&reply, &mut rng);
        }

        writer.write_all(render_body(&view, &ctx).as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Resolves once the client is gone.
///
/// End of input only means the client finished sending; it may still be
/// reading. From then on the connection counts as closed when a newline
/// written between body chunks fails to go out.
async fn wait_for_hangup<R, W>(reader: &mut R, writer: &mut W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = [0; 256];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    loop {
        tokio::time::sleep(HANGUP_PROBE_INTERVAL).await;
        if writer.write_all(b"\n").await.is_err() || writer.flush().await.is_err() {
            return;
        }
    }
}
