use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::catalog::proxy::error_reply;
use crate::catalog::transport::CatalogTransport;
use crate::logger;
use crate::tcp::request::{read_head, HttpRequest};
use crate::tcp::response::HttpResponse;
use crate::tcp::router::Router;
use crate::utils::errors::ServerError;

pub struct ServerInstance<T: CatalogTransport> {
    pub socket: TcpListener,
    pub router: Arc<Router<T>>,
}

impl<T: CatalogTransport + 'static> ServerInstance<T> {
    pub async fn create_instance(host: &str, port: u16, router: Router<T>) -> Result<Self, ServerError> {
        let addr = format!("{host}:{port}");
        match TcpListener::bind(&addr).await {
            Ok(socket) => {
                let local = socket.local_addr().map(|a| a.to_string()).unwrap_or(addr);
                logger!(INFO, "[SERVER] Listening on http://{local}");
                Ok(ServerInstance {
                    socket,
                    router: Arc::new(router),
                })
            }
            Err(source) => Err(ServerError::Bind { addr, source }),
        }
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Accepts connections forever, one task per connection.
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.socket.accept().await {
                Ok((stream, addr)) => {
                    logger!(DEBUG, "[SERVER] Incoming connection from `{addr}`");
                    let router = Arc::clone(&self.router);
                    tokio::spawn(async move {
                        if let Err(error) = handle_connection(router, stream).await {
                            logger!(WARN, "[SERVER] Connection `{addr}` ended with an error ({error})");
                        }
                    });
                }
                Err(error) => logger!(ERROR, "[SERVER] Failed to accept connection ({error})"),
            }
        }
    }
}

/// Reads one request head, answers it and closes the connection.
async fn handle_connection<T: CatalogTransport>(
    router: Arc<Router<T>>,
    stream: TcpStream,
) -> Result<(), ServerError> {
    let (mut read_stream, mut write_stream) = stream.into_split();

    let request = match read_head(&mut read_stream).await {
        Ok(head) => HttpRequest::parse(&head).map_err(ServerError::from),
        Err(error) => Err(error),
    };

    match request {
        Ok(request) => router.dispatch(&request, &mut read_stream, &mut write_stream).await?,
        Err(ServerError::Request(error)) => {
            logger!(WARN, "[HTTP] Rejecting request ({error})");
            let reply = error_reply(400, &error.to_string());
            let response = HttpResponse::json(reply.status, reply.body);
            write_stream.write_all(&response.wrap_response()).await?;
        }
        Err(error) => return Err(error),
    }

    write_stream.shutdown().await?;
    Ok(())
}
