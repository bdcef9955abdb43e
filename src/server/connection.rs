// Connection handling module
// Serves one accepted TCP connection on the local task set

use std::convert::Infallible;
use std::net::SocketAddr;
use std::rc::Rc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::handler::Dispatcher;
use crate::logger;

/// Handle a single connection in a task of its own.
///
/// Must run inside a `tokio::task::LocalSet`. Requests on a keep-alive
/// connection are handled one after another; a stalled client only holds
/// up its own task.
pub fn handle_connection(stream: TcpStream, peer: SocketAddr, dispatcher: Rc<Dispatcher>) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let dispatcher = Rc::clone(&dispatcher);
            async move { Ok::<_, Infallible>(dispatcher.dispatch(req, peer).await) }
        });

        if let Err(err) = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service)
            .await
        {
            // Clients hanging up between requests is routine
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
