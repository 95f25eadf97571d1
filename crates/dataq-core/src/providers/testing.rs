//! One-shot HTTP server used by the provider tests.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Debug)]
pub struct Captured {
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Answer a single request with `status` and `reply`, handing the request
/// back through the returned receiver.
pub async fn serve_once(
    status: StatusCode,
    reply: &'static str,
) -> (SocketAddr, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let handler = move |req: Request<hyper::body::Incoming>| {
            let sender = tx.lock().unwrap().take();
            async move {
                let path_and_query = req
                    .uri()
                    .path_and_query()
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                let headers = req.headers().clone();
                let bytes = req.into_body().collect().await.unwrap().to_bytes();
                let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                if let Some(sender) = sender {
                    let _ = sender.send(Captured {
                        path_and_query,
                        headers,
                        body,
                    });
                }
                let response = Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Full::new(Bytes::from_static(reply.as_bytes())))
                    .unwrap();
                Ok::<_, Infallible>(response)
            }
        };
        http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service_fn(handler))
            .await
            .ok();
    });

    (addr, rx)
}
