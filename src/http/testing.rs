//! Loopback HTTP server for tests.

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use futures::channel::oneshot;
use reqwest::Url;
use std::sync::{Arc, Mutex};
use tokio::{net::TcpListener, task::JoinHandle};

/// A request received by the test server.
#[derive(Debug)]
pub struct Received {
    pub headers: HeaderMap,
    pub body: String,
}

/// Serves a canned JSON response to `POST /` on a loopback port, returning
/// the URL to connect to and a handle resolving to the first request.
pub async fn serve_once(status: u16, body: &'static str) -> (Url, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let (sender, receiver) = oneshot::channel();
    let sender = Arc::new(Mutex::new(Some(sender)));
    let app = Router::new().route(
        "/",
        post(move |headers: HeaderMap, request: String| {
            let sender = sender.clone();
            async move {
                if let Some(sender) = sender.lock().unwrap().take() {
                    let _ = sender.send(Received {
                        headers,
                        body: request,
                    });
                }
                (
                    StatusCode::from_u16(status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }
        }),
    );

    // The server lives until the test runtime shuts down.
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    let handle = tokio::spawn(async move { receiver.await.unwrap() });
    (url.parse().unwrap(), handle)
}
