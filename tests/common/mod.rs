// Shared test harness: an in-process backend speaking the same
// `/ping-results` contract as the real one, with settable responses and
// a record of every batch posted to it.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pingboard::model::PingResult;

#[derive(Default)]
struct BackendState {
    status: u16,
    body: String,
    posted: Vec<Vec<PingResult>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and serve until `stop` or drop.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");

        let state = Arc::new(Mutex::new(BackendState {
            status: 200,
            body: "[]".to_string(),
            posted: Vec::new(),
        }));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let state_for_server = state.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        let Ok((stream, _)) = accept_result else { continue };
                        let state = state_for_server.clone();
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            let service =
                                service_fn(move |req| handle_request(req, state.clone()));
                            let _ = Builder::new(hyper_util::rt::TokioExecutor::new())
                                .serve_connection(io, service)
                                .await;
                        });
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Serve this result list from `GET /ping-results`.
    pub fn set_results(&self, results: &[PingResult]) {
        let body = serde_json::to_string(results).expect("encode results");
        self.set_response(200, &body);
    }

    /// Serve an arbitrary status and body, for failure injection.
    pub fn set_response(&self, status: u16, body: &str) {
        let mut state = self.state.lock().unwrap();
        state.status = status;
        state.body = body.to_string();
    }

    /// Every batch successfully posted so far, oldest first.
    pub fn posted_batches(&self) -> Vec<Vec<PingResult>> {
        self.state.lock().unwrap().posted.clone()
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<Mutex<BackendState>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/ping-results") => {
            let (status, body) = {
                let state = state.lock().unwrap();
                (state.status, state.body.clone())
            };
            Ok(response(status, body))
        }
        (Method::POST, "/ping-results") => {
            let bytes = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(_) => return Ok(response(400, "unreadable body".to_string())),
            };
            let (status, reply) = {
                let mut state = state.lock().unwrap();
                if state.status != 200 {
                    (state.status, state.body.clone())
                } else {
                    match serde_json::from_slice::<Vec<PingResult>>(&bytes) {
                        Ok(batch) => {
                            state.posted.push(batch);
                            (200, String::new())
                        }
                        Err(err) => (400, err.to_string()),
                    }
                }
            };
            Ok(response(status, reply))
        }
        _ => Ok(response(404, "Not Found".to_string())),
    }
}

fn response(status: u16, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Poll `check` every 10ms until it passes or ten seconds elapse.
pub async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if check() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting until {what}");
}
