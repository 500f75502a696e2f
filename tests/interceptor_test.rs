//! Request decoration as seen by the server.

mod common;

use common::{response, serve};
use http::{HeaderValue, StatusCode};
use statebot::http::interceptor::{Interceptor, OutgoingRequest, ResponseHead};
use statebot::{Bot, NetError};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_default_user_agent() {
    let (base, mut seen) = serve(|_| response("200 OK", &[], "")).await;
    let mut bot = Bot::builder().base_url(base.as_str()).build();
    bot.get("/").await.unwrap();

    let req = seen.recv().await.unwrap();
    assert_eq!(req.header("user-agent"), Some("Mozilla/5.0 (compatible)"));
}

#[tokio::test]
async fn test_custom_user_agent_on_every_hop() {
    let (base, mut seen) = serve(|req| match req.path.as_str() {
        "/start" => response("302 Found", &[("Location", "/end")], ""),
        _ => response("200 OK", &[], ""),
    })
    .await;
    let mut bot = Bot::builder()
        .base_url(base.as_str())
        .user_agent("statebot-tests/1.0")
        .build();
    bot.get("/start").await.unwrap();

    for _ in 0..2 {
        let req = seen.recv().await.unwrap();
        assert_eq!(req.header("user-agent"), Some("statebot-tests/1.0"));
    }
}

/// Adds a header and records what came back.
#[derive(Default, Clone)]
struct Recorder {
    statuses: Arc<Mutex<Vec<String>>>,
}

impl Interceptor for Recorder {
    fn on_request(&self, request: &mut OutgoingRequest) {
        request
            .headers
            .insert("x-trace", HeaderValue::from_static("on"));
    }

    fn on_response(
        &self,
        request: &OutgoingRequest,
        response: Result<ResponseHead<'_>, &NetError>,
    ) {
        let entry = match response {
            Ok(head) => format!("{} {}", request.url.path(), head.status.as_u16()),
            Err(e) => format!("{} {}", request.url.path(), e),
        };
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(entry);
        }
    }
}

#[tokio::test]
async fn test_custom_interceptor_sees_each_hop() {
    let (base, mut seen) = serve(|req| match req.path.as_str() {
        "/a" => response("301 Moved Permanently", &[("Location", "/b")], ""),
        _ => response("404 Not Found", &[], "gone"),
    })
    .await;
    let recorder = Recorder::default();
    let mut bot = Bot::builder()
        .base_url(base.as_str())
        .interceptor(recorder.clone())
        .debug(true)
        .build();

    let err = bot.get("/a").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let statuses = recorder.statuses.lock().unwrap().clone();
    assert_eq!(statuses, vec!["/a 301", "/b 404"]);

    let req = seen.recv().await.unwrap();
    assert_eq!(req.header("x-trace"), Some("on"));
}
