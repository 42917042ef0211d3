//! Ollama relay tests against an in-process mock server

use axum::{body::Body, http::StatusCode, routing::post, Json, Router};
use futures::StreamExt;
use homenet_server::relay::{OllamaClient, RelayError};
use serde_json::Value;
use std::convert::Infallible;

async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Upstream replying with `chunks` as separate body frames
fn chunked(chunks: &'static [&'static str]) -> Router {
    Router::new().route(
        "/api/generate",
        post(move || async move {
            let frames = futures::stream::iter(chunks.iter().map(|c| Ok::<_, Infallible>(*c)));
            Body::from_stream(frames)
        }),
    )
}

#[tokio::test]
async fn test_generate_sends_model_prompt_and_stream_flag() {
    // Echo the request body back as a single answer line
    let upstream = Router::new().route(
        "/api/generate",
        post(|Json(body): Json<Value>| async move {
            let line = serde_json::json!({ "response": body.to_string(), "done": true });
            format!("{}\n", line)
        }),
    );
    let host = spawn_upstream(upstream).await;
    let client = OllamaClient::new(&host, "llama3.2:latest").unwrap();

    let echoed: Value = serde_json::from_str(&client.generate("why?").await.unwrap()).unwrap();
    assert_eq!(echoed["model"], "llama3.2:latest");
    assert_eq!(echoed["prompt"], "why?");
    assert_eq!(echoed["stream"], false);
}

#[tokio::test]
async fn test_generate_concatenates_until_done() {
    let host = spawn_upstream(chunked(&[
        "{\"response\":\"The sky \",\"done\":false}\n\n",
        "not json\n",
        "{\"response\":\"is bl",
        "ue.\",\"done\":false}\n{\"response\":\"\",\"done\":true}\n",
        "{\"response\":\" ignored\",\"done\":false}\n",
    ]))
    .await;
    let client = OllamaClient::new(&host, "m").unwrap();

    assert_eq!(client.generate("q").await.unwrap(), "The sky is blue.");
}

#[tokio::test]
async fn test_generate_reads_final_line_without_newline() {
    let host = spawn_upstream(chunked(&["{\"response\":\"Hi\",\"done\":true}"])).await;
    let client = OllamaClient::new(&host, "m").unwrap();

    assert_eq!(client.generate("q").await.unwrap(), "Hi");
}

#[tokio::test]
async fn test_generate_empty_answer_is_an_error() {
    let host = spawn_upstream(chunked(&["{\"done\":true}\n"])).await;
    let client = OllamaClient::new(&host, "m").unwrap();

    let err = client.generate("q").await.unwrap_err();
    assert!(matches!(err, RelayError::EmptyResponse));
    assert_eq!(err.to_string(), "no response text received from Ollama");
}

#[tokio::test]
async fn test_generate_non_success_status() {
    let upstream = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "out of memory") }),
    );
    let host = spawn_upstream(upstream).await;
    let client = OllamaClient::new(&host, "m").unwrap();

    match client.generate("q").await {
        Err(RelayError::Status(code, body)) => {
            assert_eq!(code, 500);
            assert_eq!(body, "out of memory");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_stream_yields_increments() {
    let host = spawn_upstream(chunked(&[
        "{\"response\":\"Hel\",\"done\":false}\n{\"resp",
        "onse\":\"\",\"done\":false}\n{\"response\":\"lo\",\"done\":false}\n",
        "{\"response\":\"!\",\"done\":true}\n",
        "{\"response\":\"after done\",\"done\":false}\n",
    ]))
    .await;
    let client = OllamaClient::new(&host, "m").unwrap();

    let parts: Vec<String> = client
        .generate_stream("q")
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(parts, vec!["Hel", "lo", "!"]);
}

#[tokio::test]
async fn test_generate_stream_status_error() {
    let upstream = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
    );
    let host = spawn_upstream(upstream).await;
    let client = OllamaClient::new(&host, "m").unwrap();

    let items: Vec<Result<String, RelayError>> = client.generate_stream("q").collect().await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(RelayError::Status(404, _))));
}
