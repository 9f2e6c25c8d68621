//! `ApiEmbedder` against a throwaway local HTTP server.

use std::time::Duration;

use semantic::{ApiEmbedder, EmbeddingProvider, RetryConfig, SemanticConfig, SemanticError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve each `(status, body)` pair to one connection in turn, returning the
/// raw requests seen.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/embed", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            let reply = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn config(url: String) -> SemanticConfig {
    SemanticConfig {
        api_url: Some(url),
        api_key_env: None,
        api_auth_header: Some("Bearer test-key".into()),
        model_name: "text-embedding-3-small".into(),
        timeout_secs: 5,
        ..SemanticConfig::default()
    }
}

#[tokio::test]
async fn openai_request_and_response() {
    let (url, server) = serve(vec![(
        200,
        r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2,0.3]}]}"#,
    )])
    .await;

    let embedder = ApiEmbedder::new(&config(url)).unwrap();
    let vector = embedder.embed("which temple?").await.unwrap();
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);

    let requests = server.await.unwrap();
    let request = requests[0].to_ascii_lowercase();
    assert!(request.starts_with("post /embed"));
    assert!(request.contains("authorization: bearer test-key"));
    assert!(request.contains(r#""input":"which temple?""#));
    assert!(request.contains(r#""model":"text-embedding-3-small""#));
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (url, server) = serve(vec![(401, r#"{"error":"bad key"}"#)]).await;

    let embedder = ApiEmbedder::new(&config(url)).unwrap();
    let err = embedder.embed("q").await.unwrap_err();
    assert_eq!(
        err,
        SemanticError::Status {
            status: 401,
            body: r#"{"error":"bad key"}"#.into()
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn invalid_json_is_malformed_response() {
    let (url, server) = serve(vec![(200, "not json")]).await;

    let embedder = ApiEmbedder::new(&config(url)).unwrap();
    let err = embedder.embed("q").await.unwrap_err();
    assert!(matches!(err, SemanticError::MalformedResponse(_)), "got {err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn empty_vector_is_rejected() {
    let (url, server) = serve(vec![(200, r#"{"data":[{"embedding":[]}]}"#)]).await;

    let embedder = ApiEmbedder::new(&config(url)).unwrap();
    assert_eq!(
        embedder.embed("q").await.unwrap_err(),
        SemanticError::EmptyVector
    );
    server.await.unwrap();
}

#[tokio::test]
async fn no_retry_without_retry_config() {
    let (url, server) = serve(vec![(503, "busy")]).await;

    let embedder = ApiEmbedder::new(&config(url)).unwrap();
    assert!(matches!(
        embedder.embed("q").await,
        Err(SemanticError::Status { status: 503, .. })
    ));
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn retries_transient_status_when_configured() {
    let (url, server) = serve(vec![(503, "busy"), (200, "[[1.0, 2.0]]")]).await;

    let mut cfg = config(url);
    cfg.retry_config = Some(
        RetryConfig::default()
            .with_max_retries(2)
            .with_base_delay(Duration::from_millis(5))
            .with_jitter(false),
    );
    let embedder = ApiEmbedder::new(&cfg).unwrap();

    assert_eq!(embedder.embed("q").await.unwrap(), vec![1.0, 2.0]);
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (url, server) = serve(vec![(400, "bad request")]).await;

    let mut cfg = config(url);
    cfg.retry_config = Some(RetryConfig::default().with_base_delay(Duration::from_millis(5)));
    let embedder = ApiEmbedder::new(&cfg).unwrap();

    assert!(matches!(
        embedder.embed("q").await,
        Err(SemanticError::Status { status: 400, .. })
    ));
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn huggingface_payload_uses_inputs() {
    let (url, server) = serve(vec![(200, "[0.5, 0.5]")]).await;

    let mut cfg = config(url);
    cfg.api_provider = "hf".into();
    let embedder = ApiEmbedder::new(&cfg).unwrap();

    assert_eq!(embedder.embed("hello").await.unwrap(), vec![0.5, 0.5]);
    let requests = server.await.unwrap();
    assert!(requests[0].contains(r#"{"inputs":"hello"}"#));
}
