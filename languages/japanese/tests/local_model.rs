use kage_core::ResourceError;
use kage_lang_japanese::LocalModelTranslator;
use kage_translator::{TranslateError, Translator};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP responder: `route` maps "METHOD /path" and the body to a
/// status code and JSON reply.
async fn serve(route: fn(&str, &str) -> (u16, String)) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                let header_end = loop {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                while buf.len() < header_end + content_length {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let request_line = head.lines().next().unwrap_or_default();
                let target = request_line
                    .rsplit_once(' ')
                    .map(|(t, _)| t)
                    .unwrap_or(request_line);
                let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

                let (status, reply) = route(target, &body);
                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                    reply.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

const LANGUAGES: &str = r#"[{"code":"en","name":"English"},{"code":"ja","name":"Japanese"}]"#;

#[tokio::test]
async fn probe_and_translate() {
    let url = serve(|target, body| match target {
        "GET /languages" => (200, LANGUAGES.to_string()),
        "POST /translate" => {
            assert!(body.contains("\"source\":\"ja\""));
            assert!(body.contains("\"target\":\"en\""));
            (200, r#"{"translatedText":"Cat"}"#.to_string())
        }
        _ => (404, "{}".to_string()),
    })
    .await;

    let translator = LocalModelTranslator::connect(&url, None, "ja", "en-US")
        .await
        .unwrap();
    let translation = translator
        .translate("猫", "ja".to_string(), "en-US".to_string())
        .await
        .unwrap();

    assert_eq!(translation.text, "Cat");
    assert!(translator.metadata().local);
}

#[tokio::test]
async fn probe_rejects_missing_language() {
    let url = serve(|_, _| (200, r#"[{"code":"en","name":"English"}]"#.to_string())).await;

    let result = LocalModelTranslator::connect(&url, None, "ja", "en").await;
    assert!(matches!(result, Err(ResourceError::ModelLanguages { .. })));
}

#[tokio::test]
async fn probe_reports_unreachable_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = LocalModelTranslator::connect(&url, None, "ja", "en").await;
    assert!(matches!(result, Err(ResourceError::ModelUnreachable { .. })));
}

#[tokio::test]
async fn server_error_and_empty_reply_are_failures() {
    let url = serve(|target, body| match target {
        "GET /languages" => (200, LANGUAGES.to_string()),
        _ if body.contains("boom") => (500, r#"{"error":"model crashed"}"#.to_string()),
        _ => (200, r#"{"translatedText":""}"#.to_string()),
    })
    .await;

    let translator = LocalModelTranslator::connect(&url, None, "ja", "en")
        .await
        .unwrap();

    let err = translator
        .translate("boom", "ja".to_string(), "en".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::ApiError(ref m) if m == "model crashed"));

    let err = translator
        .translate("猫", "ja".to_string(), "en".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::EmptyResponse));
}
