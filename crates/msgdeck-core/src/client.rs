//! Gateway HTTP client
//!
//! [`GatewayClient`] is the seam between the dashboard and the backend: the
//! TUI and the one-shot CLI commands only ever talk to the trait, so tests
//! can substitute a mock. [`HttpGatewayClient`] is the production
//! implementation on blocking reqwest with short fixed timeouts.
//!
//! Failure semantics follow the poll contract: `/status` and `/qr` never
//! error (an unreachable backend degrades to [`BackendStatus::Offline`] /
//! `None`), while the action endpoints surface the backend's error message
//! verbatim so the user sees what the gateway said.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::BackendConfig;
use crate::state::{BackendStatus, MediaMessage, RawStatus, StatusSnapshot, TextMessage};

/// Errors from the action endpoints (`/logout`, `/send-message`,
/// `/send-media`).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with a non-success status. Carries the
    /// backend's own `message` field, displayed verbatim.
    #[error("{0}")]
    Backend(String),

    /// The request never produced a usable response (connect failure,
    /// timeout, protocol error).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Data access seam for the dashboard and CLI.
pub trait GatewayClient {
    /// Poll `/status`. Any failure (network, timeout, non-200, unparseable
    /// body) yields [`BackendStatus::Offline`], never stale data.
    fn fetch_status(&self) -> BackendStatus;

    /// Poll `/qr`. Only meaningful while the state is `SCAN_QR`; absence is
    /// not an error.
    fn fetch_qr(&self) -> Option<String>;

    /// POST `/logout`. The caller is responsible for the post-logout grace
    /// wait and the single re-poll.
    fn logout(&self) -> Result<(), GatewayError>;

    /// POST `/send-message` with a JSON body.
    fn send_text(&self, message: &TextMessage) -> Result<(), GatewayError>;

    /// POST `/send-media` as a multipart form (file part + metadata).
    fn send_media(&self, message: &MediaMessage) -> Result<(), GatewayError>;
}

/// JSON body for `/send-message`.
#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    number: &'a str,
    message: &'a str,
}

/// Error body the backend returns on failed actions.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Production client over the backend's HTTP surface.
pub struct HttpGatewayClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpGatewayClient {
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into the backend's own error message,
    /// falling back to the HTTP status when the body has none.
    fn surface_error(response: reqwest::blocking::Response) -> GatewayError {
        let status = response.status();
        match response.json::<ErrorBody>() {
            Ok(ErrorBody {
                message: Some(message),
            }) => GatewayError::Backend(message),
            _ => GatewayError::Backend(format!("gateway returned HTTP {status}")),
        }
    }

    fn check(response: reqwest::blocking::Response) -> Result<(), GatewayError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::surface_error(response))
        }
    }
}

impl GatewayClient for HttpGatewayClient {
    fn fetch_status(&self) -> BackendStatus {
        let response = match self.http.get(self.url("/status")).send() {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "status poll failed");
                return BackendStatus::Offline;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "status poll returned non-success");
            return BackendStatus::Offline;
        }
        match response.json::<RawStatus>() {
            Ok(raw) => BackendStatus::Online(StatusSnapshot::from(raw)),
            Err(err) => {
                // A 200 we can't parse means the backend isn't speaking our
                // protocol; treat it the same as unreachable.
                debug!(error = %err, "status body did not parse");
                BackendStatus::Offline
            }
        }
    }

    fn fetch_qr(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct QrBody {
            #[serde(default)]
            qr: Option<String>,
        }

        let response = self.http.get(self.url("/qr")).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<QrBody>().ok()?.qr
    }

    fn logout(&self) -> Result<(), GatewayError> {
        let response = self.http.post(self.url("/logout")).send()?;
        Self::check(response)
    }

    fn send_text(&self, message: &TextMessage) -> Result<(), GatewayError> {
        let payload = TextPayload {
            number: &message.number,
            message: &message.message,
        };
        let response = self
            .http
            .post(self.url("/send-message"))
            .json(&payload)
            .send()?;
        Self::check(response)
    }

    fn send_media(&self, message: &MediaMessage) -> Result<(), GatewayError> {
        let file = reqwest::blocking::multipart::Part::bytes(message.bytes.clone())
            .file_name(message.file_name.clone())
            .mime_str(&message.mime_type)?;
        // The backend expects a caption part even when empty.
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", file)
            .text("number", message.number.clone())
            .text("caption", message.caption.clone().unwrap_or_default());
        let response = self
            .http
            .post(self.url("/send-media"))
            .multipart(form)
            .send()?;
        Self::check(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConnectionState;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Build a full HTTP/1.1 response with the given status line and body.
    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Spawn a one-shot stub backend that serves the canned responses in
    /// order, one connection each, and reports every raw request it saw.
    fn spawn_stub(responses: Vec<String>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                stream
                    .set_read_timeout(Some(Duration::from_secs(2)))
                    .expect("set read timeout");

                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });

        (base_url, rx)
    }

    /// Read headers plus a Content-Length body from the stream.
    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).expect("read request");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "connection closed before headers completed");
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).expect("read body");
            assert!(n > 0, "connection closed before body completed");
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf).to_string()
    }

    fn client_for(base_url: &str) -> HttpGatewayClient {
        let config = BackendConfig {
            base_url: base_url.to_string(),
            request_timeout_ms: 2_000,
            connect_timeout_ms: 1_000,
        };
        HttpGatewayClient::new(&config).expect("build client")
    }

    /// Grab a port that nothing is listening on.
    fn dead_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }

    #[test]
    fn fetch_status_parses_connected_snapshot() {
        let (base_url, rx) = spawn_stub(vec![http_response(
            "200 OK",
            r#"{"status":"CONNECTED","number":"15551234567"}"#,
        )]);
        let client = client_for(&base_url);

        let status = client.fetch_status();
        let snapshot = status.snapshot().expect("should be online");
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert_eq!(snapshot.number.as_deref(), Some("15551234567"));

        let request = rx.recv().expect("request captured");
        assert!(request.starts_with("GET /status HTTP/1.1"));
    }

    #[test]
    fn fetch_status_non_200_is_offline() {
        let (base_url, _rx) = spawn_stub(vec![http_response("500 Internal Server Error", "{}")]);
        let client = client_for(&base_url);
        assert_eq!(client.fetch_status(), BackendStatus::Offline);
    }

    #[test]
    fn fetch_status_unparseable_body_is_offline() {
        let (base_url, _rx) = spawn_stub(vec![http_response("200 OK", "<html>not json</html>")]);
        let client = client_for(&base_url);
        assert_eq!(client.fetch_status(), BackendStatus::Offline);
    }

    #[test]
    fn fetch_status_unreachable_backend_is_offline() {
        let client = client_for(&dead_port_url());
        assert_eq!(client.fetch_status(), BackendStatus::Offline);
    }

    #[test]
    fn fetch_qr_returns_pairing_string() {
        let (base_url, _rx) = spawn_stub(vec![http_response("200 OK", r#"{"qr":"1@abc"}"#)]);
        let client = client_for(&base_url);
        assert_eq!(client.fetch_qr().as_deref(), Some("1@abc"));
    }

    #[test]
    fn fetch_qr_absent_field_is_none() {
        let (base_url, _rx) = spawn_stub(vec![http_response("200 OK", "{}")]);
        let client = client_for(&base_url);
        assert_eq!(client.fetch_qr(), None);
    }

    #[test]
    fn fetch_qr_unreachable_backend_is_none() {
        let client = client_for(&dead_port_url());
        assert_eq!(client.fetch_qr(), None);
    }

    #[test]
    fn send_text_posts_json_payload() {
        let (base_url, rx) = spawn_stub(vec![http_response("200 OK", "{}")]);
        let client = client_for(&base_url);

        let message = TextMessage {
            number: "15551234567".to_string(),
            message: "hi".to_string(),
        };
        client.send_text(&message).expect("send should succeed");

        let request = rx.recv().expect("request captured");
        assert!(request.starts_with("POST /send-message HTTP/1.1"));
        assert!(request.contains(r#""number":"15551234567""#));
        assert!(request.contains(r#""message":"hi""#));
    }

    #[test]
    fn send_text_surfaces_backend_message_verbatim() {
        let (base_url, _rx) = spawn_stub(vec![http_response(
            "400 Bad Request",
            r#"{"message":"bad number"}"#,
        )]);
        let client = client_for(&base_url);

        let message = TextMessage {
            number: "0".to_string(),
            message: "hi".to_string(),
        };
        let err = client.send_text(&message).expect_err("send should fail");
        assert_eq!(err.to_string(), "bad number");
        assert!(matches!(err, GatewayError::Backend(_)));
    }

    #[test]
    fn send_text_error_without_body_reports_http_status() {
        let (base_url, _rx) = spawn_stub(vec![http_response("503 Service Unavailable", "")]);
        let client = client_for(&base_url);

        let message = TextMessage {
            number: "1".to_string(),
            message: "hi".to_string(),
        };
        let err = client.send_text(&message).expect_err("send should fail");
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn send_media_posts_multipart_form() {
        let (base_url, rx) = spawn_stub(vec![http_response("200 OK", "{}")]);
        let client = client_for(&base_url);

        let message = MediaMessage {
            number: "15551234567".to_string(),
            caption: Some("invoice".to_string()),
            file_name: "invoice.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        client.send_media(&message).expect("send should succeed");

        let request = rx.recv().expect("request captured");
        assert!(request.starts_with("POST /send-media HTTP/1.1"));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"invoice.pdf\""));
        assert!(request.contains("application/pdf"));
        assert!(request.contains("name=\"number\""));
        assert!(request.contains("15551234567"));
        assert!(request.contains("name=\"caption\""));
        assert!(request.contains("invoice"));
    }

    #[test]
    fn logout_posts_once() {
        let (base_url, rx) = spawn_stub(vec![http_response("200 OK", "")]);
        let client = client_for(&base_url);

        client.logout().expect("logout should succeed");
        let request = rx.recv().expect("request captured");
        assert!(request.starts_with("POST /logout HTTP/1.1"));
    }
}
