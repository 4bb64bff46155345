//! Connection-state model and outbound message types
//!
//! The gateway backend owns the session state machine
//! (INITIALIZING → CONNECTING → SCAN_QR → CONNECTED, with DISCONNECTED
//! reachable from anywhere). This client only reads it: every value here is
//! rebuilt from a fresh poll and discarded after the render cycle.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Session lifecycle stage as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Initializing,
    Connecting,
    /// Pairing required; the backend is serving a QR string on `/qr`.
    ScanQr,
    Connected,
    Disconnected,
    /// A status string this client doesn't know. Rendered like a
    /// disconnect; the backend may grow states.
    Unknown(String),
}

impl ConnectionState {
    /// Map the backend's wire string onto a state.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "INITIALIZING" => Self::Initializing,
            "CONNECTING" => Self::Connecting,
            "SCAN_QR" => Self::ScanQr,
            "CONNECTED" => Self::Connected,
            "DISCONNECTED" => Self::Disconnected,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The backend's wire string for this state.
    pub fn wire_name(&self) -> &str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::Connecting => "CONNECTING",
            Self::ScanQr => "SCAN_QR",
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether the backend is still working towards a QR or a session.
    pub fn is_starting(&self) -> bool {
        matches!(self, Self::Initializing | Self::Connecting)
    }
}

/// Parsed `/status` response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: ConnectionState,
    /// Account identifier, present while connected.
    pub number: Option<String>,
}

/// Raw `/status` wire format.
#[derive(Debug, Deserialize)]
pub(crate) struct RawStatus {
    pub status: String,
    #[serde(default)]
    pub number: Option<String>,
}

impl From<RawStatus> for StatusSnapshot {
    fn from(raw: RawStatus) -> Self {
        Self {
            state: ConnectionState::parse(&raw.status),
            number: raw.number,
        }
    }
}

/// Result of a status poll. `Offline` is distinct from any valid
/// [`ConnectionState`]: it means the backend itself did not answer, and the
/// dashboard must block actions rather than show stale data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Online(StatusSnapshot),
    Offline,
}

impl BackendStatus {
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            Self::Online(snapshot) => Some(snapshot),
            Self::Offline => None,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot().is_some_and(|s| s.state.is_connected())
    }
}

/// Outbound text message, built from form input and discarded after submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    /// Recipient phone number in international format, digits only.
    pub number: String,
    pub message: String,
}

/// Outbound media message. The file is read eagerly when the form is
/// submitted; nothing is cached across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMessage {
    pub number: String,
    pub caption: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Upload types the dashboard accepts. A UX hint mirroring the backend's
/// expectations, not a security boundary.
pub const ACCEPTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "pdf", "doc", "docx", "xls", "xlsx"];

/// Errors building a [`MediaMessage`] from a local file.
#[derive(Debug, Error)]
pub enum MediaFileError {
    #[error("file has no name: {0}")]
    MissingName(String),

    #[error("unsupported file type '.{extension}' (accepted: png jpg jpeg pdf doc docx xls xlsx)")]
    UnsupportedType { extension: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

impl MediaMessage {
    /// Read a local file into an outbound media message, inferring the mime
    /// type from the extension and rejecting disallowed types up front.
    pub fn from_path(
        number: impl Into<String>,
        path: &Path,
        caption: Option<String>,
    ) -> Result<Self, MediaFileError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| MediaFileError::MissingName(path.display().to_string()))?;

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(MediaFileError::UnsupportedType { extension });
        }

        let bytes = std::fs::read(path).map_err(|source| MediaFileError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            number: number.into(),
            caption,
            mime_type: mime_for_extension(&extension).to_string(),
            file_name,
            bytes,
        })
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_known_states() {
        assert_eq!(
            ConnectionState::parse("INITIALIZING"),
            ConnectionState::Initializing
        );
        assert_eq!(ConnectionState::parse("SCAN_QR"), ConnectionState::ScanQr);
        assert_eq!(
            ConnectionState::parse("CONNECTED"),
            ConnectionState::Connected
        );
        assert!(ConnectionState::parse("CONNECTED").is_connected());
        assert!(ConnectionState::parse("CONNECTING").is_starting());
    }

    #[test]
    fn unknown_state_keeps_raw_string() {
        let state = ConnectionState::parse("REBOOTING");
        assert_eq!(state, ConnectionState::Unknown("REBOOTING".to_string()));
        assert!(!state.is_connected());
        assert_eq!(state.wire_name(), "REBOOTING");
    }

    #[test]
    fn wire_names_round_trip() {
        for raw in [
            "INITIALIZING",
            "CONNECTING",
            "SCAN_QR",
            "CONNECTED",
            "DISCONNECTED",
        ] {
            assert_eq!(ConnectionState::parse(raw).wire_name(), raw);
        }
    }

    #[test]
    fn raw_status_parses_with_and_without_number() {
        let raw: RawStatus =
            serde_json::from_str(r#"{"status":"CONNECTED","number":"15551234567"}"#)
                .expect("parse status");
        let snapshot = StatusSnapshot::from(raw);
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert_eq!(snapshot.number.as_deref(), Some("15551234567"));

        let raw: RawStatus = serde_json::from_str(r#"{"status":"SCAN_QR"}"#).expect("parse status");
        let snapshot = StatusSnapshot::from(raw);
        assert_eq!(snapshot.state, ConnectionState::ScanQr);
        assert_eq!(snapshot.number, None);
    }

    #[test]
    fn offline_is_distinct_from_disconnected() {
        let disconnected = BackendStatus::Online(StatusSnapshot {
            state: ConnectionState::Disconnected,
            number: None,
        });
        assert!(!disconnected.is_offline());
        assert!(BackendStatus::Offline.is_offline());
        assert_ne!(disconnected, BackendStatus::Offline);
    }

    #[test]
    fn media_from_path_infers_mime_type() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("report.pdf");
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"%PDF-1.4").expect("write file");

        let media = MediaMessage::from_path("15551234567", &path, Some("q3".to_string()))
            .expect("build media message");
        assert_eq!(media.file_name, "report.pdf");
        assert_eq!(media.mime_type, "application/pdf");
        assert_eq!(media.bytes, b"%PDF-1.4");
    }

    #[test]
    fn media_from_path_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("payload.exe");
        std::fs::write(&path, b"MZ").expect("write file");

        let err = MediaMessage::from_path("1", &path, None).expect_err("should reject");
        assert!(matches!(
            err,
            MediaFileError::UnsupportedType { ref extension } if extension == "exe"
        ));
    }

    #[test]
    fn media_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = MediaMessage::from_path("1", &dir.path().join("missing.png"), None)
            .expect_err("should fail");
        assert!(matches!(err, MediaFileError::Read { .. }));
    }
}
