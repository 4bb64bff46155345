//! One-shot command implementations
//!
//! Thin wrappers over [`GatewayClient`] for scripting: deterministic exit
//! codes (0 on success, 1 on any failure), stable single-object JSON in
//! `--json` mode, and no ANSI escapes in plain mode.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use msgdeck_core::qr::PairingQr;
use msgdeck_core::state::MediaMessage;
use msgdeck_core::{BackendStatus, GatewayClient, TextMessage};

/// Print the backend connection status.
pub fn status<C: GatewayClient>(client: &C, json: bool) -> ExitCode {
    match client.fetch_status() {
        BackendStatus::Online(snapshot) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "backend": "online",
                        "status": snapshot.state.wire_name(),
                        "number": snapshot.number,
                    })
                );
            } else {
                println!("status: {}", snapshot.state.wire_name());
                if let Some(number) = &snapshot.number {
                    println!("number: +{number}");
                }
            }
            ExitCode::SUCCESS
        }
        BackendStatus::Offline => {
            if json {
                println!("{}", serde_json::json!({ "backend": "offline" }));
            } else {
                println!("backend: offline");
            }
            ExitCode::FAILURE
        }
    }
}

/// Print the pairing QR code to stdout.
pub fn qr<C: GatewayClient>(client: &C) -> ExitCode {
    let Some(pairing) = client.fetch_qr() else {
        eprintln!("error: no pairing code available (backend must be in SCAN_QR)");
        return ExitCode::FAILURE;
    };
    match PairingQr::encode(&pairing) {
        Ok(code) => {
            print!("{}", code.to_half_blocks());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Send a text message. Empty fields fail before any request is issued.
pub fn send_text<C: GatewayClient>(client: &C, number: &str, message: &str, json: bool) -> ExitCode {
    let number = number.trim();
    let message = message.trim();
    if number.is_empty() || message.is_empty() {
        eprintln!("error: --number and --message must not be empty");
        return ExitCode::FAILURE;
    }

    let outbound = TextMessage {
        number: number.to_string(),
        message: message.to_string(),
    };
    report_send(client.send_text(&outbound), number, json)
}

/// Send a media file. The file is validated and read before any request.
pub fn send_media<C: GatewayClient>(
    client: &C,
    number: &str,
    file: &Path,
    caption: Option<String>,
    json: bool,
) -> ExitCode {
    let number = number.trim();
    if number.is_empty() {
        eprintln!("error: --number must not be empty");
        return ExitCode::FAILURE;
    }

    let outbound = match MediaMessage::from_path(number, file, caption) {
        Ok(outbound) => outbound,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    report_send(client.send_media(&outbound), number, json)
}

/// Log out, wait the configured grace period, then re-poll status once.
pub fn logout<C: GatewayClient>(client: &C, grace: Duration) -> ExitCode {
    if let Err(err) = client.logout() {
        eprintln!("error: logout failed: {err}");
        return ExitCode::FAILURE;
    }

    // Backend needs time to tear down the session and restart.
    std::thread::sleep(grace);
    match client.fetch_status() {
        BackendStatus::Online(snapshot) => {
            println!("logged out; status: {}", snapshot.state.wire_name());
        }
        BackendStatus::Offline => println!("logged out; backend: offline"),
    }
    ExitCode::SUCCESS
}

fn report_send(
    result: Result<(), msgdeck_core::GatewayError>,
    number: &str,
    json: bool,
) -> ExitCode {
    match result {
        Ok(()) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "sent": true, "number": number })
                );
            } else {
                println!("Message sent to {number}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "sent": false, "message": err.to_string() })
                );
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}
