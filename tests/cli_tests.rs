//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

use printschema::schema::enums::{Duplexing, PageMediaSizeName};
use printschema::{DevMode, PrintTicket};
use tempfile::TempDir;

fn printschema_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_printschema"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_str().unwrap().to_string()
}

// ============================================================================
// Caps Command Tests
// ============================================================================

#[test]
fn test_cli_caps_summary() {
    let output = Command::new(printschema_bin())
        .args(["caps", &fixture("capabilities.xml")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "caps should succeed");
    assert!(stdout.contains("printschema v"), "should show version");
    assert!(stdout.contains("JobDuplexAllDocumentsContiguously (3 options)"));
    assert!(stdout.contains("JobCopiesAllDocuments [1, 999] default 1"));
}

#[test]
fn test_cli_caps_json_output() {
    let output = Command::new(printschema_bin())
        .args(["caps", "--json", &fixture("capabilities.xml")])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "caps --json should succeed");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["features"]["PageOrientation"][1], "Landscape");
    assert_eq!(json["parameters"][0]["name"], "JobCopiesAllDocuments");
    assert_eq!(json["parameters"][0]["max"], 999);
}

// ============================================================================
// Ticket Command Tests
// ============================================================================

#[test]
fn test_cli_ticket_json_output() {
    let output = Command::new(printschema_bin())
        .args(["ticket", "--json", &fixture("ticket.xml")])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "ticket --json should succeed");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["duplex"], "TwoSidedLongEdge");
    assert_eq!(json["copies"], 3);
    assert_eq!(json["mediaSize"]["name"], "ISOA4");
    assert!(json["collate"].is_null());
}

#[test]
fn test_cli_check_rejects_capabilities() {
    let ok = Command::new(printschema_bin())
        .args(["check", &fixture("ticket.xml")])
        .output()
        .expect("Failed to execute command");
    assert!(ok.status.success(), "check should accept a ticket");

    let bad = Command::new(printschema_bin())
        .args(["check", &fixture("capabilities.xml")])
        .output()
        .expect("Failed to execute command");
    assert!(!bad.status.success(), "check should reject capabilities");
    assert!(String::from_utf8_lossy(&bad.stderr).contains("Error:"));
}

#[test]
fn test_cli_set_writes_ticket() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.xml");

    let output = Command::new(printschema_bin())
        .args([
            "set",
            &fixture("ticket.xml"),
            "--duplex", "OneSided",
            "--copies", "8",
            "--media-size", "NorthAmericaLetter",
            "-o", out.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "set should succeed");

    let ticket = PrintTicket::parse(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(ticket.duplex().value(), Some(Duplexing::OneSided));
    assert_eq!(ticket.copies().value(), 8);
    assert_eq!(
        ticket.media_size().value(),
        Some(PageMediaSizeName::NorthAmericaLetter)
    );
}

#[test]
fn test_cli_set_unknown_keyword() {
    let output = Command::new(printschema_bin())
        .args(["set", &fixture("ticket.xml"), "--duplex", "Sideways"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "set should fail for unknown keyword");
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown duplex keyword"));
}

// ============================================================================
// Provider Command Tests
// ============================================================================

#[test]
fn test_cli_merge_reports_conflicts() {
    let output = Command::new(printschema_bin())
        .args([
            "merge",
            &fixture("ticket.xml"),
            "--delta", &fixture("delta.xml"),
            "--capabilities", &fixture("capabilities.xml"),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "merge should succeed");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Conflicts were resolved"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Monochrome"));
}

#[test]
fn test_cli_devmode_round_trip() {
    let dir = TempDir::new().unwrap();
    let devmode = dir.path().join("devmode.bin");
    let ticket = dir.path().join("ticket.xml");

    let output = Command::new(printschema_bin())
        .args([
            "devmode",
            &fixture("ticket.xml"),
            "--capabilities", &fixture("capabilities.xml"),
            "-o", devmode.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "devmode should succeed");

    let decoded = DevMode::decode(&std::fs::read(&devmode).unwrap()).unwrap();
    assert_eq!(decoded.copies, 3);

    let output = Command::new(printschema_bin())
        .args([
            "from-devmode",
            devmode.to_str().unwrap(),
            "--capabilities", &fixture("capabilities.xml"),
            "-o", ticket.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "from-devmode should succeed");

    let ticket = PrintTicket::parse(&std::fs::read(&ticket).unwrap()).unwrap();
    assert_eq!(ticket.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
}

#[test]
fn test_cli_limits_file() {
    let dir = TempDir::new().unwrap();
    let limits = dir.path().join("limits.json");
    std::fs::write(&limits, r#"{"max_xml_size": 64}"#).unwrap();

    let output = Command::new(printschema_bin())
        .args([
            "--limits", limits.to_str().unwrap(),
            "caps", &fixture("capabilities.xml"),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "oversized input should be rejected");
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds maximum"));
}
