//! CLI integration tests for sigil-cli.
//!
//! These run the actual binary against freshly generated PNG fixtures and
//! check outputs, exit codes, and file artifacts.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the sigil binary.
fn sigil() -> Command {
    Command::cargo_bin("sigil").unwrap()
}

/// Write a patterned RGBA PNG fixture.
fn write_png(path: &Path, width: u32, height: u32) {
    let mut img = RgbaImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgba([
            (x * 7 % 256) as u8,
            (y * 11 % 256) as u8,
            ((x + y) * 13 % 256) as u8,
            0xFF,
        ]);
    }
    img.save(path).unwrap();
}

struct Fixtures {
    _dir: TempDir,
    template: std::path::PathBuf,
    card: std::path::PathBuf,
    sealed: std::path::PathBuf,
}

fn fixtures() -> Fixtures {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("sigil.png");
    let card = dir.path().join("card.png");
    let sealed = dir.path().join("card.sealed.png");
    write_png(&template, 64, 64);
    write_png(&card, 512, 768);
    Fixtures {
        _dir: dir,
        template,
        card,
        sealed,
    }
}

fn issue_ok(fx: &Fixtures, member_id: &str, tier: &str) {
    sigil()
        .args([
            "issue",
            "--member-id",
            member_id,
            "--tier",
            tier,
            "--template",
            fx.template.to_str().unwrap(),
            "--card",
            fx.card.to_str().unwrap(),
        ])
        .assert()
        .success();
}

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn test_help_displays_usage() {
    sigil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Steganographic membership-card sealing",
        ))
        .stdout(predicate::str::contains("issue"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("capacity"));
}

#[test]
fn test_help_shows_exit_codes() {
    sigil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_version_displays_version() {
    sigil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sigil"));
}

// ============================================================================
// Issue
// ============================================================================

#[test]
fn test_issue_writes_sealed_card() {
    let fx = fixtures();
    sigil()
        .args([
            "issue",
            "--member-id",
            "M-00042",
            "--tier",
            "Standard",
            "--template",
            fx.template.to_str().unwrap(),
            "--card",
            fx.card.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Card issued"))
        .stdout(predicate::str::contains("M-00042"));
    assert!(fx.sealed.exists(), "sealed card artifact should be written");
}

#[test]
fn test_issue_json_report() {
    let fx = fixtures();
    sigil()
        .args([
            "issue",
            "--member-id",
            "m_json",
            "--tier",
            "premium",
            "--template",
            fx.template.to_str().unwrap(),
            "--card",
            fx.card.to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tier_name\": \"Premium\""))
        .stdout(predicate::str::contains("\"member_id\": \"m_json\""));
}

#[test]
fn test_issue_missing_template_is_input_error() {
    let fx = fixtures();
    sigil()
        .args([
            "issue",
            "--member-id",
            "m_x",
            "--tier",
            "2",
            "--template",
            "no-such-file.png",
            "--card",
            fx.card.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(66)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_issue_rejects_unknown_tier_name() {
    let fx = fixtures();
    sigil()
        .args([
            "issue",
            "--member-id",
            "m_x",
            "--tier",
            "Platinum",
            "--template",
            fx.template.to_str().unwrap(),
            "--card",
            fx.card.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tier"));
}

#[test]
fn test_issue_template_larger_than_card_fails() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("big.png");
    let card = dir.path().join("small.png");
    write_png(&template, 128, 128);
    write_png(&card, 100, 100);
    sigil()
        .args([
            "issue",
            "--member-id",
            "m_x",
            "--tier",
            "2",
            "--template",
            template.to_str().unwrap(),
            "--card",
            card.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seal out of bounds"));
}

// ============================================================================
// Scan
// ============================================================================

#[test]
fn test_issue_then_scan_roundtrip() {
    let fx = fixtures();
    issue_ok(&fx, "M-00042", "Standard");

    sigil()
        .args(["scan", fx.sealed.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"))
        .stdout(predicate::str::contains("M-00042"))
        .stdout(predicate::str::contains("Standard"));
}

#[test]
fn test_scan_json_report() {
    let fx = fixtures();
    issue_ok(&fx, "m_kiosk", "Kids");

    sigil()
        .args(["scan", fx.sealed.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"))
        .stdout(predicate::str::contains("\"member_id\": \"m_kiosk\""));
}

#[test]
fn test_scan_with_wrong_key_fails_verification() {
    let fx = fixtures();
    sigil()
        .args([
            "issue",
            "--member-id",
            "m_keyed",
            "--tier",
            "2",
            "--template",
            fx.template.to_str().unwrap(),
            "--card",
            fx.card.to_str().unwrap(),
            "--key",
            "deadbeef",
        ])
        .assert()
        .success();

    sigil()
        .args(["scan", fx.sealed.to_str().unwrap(), "--key", "beefdead"])
        .assert()
        .failure()
        .code(65)
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains("integrity token mismatch"));

    sigil()
        .args(["scan", fx.sealed.to_str().unwrap(), "--key", "deadbeef"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));
}

#[test]
fn test_scan_unsealed_card_fails() {
    let fx = fixtures();
    sigil()
        .args(["scan", fx.card.to_str().unwrap()])
        .assert()
        .failure()
        .code(65)
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_scan_card_too_small_is_input_error() {
    let dir = TempDir::new().unwrap();
    let tiny = dir.path().join("tiny.png");
    write_png(&tiny, 32, 32);
    sigil()
        .args(["scan", tiny.to_str().unwrap()])
        .assert()
        .failure()
        .code(66)
        .stderr(predicate::str::contains("seal not found"));
}

#[test]
fn test_scan_wrong_placement_fails() {
    let fx = fixtures();
    issue_ok(&fx, "m_corner", "2");

    sigil()
        .args([
            "scan",
            fx.sealed.to_str().unwrap(),
            "--anchor",
            "top-right",
        ])
        .assert()
        .failure()
        .code(65);
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_capacity_reports_reference_numbers() {
    let fx = fixtures();
    sigil()
        .args(["capacity", fx.template.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("12288"))
        .stdout(predicate::str::contains("12256"));
}

#[test]
fn test_capacity_json_report() {
    let fx = fixtures();
    sigil()
        .args([
            "capacity",
            fx.template.to_str().unwrap(),
            "--json",
            "--bits-per-channel",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"capacity_bits\": 24576"));
}
