//! End-to-end runs of the `ebl` binary against the shared fixtures.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rstest::rstest;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests")
}

fn dictionary(name: &str) -> PathBuf {
    fixtures().join("dictionaries").join(format!("{name}.json"))
}

fn document(name: &str) -> PathBuf {
    fixtures().join("documents").join(name)
}

/// Run `ebl` in an empty directory with no user config in reach.
fn ebl(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ebl"))
        .args(args)
        .current_dir(cwd)
        .env("XDG_CONFIG_HOME", cwd.join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("ebl runs")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 fixture path")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[rstest]
#[case("banking", "banking_payments.ebl")]
#[case("kyc", "kyc_onboarding.ebl")]
#[case("insurance", "insurance_claim_lifecycle.ebl")]
fn clean_documents_pass(#[case] dict: &str, #[case] doc: &str) {
    let cwd = TempDir::new().expect("temp dir");
    let dict = dictionary(dict);
    let doc = document(doc);
    let output = ebl(cwd.path(), &["check", "-d", path_arg(&dict), path_arg(&doc)]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("0 error(s), 0 warning(s); accepted"), "{stdout}");
}

#[test]
fn violations_fail_with_json_report() {
    let cwd = TempDir::new().expect("temp dir");
    let dict = dictionary("banking");
    let doc = document("banking_violations.ebl");
    let output = ebl(
        cwd.path(),
        &["check", "--format", "json", "-d", path_arg(&dict), path_arg(&doc)],
    );

    assert!(!output.status.success());
    let report = json(&output);
    assert_eq!(report["accepted"], false);
    let file = &report["files"][0];
    assert_eq!(file["errors"], 3);
    let codes: Vec<_> = file["issues"]
        .as_array()
        .expect("issues array")
        .iter()
        .map(|issue| issue["code"].as_str().expect("code string"))
        .collect();
    assert_eq!(codes, ["verb-not-permitted", "read-not-permitted", "unknown-data-ref"]);
    assert_eq!(file["issues"][0]["line"], 6);
}

#[test]
fn deny_warnings_turns_warnings_into_failure() {
    let cwd = TempDir::new().expect("temp dir");
    let dict = dictionary("insurance");
    let doc = document("insurance_subrogation.ebl");

    let relaxed = ebl(cwd.path(), &["check", "-d", path_arg(&dict), path_arg(&doc)]);
    assert!(relaxed.status.success());

    let strict = ebl(
        cwd.path(),
        &["check", "--deny-warnings", "-d", path_arg(&dict), path_arg(&doc)],
    );
    assert!(!strict.status.success());
    let stdout = String::from_utf8_lossy(&strict.stdout);
    assert!(stdout.contains("W201"), "{stdout}");
}

#[test]
fn config_in_working_directory_is_discovered() {
    let cwd = TempDir::new().expect("temp dir");
    std::fs::write(
        cwd.path().join("ebl.toml"),
        format!("dictionaries = [{:?}]\n", path_arg(&dictionary("kyc"))),
    )
    .expect("write config");

    let doc = document("kyc_onboarding.ebl");
    let output = ebl(cwd.path(), &["check", "--format", "json", path_arg(&doc)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json(&output)["files"][0]["accepted"], true);
}

#[test]
fn parse_failure_is_reported_and_rejected() {
    let cwd = TempDir::new().expect("temp dir");
    let bad = cwd.path().join("bad.ebl");
    std::fs::write(&bad, "Process {\n").expect("write document");

    let output = ebl(cwd.path(), &["check", "--format", "json", path_arg(&bad)]);
    assert!(!output.status.success());
    let file = &json(&output)["files"][0];
    assert_eq!(file["accepted"], false);
    assert!(!file["parseErrors"].as_array().expect("parse errors").is_empty());
}

#[test]
fn missing_dictionary_is_a_hard_failure() {
    let cwd = TempDir::new().expect("temp dir");
    let doc = document("banking_payments.ebl");
    let output = ebl(cwd.path(), &["check", "-d", "nowhere.json", path_arg(&doc)]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read dictionary nowhere.json"), "{stderr}");
}

#[test]
fn symbols_prints_the_union() {
    let cwd = TempDir::new().expect("temp dir");
    let banking = dictionary("banking");
    let kyc = dictionary("kyc");
    let output = ebl(cwd.path(), &["symbols", "-d", path_arg(&banking), "-d", path_arg(&kyc)]);

    assert!(output.status.success());
    let table = json(&output);
    let actors: Vec<_> = table["actors"]
        .as_array()
        .expect("actors array")
        .iter()
        .filter_map(|actor| actor.as_str())
        .collect();
    assert!(actors.contains(&"teller"));
    assert!(actors.contains(&"kycofficer"));
}
