#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "qrsite-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn qrsite(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qrsite"))
        .current_dir(dir)
        .env_remove("QRSITE_CONFIG")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("qrsite should run")
}

fn write_plain_config(dir: &Path, capacity: usize) {
    let config = format!(
        r#"{{
    "app_name": "cli-site",
    "author": "ana",
    "license": "CC-BY-4.0/with-slash",
    "input_path": "public/index.html",
    "output_path": "out",
    "minify_config": {{
        "html": {{ "minify": false, "options": {{}} }},
        "javascript": {{ "minify": false, "options": {{}} }},
        "css": {{ "minify": false, "options": {{}} }}
    }},
    "render": {{ "kind": "plain", "shard_capacity": {capacity}, "workers": 2 }}
}}"#
    );
    std::fs::write(dir.join("qrs-config.json"), config).expect("config should be writable");
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = unique_temp_dir("init");

    let first = qrsite(&dir, &["--format", "json", "init"]);
    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("init-report.schema.json"));
    let written = std::fs::read_to_string(dir.join("qrs-config.json")).unwrap();
    assert!(written.contains("\"input_path\": \"public/index.html\""));
    assert!(dir.join("public").is_dir());

    let second = qrsite(&dir, &["init"]);
    assert_eq!(second.status.code(), Some(78));
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"));

    let forced = qrsite(&dir, &["--format", "json", "init", "--force"]);
    assert!(forced.status.success());
    assert!(String::from_utf8_lossy(&forced.stdout).contains("\"overwritten\":true"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn log_level_is_read_from_the_environment() {
    let dir = unique_temp_dir("loglevel");

    let bad = Command::new(env!("CARGO_BIN_EXE_qrsite"))
        .current_dir(&dir)
        .env_remove("QRSITE_CONFIG")
        .env("QRSITE_LOG_LEVEL", "chatty")
        .arg("version")
        .output()
        .expect("qrsite should run");
    assert_eq!(bad.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("chatty"));

    let good = Command::new(env!("CARGO_BIN_EXE_qrsite"))
        .current_dir(&dir)
        .env_remove("QRSITE_CONFIG")
        .env("QRSITE_LOG_LEVEL", "debug")
        .arg("init")
        .output()
        .expect("qrsite should run");
    assert!(good.status.success());
    assert!(String::from_utf8_lossy(&good.stderr).contains("created input directory"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn build_then_decode_roundtrip() {
    let dir = unique_temp_dir("roundtrip");
    write_plain_config(&dir, 24);
    std::fs::create_dir_all(dir.join("public")).unwrap();
    let page = "<html><body><div class=\"a\">hi</div><p>a-b/c-d</p></body></html>";
    std::fs::write(dir.join("public/index.html"), page).unwrap();

    let build = qrsite(&dir, &["--format", "json", "build"]);
    assert!(
        build.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&build.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&build.stdout).expect("build report should be JSON");
    let total = report["total"].as_u64().expect("total should be a number");
    assert!(total > 1);
    assert_eq!(report["failed"], 0);
    assert!(dir.join("out/qrcode_0.txt").exists());

    let decode = qrsite(&dir, &["decode"]);
    assert!(decode.status.success());
    assert_eq!(String::from_utf8_lossy(&decode.stdout), page);

    let to_file = qrsite(
        &dir,
        &["--format", "json", "decode", "out", "--output", "decoded.html"],
    );
    assert!(to_file.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.join("decoded.html")).unwrap(),
        page
    );
    let report: serde_json::Value = serde_json::from_slice(&to_file.stdout).unwrap();
    assert_eq!(report["metadata"]["license"], "CC-BY-4.0/with-slash");
    assert_eq!(report["total"].as_u64(), Some(total));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_with_missing_shard_is_data_invalid() {
    let dir = unique_temp_dir("missing");
    write_plain_config(&dir, 16);
    std::fs::create_dir_all(dir.join("public")).unwrap();
    std::fs::write(
        dir.join("public/index.html"),
        "<main><h1>title</h1><p>enough text to need several shards</p></main>",
    )
    .unwrap();

    assert!(qrsite(&dir, &["build"]).status.success());
    std::fs::remove_file(dir.join("out/qrcode_1.txt")).unwrap();

    let decode = qrsite(&dir, &["decode"]);
    assert_eq!(decode.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&decode.stderr).contains("missing shards [1]"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn build_without_config_is_config_error() {
    let dir = unique_temp_dir("noconfig");
    let build = qrsite(&dir, &["build"]);
    assert_eq!(build.status.code(), Some(78));
    assert!(String::from_utf8_lossy(&build.stderr).contains("qrsite init"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn build_rejects_wrong_extension() {
    let dir = unique_temp_dir("ext");
    write_plain_config(&dir, 64);
    let config = std::fs::read_to_string(dir.join("qrs-config.json"))
        .unwrap()
        .replace("public/index.html", "public/index.txt");
    std::fs::write(dir.join("qrs-config.json"), config).unwrap();
    std::fs::create_dir_all(dir.join("public")).unwrap();
    std::fs::write(dir.join("public/index.txt"), "<p>x</p>").unwrap();

    let build = qrsite(&dir, &["build"]);
    assert_eq!(build.status.code(), Some(64));
    assert!(!dir.join("out").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let dir = unique_temp_dir("version");
    let output = qrsite(&dir, &["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("qrsite {}", env!("CARGO_PKG_VERSION"))
    );

    let extended = qrsite(&dir, &["version", "--extended"]);
    assert!(String::from_utf8_lossy(&extended.stdout).contains("target:"));
    let _ = std::fs::remove_dir_all(&dir);
}
