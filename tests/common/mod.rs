//! Shared test infrastructure for integration tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

pub const SEARCHES: &str = "Date: 2021-05-01 10:00:00\nSearch Term: cats\n\n\
                            Date: 2021-05-02 11:30:00\nSearch Term: dogs\n";
pub const SETTINGS: &str = "App Language: nl\nInterests: Comedy|Dance\n";

/// Write a stored (uncompressed) zip with the given entries.
pub fn create_test_zip(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let zip_path = dir.join(name);
    let file = File::create(&zip_path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (entry_name, content) in files {
        writer
            .start_file(entry_name.to_string(), options)
            .expect("start zip entry");
        writer
            .write_all(content.as_bytes())
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip");
    zip_path
}

/// A TikTok TXT export nested in a top-level folder.
pub fn tiktok_export(dir: &Path) -> PathBuf {
    create_test_zip(
        dir,
        "tiktok.zip",
        &[
            ("TikTok_Data/Activity/Searches.txt", SEARCHES),
            ("TikTok_Data/App Settings/Settings.txt", SETTINGS),
            ("TikTok_Data/Profile/Profile Info.txt", "Username: someone\n"),
        ],
    )
}

/// Run `ddflow` with `args`, feeding `stdin`.
#[allow(dead_code)]
pub fn ddflow(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ddflow"))
        .args(args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn ddflow");
    // The child may exit before reading its input; a broken pipe is fine.
    let _ = child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(stdin.as_bytes());
    child.wait_with_output().expect("wait for ddflow")
}

/// Stdout parsed as one JSON value per line.
#[allow(dead_code)]
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}
