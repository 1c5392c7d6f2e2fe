use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command for vaultsift with an empty config dir and no ambient API key
pub fn vaultsift(config_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("vaultsift");
    cmd.env("VAULTSIFT_CONFIG_DIR", config_dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("VAULTSIFT_LOG");
    cmd
}

/// Temporary vault populated with `(relative path, body)` pairs
pub fn vault_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp vault");
    for (name, body) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create note dir");
        }
        fs::write(path, body).expect("write note");
    }
    dir
}

/// A `generateContent` response envelope wrapping `text`
#[allow(dead_code)]
pub fn envelope(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
    .to_string()
}

/// Envelope carrying an assessment reply
#[allow(dead_code)]
pub fn assessment_envelope(score: u32, recommendation: &str) -> String {
    envelope(&format!(
        r#"```json
{{"score": {}, "reasoning": "scripted", "recommendation": "{}"}}
```"#,
        score, recommendation
    ))
}
