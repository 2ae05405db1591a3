use std::{
    collections::VecDeque,
    fs,
    net::TcpListener,
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::{Arc, Mutex},
    thread,
};

use anyhow::{Context, Result};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use insta_cmd::get_cargo_bin;
use serde_json::{Value, json};
use tempfile::TempDir;

mod dry_run;
mod init;

const BIN_NAME: &str = "linguasync";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Keep config discovery inside the temp project
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// A project with `locales/en`, `locales/de` and `locales/fr`.
    pub fn with_locales() -> Result<Self> {
        let test = Self::new()?;
        test.write_json(
            "locales/en/translation.json",
            &json!({"greeting": "Hello", "menu": {"save": "Save", "open": "Open"}}),
        )?;
        test.write_json(
            "locales/de/translation.json",
            &json!({"greeting": "Hallo", "menu": {"open": "Öffnen"}}),
        )?;
        test.write_json(
            "locales/fr/translation.json",
            &json!({"greeting": "Bonjour", "menu": {"save": "Enregistrer", "open": "Ouvrir"}}),
        )?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn write_json(&self, path: &str, value: &Value) -> Result<()> {
        self.write_file(path, &serde_json::to_string_pretty(value)?)
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn sync_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("sync");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn read_json(&self, path: &str) -> Result<Value> {
        Ok(serde_json::from_str(&self.read_file(path)?)?)
    }
}

pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(cmd: &mut Command) -> Result<RunOutput> {
    let Output {
        status,
        stdout,
        stderr,
    } = cmd.output().context("Failed to run linguasync")?;
    Ok(RunOutput {
        code: status.code(),
        stdout: String::from_utf8(stdout)?,
        stderr: String::from_utf8(stderr)?,
    })
}

type Replies = Arc<Mutex<VecDeque<String>>>;

/// Serve one canned chat-completions reply per request on a local port.
///
/// Returns the endpoint URL. Each entry in `replies` is the assistant message
/// content for one request, in order. Once they run out the server answers 503.
pub fn mock_completions(replies: Vec<String>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let url = format!("http://{}/v1/chat/completions", listener.local_addr()?);

    let replies: Replies = Arc::new(Mutex::new(replies.into()));
    let app = Router::new()
        .route("/v1/chat/completions", post(complete))
        .with_state(replies);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::spawn(move || {
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener)?;
            axum::serve(listener, app).await
        })
    });

    Ok(url)
}

async fn complete(
    State(replies): State<Replies>,
    Json(_request): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let content = replies
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .pop_front()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })))
}
