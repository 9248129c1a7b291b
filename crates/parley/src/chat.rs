// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley chat` command implementation.
//!
//! Runs a [`ChatSession`] against the in-process collaborators with a
//! terminal front end. Input is read with rustyline on a dedicated thread
//! and handed to the session one line at a time; each prompt starts with
//! whatever input the last submission left behind. The terminal is
//! append-only, so each rebuilt frame is kept in memory and only entries not
//! yet on screen are printed.

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use colored::Colorize;
use parley_config::ParleyConfig;
use parley_core::{
    AdapterType, HealthStatus, MessageId, Origin, ParleyError, PluginAdapter, PresentationAdapter,
    RenderedEntry, SubmitEvent,
};
use parley_loopback::{LoopbackIdentity, LoopbackStore};
use parley_sync::{CONNECT_ERROR_STATUS, ChatSession, install_signal_handler};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lines that end the session instead of being sent.
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Runs the `parley chat` session until the user quits or a signal arrives.
pub async fn run_chat(config: ParleyConfig) -> Result<(), ParleyError> {
    println!("{}", "parley".bold().green());
    println!("Type {} to leave.\n", "/quit".yellow());

    let reader = spawn_line_reader(format!("{}> ", "parley".green()))?;
    let presentation = Arc::new(TerminalPresentation::new(reader, std::io::stdout()));

    let store = match LoopbackStore::for_backend(&config.backend) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            presentation.set_status(Some(CONNECT_ERROR_STATUS));
            return Err(e);
        }
    };
    let identity = Arc::new(LoopbackIdentity::new());

    let session = ChatSession::new(&config, store, identity, presentation);
    info!(path = %session.collection_path(), "starting chat session");

    let cancel = install_signal_handler();
    let result = session.run(cancel.clone()).await;
    cancel.cancel();

    let report = result?;
    info!(
        sent = report.sent,
        send_failures = report.send_failures,
        snapshots = report.subscription.snapshots,
        "chat session closed"
    );
    Ok(())
}

/// Channels to the input thread.
///
/// Each string sent on `requests` asks for one line and pre-fills the prompt
/// with it. Lines come back on `lines`.
pub struct LineReader {
    requests: mpsc::UnboundedSender<String>,
    lines: mpsc::UnboundedReceiver<String>,
}

/// Reads lines on a dedicated thread until EOF, Ctrl+C, or either channel closes.
///
/// A plain thread is used instead of `spawn_blocking` so a pending read does
/// not hold up runtime shutdown.
fn spawn_line_reader(prompt: String) -> Result<LineReader, ParleyError> {
    let (tx, lines) = mpsc::unbounded_channel();
    let (requests, mut pending) = mpsc::unbounded_channel::<String>();

    std::thread::Builder::new()
        .name("parley-input".into())
        .spawn(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => editor,
                Err(e) => {
                    warn!(error = %e, "failed to initialize readline");
                    return;
                }
            };
            while let Some(initial) = pending.blocking_recv() {
                match editor.readline_with_initial(&prompt, (initial.as_str(), "")) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            let _ = editor.add_history_entry(&line);
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        warn!(error = %e, "input error, closing chat");
                        break;
                    }
                }
            }
            debug!("input thread finished");
        })
        .map_err(|e| ParleyError::Internal(format!("failed to spawn input thread: {e}")))?;

    Ok(LineReader { requests, lines })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Terminal rendering of the chat.
pub struct TerminalPresentation<W> {
    reader: tokio::sync::Mutex<LineReader>,
    input: Mutex<String>,
    frame: Mutex<Vec<RenderedEntry>>,
    printed: Mutex<HashSet<MessageId>>,
    out: Mutex<W>,
}

impl<W: Write + Send + 'static> TerminalPresentation<W> {
    pub fn new(reader: LineReader, out: W) -> Self {
        Self {
            reader: tokio::sync::Mutex::new(reader),
            input: Mutex::new(String::new()),
            frame: Mutex::new(Vec::new()),
            printed: Mutex::new(HashSet::new()),
            out: Mutex::new(out),
        }
    }

    fn emit(&self, line: &str) {
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

fn format_entry(entry: &RenderedEntry) -> String {
    let label = format!("{}:", entry.label);
    let label = match entry.origin {
        Origin::Mine => label.green().bold(),
        Origin::Theirs => label.cyan().bold(),
    };
    format!("{label} {}", entry.text)
}

#[async_trait]
impl<W: Write + Send + 'static> PluginAdapter for TerminalPresentation<W> {
    fn name(&self) -> &str {
        "terminal"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Presentation
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        lock(&self.out)
            .flush()
            .map_err(|e| ParleyError::Internal(format!("failed to flush terminal: {e}")))
    }
}

#[async_trait]
impl<W: Write + Send + 'static> PresentationAdapter for TerminalPresentation<W> {
    async fn next_submit(&self) -> Option<SubmitEvent> {
        // A failed send leaves its text in the input; offer it again.
        let kept = lock(&self.input).clone();
        let initial = if kept.trim().is_empty() { String::new() } else { kept };

        let mut reader = self.reader.lock().await;
        if reader.requests.send(initial).is_err() {
            debug!("input thread has exited");
        }
        let line = reader.lines.recv().await?;
        if QUIT_COMMANDS.contains(&line.trim()) {
            return None;
        }
        *lock(&self.input) = line;
        Some(SubmitEvent)
    }

    fn input_value(&self) -> String {
        lock(&self.input).clone()
    }

    fn clear_input(&self) {
        lock(&self.input).clear();
    }

    fn clear_messages(&self) {
        lock(&self.frame).clear();
    }

    fn append_message(&self, entry: &RenderedEntry) {
        lock(&self.frame).push(entry.clone());
    }

    fn scroll_to_latest(&self) {
        let frame = lock(&self.frame).clone();
        let fresh: Vec<RenderedEntry> = {
            let mut printed = lock(&self.printed);
            frame
                .into_iter()
                .filter(|entry| printed.insert(entry.id.clone()))
                .collect()
        };
        for entry in &fresh {
            self.emit(&format_entry(entry));
        }
    }

    fn set_status(&self, status: Option<&str>) {
        if let Some(status) = status {
            self.emit(&status.yellow().dimmed().to_string());
        }
    }

    fn set_identity_label(&self, label: &str) {
        self.emit(&label.bold().to_string());
    }
}
