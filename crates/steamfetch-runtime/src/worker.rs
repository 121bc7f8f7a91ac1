//! Job worker: owns the SteamCMD subprocess for one download.
//!
//! Both output streams are forwarded line-by-line into a single channel by
//! dedicated reader tasks, so the worker's `select!` loop is the only place
//! that reacts to output, and cancellation is handled in the same loop
//! instead of being polled between reads. The process exit code alone
//! decides the terminal status; output markers only contribute detail.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use steamfetch_core::events::JobEvent;
use steamfetch_core::job::{JobId, JobStatus, ProgressSnapshot};

use crate::shutdown::shutdown_child;
use crate::steamcmd::SteamCmdInvocation;
use crate::steamcmd::contract::{LineEvent, parse_line};
use crate::store::JobStore;
use crate::throttle::ProgressThrottle;

/// Capacity of the line fan-in channel.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Everything the worker needs for one job.
pub(crate) struct WorkerContext {
    pub job_id: JobId,
    pub invocation: SteamCmdInvocation,
    pub transcript_path: PathBuf,
    pub cancel: CancellationToken,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LineSource {
    Stdout,
    Stderr,
}

struct SourcedLine {
    source: LineSource,
    text: String,
}

/// Run one download job to completion. Never panics; every outcome ends in
/// a terminal status on the store plus a matching event.
pub(crate) async fn run_job(
    ctx: WorkerContext,
    store: Arc<JobStore>,
    events: broadcast::Sender<JobEvent>,
) {
    let WorkerContext {
        job_id,
        invocation,
        transcript_path,
        cancel,
    } = ctx;

    let mut child = match invocation.build().spawn() {
        Ok(child) => child,
        Err(err) => {
            fail(&store, &events, &job_id, format!("failed to spawn SteamCMD: {err}"));
            return;
        }
    };

    if let Some(job) = store.mark_running(&job_id) {
        let _ = events.send(JobEvent::started(&job));
    }

    let (line_tx, mut line_rx) = mpsc::channel::<SourcedLine>(LINE_CHANNEL_CAPACITY);
    if let Some(stdout) = child.stdout.take() {
        spawn_line_forwarder(stdout, LineSource::Stdout, line_tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_forwarder(stderr, LineSource::Stderr, line_tx.clone());
    }
    // The receiver sees end-of-stream once both forwarders are done.
    drop(line_tx);

    let mut transcript = Transcript::open(&transcript_path).await;
    let mut throttle = ProgressThrottle::default();
    let started = Instant::now();
    let mut failure_detail: Option<String> = None;
    let mut last_stderr: Option<String> = None;
    let mut last_progress: Option<ProgressSnapshot> = None;

    let exit = loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                if let Err(err) = shutdown_child(&mut child).await {
                    tracing::warn!(%job_id, error = %err, "error while stopping SteamCMD");
                }
                transcript.flush().await;
                if store.finish(&job_id, JobStatus::Cancelled, None).is_some() {
                    let _ = events.send(JobEvent::cancelled(&job_id));
                }
                tracing::info!(%job_id, "download cancelled");
                return;
            }

            line = line_rx.recv() => {
                match line {
                    Some(sourced) => {
                        if sourced.text.trim().is_empty() {
                            continue;
                        }
                        if sourced.source == LineSource::Stderr {
                            last_stderr = Some(sourced.text.clone());
                        }
                        handle_line(
                            &sourced.text,
                            &job_id,
                            &store,
                            &events,
                            &mut transcript,
                            &mut throttle,
                            started,
                            &mut failure_detail,
                            &mut last_progress,
                        )
                        .await;
                    }
                    // Both streams closed; the process is finishing.
                    None => break child.wait().await,
                }
            }
        }
    };

    transcript.flush().await;

    match exit {
        Ok(status) if status.success() => {
            let total = last_progress.map_or(0, |p| p.total_bytes);
            store.set_progress(&job_id, ProgressSnapshot::finished(total));
            if let Some(job) = store.finish(&job_id, JobStatus::Succeeded, None) {
                tracing::info!(%job_id, app_id = job.app_id.get(), "download complete");
                let _ = events.send(JobEvent::completed(&job));
            }
        }
        Ok(status) => {
            let reason = failure_detail.or(last_stderr).unwrap_or_else(|| match status.code() {
                Some(code) => format!("SteamCMD exited with status {code}"),
                None => "SteamCMD was terminated by a signal".to_string(),
            });
            fail(&store, &events, &job_id, reason);
        }
        Err(err) => {
            fail(&store, &events, &job_id, format!("failed to collect SteamCMD exit status: {err}"));
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_line(
    line: &str,
    job_id: &JobId,
    store: &JobStore,
    events: &broadcast::Sender<JobEvent>,
    transcript: &mut Transcript,
    throttle: &mut ProgressThrottle,
    started: Instant,
    failure_detail: &mut Option<String>,
    last_progress: &mut Option<ProgressSnapshot>,
) {
    store.append_log(job_id, line);
    transcript.write_line(line).await;
    tracing::debug!(target: "steamfetch::steamcmd", %job_id, "{line}");

    match parse_line(line) {
        LineEvent::Progress {
            downloaded_bytes,
            total_bytes,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let speed_bps = {
                let elapsed = started.elapsed().as_secs_f64();
                if elapsed > 0.0 { downloaded_bytes as f64 / elapsed } else { 0.0 }
            };
            let snapshot = ProgressSnapshot::from_bytes(downloaded_bytes, total_bytes, speed_bps);
            *last_progress = Some(snapshot);
            store.set_progress(job_id, snapshot);
            if throttle.should_emit() {
                let _ = events.send(JobEvent::progress(job_id, snapshot));
            }
        }
        // The exit code still decides the outcome; the marker is informational.
        LineEvent::AppInstalled { app_id } => {
            tracing::debug!(%job_id, app_id, "install marker observed");
        }
        LineEvent::ErrorMarker { message } => {
            *failure_detail = Some(message);
        }
        LineEvent::LoginFailure { reason } => {
            *failure_detail = Some(reason);
        }
        LineEvent::Other => {
            let _ = events.send(JobEvent::log(job_id, line));
        }
    }
}

fn fail(store: &JobStore, events: &broadcast::Sender<JobEvent>, job_id: &JobId, reason: String) {
    tracing::warn!(%job_id, reason, "download failed");
    if store.finish(job_id, JobStatus::Failed, Some(reason.clone())).is_some() {
        let _ = events.send(JobEvent::failed(job_id, reason));
    }
}

/// Forward one output stream into the fan-in channel, line by line.
/// Invalid UTF-8 is replaced rather than dropped.
fn spawn_line_forwarder(
    stream: impl AsyncRead + Unpin + Send + 'static,
    source: LineSource,
    tx: mpsc::Sender<SourcedLine>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        loop {
            match read_trimmed_line(&mut reader).await {
                Ok(Some(text)) => {
                    if tx.send(SourcedLine { source, text }).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(error = %err, "output reader stopping");
                    break;
                }
            }
        }
    });
}

/// Read the next line without its trailing `\n`/`\r\n`. `None` at EOF.
async fn read_trimmed_line(
    reader: &mut (impl AsyncBufRead + Unpin),
) -> std::io::Result<Option<String>> {
    let mut buf = Vec::with_capacity(256);
    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Per-job transcript file. Write failures disable the transcript instead
/// of failing the job.
struct Transcript {
    file: Option<tokio::fs::File>,
}

impl Transcript {
    async fn open(path: &Path) -> Self {
        match tokio::fs::File::create(path).await {
            Ok(file) => Self { file: Some(file) },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "transcript disabled");
                Self { file: None }
            }
        }
    }

    async fn write_line(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut() {
            let write = async {
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await
            };
            if write.await.is_err() {
                self.file = None;
            }
        }
    }

    async fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn lines_are_trimmed_of_newline_styles() {
        let mut reader = BufReader::new(Cursor::new(b"plain\ncarriage\r\nlast".to_vec()));
        assert_eq!(read_trimmed_line(&mut reader).await.unwrap().as_deref(), Some("plain"));
        assert_eq!(read_trimmed_line(&mut reader).await.unwrap().as_deref(), Some("carriage"));
        assert_eq!(read_trimmed_line(&mut reader).await.unwrap().as_deref(), Some("last"));
        assert_eq!(read_trimmed_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_dropped() {
        let mut reader = BufReader::new(Cursor::new(vec![0xff, 0xfe, b'o', b'k', b'\n']));
        let line = read_trimmed_line(&mut reader).await.unwrap().unwrap();
        assert!(line.ends_with("ok"));
    }
}
