use super::extension::{Action, Extension, sort_extensions};
use super::planner::{Invocation, plan_chain};
use super::results::{StageResult, aggregate};
use super::tee::{TeeSummary, tee_copy};
use crate::config::constants::{COPY_BUFFER_SIZE, TEMP_FILE_PREFIX};
use crate::error::{PipelineError, PipelineResult};
use crate::util::hash::Fingerprint;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for the process chain executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Directory for the output temp file; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Working directory for extension processes.
    pub working_dir: Option<PathBuf>,
    /// Chunk size used when teeing streams.
    pub buffer_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            working_dir: None,
            buffer_size: COPY_BUFFER_SIZE,
        }
    }
}

/// One clean or smudge run over a byte stream
pub struct PipelineRequest<R> {
    pub action: Action,
    pub input: R,
    pub file_name: String,
    /// Extensions in stage order
    pub extensions: Vec<Extension>,
}

impl<R> PipelineRequest<R> {
    pub fn new(
        action: Action,
        input: R,
        file_name: impl Into<String>,
        extensions: Vec<Extension>,
    ) -> Self {
        Self {
            action,
            input,
            file_name: file_name.into(),
            extensions,
        }
    }
}

/// Transformed content and the fingerprint chain that produced it
#[derive(Debug)]
pub struct PipelineResponse {
    /// Fully written and flushed output of the last stage
    pub output: NamedTempFile,
    /// One entry per stage, in pipeline order
    pub results: Vec<StageResult>,
}

impl PipelineResponse {
    /// Fingerprint of the content the pipeline was fed
    pub fn input_fingerprint(&self) -> Option<&Fingerprint> {
        self.results.first().map(|r| &r.input_fingerprint)
    }

    /// Fingerprint of the content the pipeline produced
    pub fn output_fingerprint(&self) -> Option<&Fingerprint> {
        self.results.last().map(|r| &r.output_fingerprint)
    }
}

/// A spawned extension process and the tasks draining its output pipes
struct Stage {
    name: String,
    child: Child,
    tee: Option<JoinHandle<io::Result<TeeSummary>>>,
    stderr: Option<JoinHandle<Vec<u8>>>,
}

impl Stage {
    /// Wait for the tee task, which closes the downstream writer at EOF
    async fn join_tee(&mut self) -> io::Result<TeeSummary> {
        let handle = self
            .tee
            .take()
            .ok_or_else(|| io::Error::other(format!("no output tee for '{}'", self.name)))?;
        handle.await.map_err(io::Error::other)?
    }

    /// Whether the output tee already stopped because the next stage closed
    /// its stdin. A tee still running is left alone.
    async fn tee_broke_pipe(&mut self) -> bool {
        match self.tee.take_if(|handle| handle.is_finished()) {
            Some(handle) => matches!(
                handle.await,
                Ok(Err(ref e)) if e.kind() == io::ErrorKind::BrokenPipe
            ),
            None => false,
        }
    }

    async fn collect_stderr(&mut self) -> String {
        match self.stderr.take() {
            Some(handle) => match handle.await {
                Ok(buf) => String::from_utf8_lossy(&buf).trim().to_string(),
                Err(e) => {
                    debug!("Lost stderr of extension '{}': {}", self.name, e);
                    String::new()
                }
            },
            None => String::new(),
        }
    }

    fn abort_tasks(&mut self) {
        if let Some(handle) = self.tee.take() {
            handle.abort();
        }
        if let Some(handle) = self.stderr.take() {
            handle.abort();
        }
    }
}

/// Runs a chain of extensions as connected OS processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessChainExecutor {
    config: ExecutorConfig,
}

impl ProcessChainExecutor {
    /// Creates an executor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Sort `extensions` by priority and run them over `input`.
    pub async fn run_sorted<'a, R, I>(
        &self,
        action: Action,
        input: R,
        file_name: &str,
        extensions: I,
    ) -> PipelineResult<PipelineResponse>
    where
        R: AsyncRead + Unpin,
        I: IntoIterator<Item = (&'a String, &'a Extension)>,
    {
        let extensions = sort_extensions(extensions)?;
        self.run(PipelineRequest::new(action, input, file_name, extensions))
            .await
    }

    /// Stream the request input through every extension in order.
    ///
    /// Stage `i`'s stdout is teed into its own hasher and into stage `i + 1`'s
    /// stdin, the last stage into the output temp file. The caller's input is
    /// teed into the overall input hasher on its way into stage 0. Stages are
    /// awaited in pipeline order; any failure kills the remaining processes.
    /// A stage that died writing into a closed pipe is only blamed when no
    /// stage after it failed.
    pub async fn run<R>(&self, request: PipelineRequest<R>) -> PipelineResult<PipelineResponse>
    where
        R: AsyncRead + Unpin,
    {
        let PipelineRequest {
            action,
            mut input,
            file_name,
            extensions,
        } = request;

        let invocations = plan_chain(action, &file_name, &extensions)?;
        if invocations.is_empty() {
            return Err(PipelineError::configuration_error("no extensions to run"));
        }

        info!(
            "Running {} pipeline for '{}' through {} extension(s)",
            action,
            file_name,
            invocations.len()
        );

        let output = self.create_output()?;
        let output_file = output.reopen().map_err(|e| {
            PipelineError::wiring_error(format!(
                "failed to open output file '{}': {}",
                output.path().display(),
                e
            ))
        })?;
        let output_file = tokio::fs::File::from_std(output_file);

        let mut stages = self.spawn_all(&invocations).await?;
        let mut stdin = match self.wire(&mut stages, output_file) {
            Ok(stdin) => stdin,
            Err(e) => {
                terminate(&mut stages).await;
                return Err(e);
            }
        };

        // A failed write into stage 0 usually means stage 0 died; report the
        // stage failure over the broken pipe when there is one.
        let copied = tee_copy(&mut input, &mut stdin, self.config.buffer_size).await;
        drop(stdin);
        if let Err(e) = &copied {
            debug!("Input copy into '{}' stopped: {}", stages[0].name, e);
        }

        let mut outputs = Vec::with_capacity(stages.len());
        let mut stream_error = None;
        // First failure caused by a reader going away downstream. Reported
        // only when no downstream stage failed on its own.
        let mut upstream_failure = None;

        for index in 0..stages.len() {
            let (failure, lost_reader) = match stages[index].child.wait().await {
                Ok(status) if status.success() => (None, false),
                Ok(status) => (Some(status.to_string()), killed_by_sigpipe(&status)),
                Err(e) => (Some(format!("failed to wait: {}", e)), false),
            };

            if let Some(reason) = failure {
                let stage_count = stages.len();
                let stage = &mut stages[index];
                let lost_reader = lost_reader || stage.tee_broke_pipe().await;
                let stderr = stage.collect_stderr().await;
                let error = PipelineError::extension_failure(
                    stage.name.clone(),
                    failure_message(&stderr, &reason),
                );

                if lost_reader && index + 1 < stage_count {
                    debug!(
                        "Extension '{}' lost its reader; checking downstream stages",
                        stage.name
                    );
                    upstream_failure.get_or_insert(error);
                    continue;
                }

                terminate(&mut stages).await;
                return Err(error);
            }

            if upstream_failure.is_some() {
                stages[index].abort_tasks();
                continue;
            }

            let stage = &mut stages[index];
            let tee = stage.join_tee().await;
            let stderr = stage.collect_stderr().await;
            if !stderr.is_empty() {
                debug!("Extension '{}' stderr: {}", stage.name, stderr);
            }

            match tee {
                Ok(summary) => {
                    debug!(
                        "Extension '{}' exited cleanly after writing {} bytes",
                        stage.name, summary.bytes
                    );
                    outputs.push((stage.name.clone(), summary.fingerprint));
                }
                Err(e) => {
                    debug!("Output of extension '{}' broke off: {}", stage.name, e);
                    stream_error.get_or_insert(e);
                }
            }
        }

        if let Some(error) = upstream_failure {
            terminate(&mut stages).await;
            return Err(error);
        }

        let input_summary = copied?;
        if let Some(e) = stream_error {
            return Err(e.into());
        }

        let results = aggregate(input_summary.fingerprint, outputs);
        info!(
            "{} pipeline for '{}' finished: {} bytes in",
            action, file_name, input_summary.bytes
        );

        Ok(PipelineResponse { output, results })
    }

    fn create_output(&self) -> PipelineResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_FILE_PREFIX);
        let file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(|e| PipelineError::wiring_error(format!("failed to create output file: {}", e)))
    }

    async fn spawn_all(&self, invocations: &[Invocation]) -> PipelineResult<Vec<Stage>> {
        let mut stages = Vec::with_capacity(invocations.len());

        for invocation in invocations {
            let mut cmd = Command::new(&invocation.program);
            cmd.args(&invocation.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(ref cwd) = self.config.working_dir {
                cmd.current_dir(cwd);
            }

            match cmd.spawn() {
                Ok(child) => {
                    debug!(
                        "Spawned extension '{}' ({}) pid {:?}",
                        invocation.name,
                        invocation.program,
                        child.id()
                    );
                    stages.push(Stage {
                        name: invocation.name.clone(),
                        child,
                        tee: None,
                        stderr: None,
                    });
                }
                Err(e) => {
                    terminate(&mut stages).await;
                    return Err(PipelineError::extension_failure(
                        &invocation.name,
                        format!("failed to start '{}': {}", invocation.program, e),
                    ));
                }
            }
        }

        Ok(stages)
    }

    /// Take every pipe end, then start the tee and stderr tasks.
    ///
    /// Returns stage 0's stdin, which the caller feeds.
    fn wire(
        &self,
        stages: &mut [Stage],
        output: tokio::fs::File,
    ) -> PipelineResult<ChildStdin> {
        let missing = |name: &str, pipe: &str| {
            PipelineError::wiring_error(format!("no {} pipe for extension '{}'", pipe, name))
        };

        let mut sinks: Vec<Box<dyn AsyncWrite + Send + Unpin>> = Vec::with_capacity(stages.len());
        let mut first_stdin = None;
        for (index, stage) in stages.iter_mut().enumerate() {
            let stdin = stage
                .child
                .stdin
                .take()
                .ok_or_else(|| missing(&stage.name, "stdin"))?;
            if index == 0 {
                first_stdin = Some(stdin);
            } else {
                sinks.push(Box::new(stdin));
            }
        }
        sinks.push(Box::new(output));

        let mut sources = Vec::with_capacity(stages.len());
        for stage in stages.iter_mut() {
            let stdout = stage
                .child
                .stdout
                .take()
                .ok_or_else(|| missing(&stage.name, "stdout"))?;
            let stderr = stage
                .child
                .stderr
                .take()
                .ok_or_else(|| missing(&stage.name, "stderr"))?;
            sources.push((stdout, stderr));
        }

        let first_stdin = first_stdin.ok_or_else(|| PipelineError::wiring_error("empty chain"))?;

        // Topology resolved; start moving bytes.
        let buffer_size = self.config.buffer_size;
        for (stage, ((mut stdout, mut stderr), mut sink)) in
            stages.iter_mut().zip(sources.into_iter().zip(sinks))
        {
            stage.tee = Some(tokio::spawn(async move {
                tee_copy(&mut stdout, &mut sink, buffer_size).await
            }));
            stage.stderr = Some(tokio::spawn(async move {
                let mut buf = Vec::new();
                if let Err(e) = stderr.read_to_end(&mut buf).await {
                    debug!("Stopped reading extension stderr: {}", e);
                }
                buf
            }));
        }

        Ok(first_stdin)
    }
}

/// Kill and reap every stage that is still running.
async fn terminate(stages: &mut [Stage]) {
    for stage in stages.iter_mut() {
        if let Ok(None) = stage.child.try_wait() {
            warn!("Terminating extension '{}'", stage.name);
            if let Err(e) = stage.child.start_kill() {
                debug!("Failed to kill extension '{}': {}", stage.name, e);
            }
            if let Err(e) = stage.child.wait().await {
                debug!("Failed to reap extension '{}': {}", stage.name, e);
            }
        }
        stage.abort_tasks();
    }
}

#[cfg(unix)]
fn killed_by_sigpipe(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGPIPE: i32 = 13;
    status.signal() == Some(SIGPIPE)
}

#[cfg(not(unix))]
fn killed_by_sigpipe(_status: &ExitStatus) -> bool {
    false
}

fn failure_message(stderr: &str, reason: &str) -> String {
    if stderr.is_empty() {
        format!("no diagnostic output ({})", reason)
    } else {
        format!("{} ({})", stderr, reason)
    }
}
