//! Result sink for `ftail follow`: appended bytes go to stdout, problems to stderr.

use ftail_core::{TailResult, TailState, Tailer};
use std::io::{self, Write};
use std::sync::Mutex;

struct OutputState<W> {
    out: W,
    /// Uri of the last target whose bytes were written.
    last_uri: Option<String>,
}

/// Writes fetched bytes in arrival order. With `headers` on, a
/// `==> uri <==` line is written whenever output switches to another target.
///
/// Unchanged polls and failed attempts (which only arrive with
/// `--always-callback`) are reported one line each on the diagnostics stream.
pub struct Output<W> {
    headers: bool,
    state: Mutex<OutputState<W>>,
    diag: Mutex<Box<dyn Write + Send>>,
}

impl Output<io::Stdout> {
    pub fn stdout(headers: bool) -> Self {
        Self::new(io::stdout(), headers)
    }
}

impl<W: Write> Output<W> {
    pub fn new(out: W, headers: bool) -> Self {
        Self {
            headers,
            state: Mutex::new(OutputState {
                out,
                last_uri: None,
            }),
            diag: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Send diagnostic lines somewhere other than stderr.
    pub fn with_diagnostics(mut self, diag: impl Write + Send + 'static) -> Self {
        self.diag = Mutex::new(Box::new(diag));
        self
    }

    /// Handle one tail result. A failed write (e.g. closed pipe) stops the tailer.
    pub fn on_result(&self, result: &TailResult, tailer: &Tailer) {
        let uri = tailer.uri().as_str();
        match result.state() {
            TailState::Success => {
                if let Err(e) = self.write_chunk(uri, result.body()) {
                    tracing::warn!(uri, "stdout write failed, stopping: {}", e);
                    tailer.set_still_following(false);
                }
            }
            TailState::NoChange => {
                tracing::debug!(uri, offset = tailer.offset(), "no change");
                self.diagnose(format_args!(
                    "ftail: {}: no change at {} bytes",
                    uri,
                    tailer.offset()
                ));
            }
            TailState::Error => {
                let detail = result
                    .error_detail()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                self.diagnose(format_args!(
                    "ftail: {}: {} failed (attempt {}/{}): {}",
                    uri,
                    result.method(),
                    tailer.retries_so_far(),
                    tailer.max_retries(),
                    detail
                ));
            }
        }
    }

    fn diagnose(&self, line: std::fmt::Arguments<'_>) {
        if let Ok(mut diag) = self.diag.lock() {
            let _ = writeln!(diag, "{}", line);
        }
    }

    fn write_chunk(&self, uri: &str, body: &[u8]) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output lock poisoned"))?;
        if self.headers && state.last_uri.as_deref() != Some(uri) {
            let sep = if state.last_uri.is_some() { "\n" } else { "" };
            writeln!(state.out, "{}==> {} <==", sep, uri)?;
            state.last_uri = Some(uri.to_string());
        }
        state.out.write_all(body)?;
        state.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(s) => s.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }
}
