use crate::Error;

use std::{process::Stdio, time::Duration};

use tokio::{
	process::Command,
	time::{sleep, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// Output of a subprocess that exited successfully
#[derive(Debug)]
pub struct ProcessOutput {
	pub stdout: Vec<u8>,
	pub stderr: Vec<u8>,
	pub elapsed: Duration,
}

/// Runs `cmd` to completion, unless `timeout` elapses or `cancel` fires first.
///
/// The child is spawned with `kill_on_drop`, so giving up on it (timeout, cancellation or
/// the caller dropping this future) kills the process instead of leaving it running.
pub async fn run_with_deadline(
	cmd: &mut Command,
	timeout: Duration,
	cancel: &CancellationToken,
) -> Result<ProcessOutput, Error> {
	if cancel.is_cancelled() {
		return Err(Error::Canceled);
	}

	let program = cmd.as_std().get_program().to_owned();

	let child = cmd
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()
		.map_err(|source| Error::Spawn {
			program: program.clone().into(),
			source,
		})?;

	let start = Instant::now();

	let output = tokio::select! {
		biased;

		() = cancel.cancelled() => {
			trace!(?program, "Transcoder canceled, killing it");
			return Err(Error::Canceled);
		}

		() = sleep(timeout) => {
			warn!(?program, ?timeout, "Transcoder timed out, killing it");
			return Err(Error::Timeout(timeout));
		}

		output = child.wait_with_output() => output.map_err(Error::Wait)?,
	};

	if !output.status.success() {
		return Err(Error::ExitStatus {
			status: output.status,
			stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
		});
	}

	Ok(ProcessOutput {
		stdout: output.stdout,
		stderr: output.stderr,
		elapsed: start.elapsed(),
	})
}
