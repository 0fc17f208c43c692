// SPDX-License-Identifier: GPL-3.0-or-later

//! Invocation and parsing of the external `lsb_release` command.
//!
//! `lsb_release -a` emits `Key: value` lines. The command is legacy
//! and frequently absent, so "not installed" must look exactly like an
//! empty source, while an installed-but-broken command is surfaced as
//! a hard error.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use super::AttrMap;

/// Outcome of running `lsb_release -a`.
///
/// The exit-code conventions become explicit variants instead of
/// control flow: code 0 is [`Success`](CommandOutcome::Success), code
/// 127 and a failed spawn are [`NotFound`](CommandOutcome::NotFound),
/// expiry of the deadline is [`TimedOut`](CommandOutcome::TimedOut),
/// and any other exit is [`Failed`](CommandOutcome::Failed).
#[derive(Debug)]
pub enum CommandOutcome {
    Success(String),
    NotFound,
    TimedOut,
    Failed { code: i32, stderr: String },
}

/// Run `lsb_release -a` and parse its output.
///
/// `NotFound` and `TimedOut` silently yield an empty mapping; a
/// command that exists but fails is a hard error, since that plausibly
/// indicates a broken environment rather than absence of the feature.
pub fn load(timeout: Duration) -> Result<AttrMap> {
    resolve_outcome(run_lsb_release(timeout)?)
}

fn resolve_outcome(outcome: CommandOutcome) -> Result<AttrMap> {
    match outcome {
        CommandOutcome::Success(stdout) => Ok(parse_content(&stdout)),
        CommandOutcome::NotFound | CommandOutcome::TimedOut => Ok(AttrMap::new()),
        CommandOutcome::Failed { code, stderr } => {
            bail!("lsb_release -a exited with status {code}: {}", stderr.trim())
        }
    }
}

/// Execute `lsb_release -a` with a kill-on-deadline timeout.
///
/// The child is polled rather than waited on so a hung command cannot
/// block the probe forever; at the deadline it is killed and reported
/// as [`CommandOutcome::TimedOut`]. Output is read only after exit,
/// which is safe because lsb_release output is far below pipe
/// capacity.
pub fn run_lsb_release(timeout: Duration) -> Result<CommandOutcome> {
    let mut child = match Command::new("lsb_release")
        .arg("-a")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(CommandOutcome::NotFound);
        }
        Err(e) => return Err(e).context("failed to spawn lsb_release"),
    };

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().context("failed to wait for lsb_release")? {
            Some(status) => break status,
            None => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(CommandOutcome::TimedOut);
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    };

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout)
            .context("lsb_release output is not valid UTF-8")?;
    }
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr)
            .context("lsb_release error output is not valid UTF-8")?;
    }

    match status.code() {
        Some(0) => Ok(CommandOutcome::Success(stdout)),
        // 127 is the shell convention for "command not found".
        Some(127) => Ok(CommandOutcome::NotFound),
        Some(code) => Ok(CommandOutcome::Failed { code, stderr }),
        None => Ok(CommandOutcome::Failed { code: -1, stderr }),
    }
}

/// Parse `Key: value` lines from lsb_release output.
///
/// Each line is split on the first colon only; lines without a colon
/// are skipped. Keys are trimmed, internal blanks become underscores,
/// and the result is lower-cased. Values are trimmed only.
pub fn parse_content(content: &str) -> AttrMap {
    let mut props = AttrMap::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().replace(' ', "_").to_lowercase();
        props.insert(key, value.trim().to_string());
    }
    props
}
