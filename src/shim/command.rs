use std::ffi::OsStr;
use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
}

/// Run `program` with `args`, blocking until it exits.
///
/// A non-zero exit becomes `Error::ToolFailed` carrying the captured stderr.
/// With `timeout` set the child is killed once it runs past the deadline.
pub fn run_tool<I, S>(program: &str, args: I, timeout: Option<Duration>) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let printable: Vec<String> = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect();
    debug!("running {program} {printable:?}");

    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = match timeout {
        None => child.wait_with_output(),
        Some(limit) => wait_with_deadline(child, program, limit)?,
    }
    .map_err(|source| Error::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            program: program.to_string(),
            args: printable,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut p) = pipe {
            // A read error leaves whatever was captured so far.
            let _ = p.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_with_deadline(
    mut child: Child,
    program: &str,
    limit: Duration,
) -> Result<std::io::Result<Output>> {
    // Pipes are drained on their own threads so a chatty child cannot block on a full pipe.
    let out = drain(child.stdout.take());
    let err = drain(child.stderr.take());
    let deadline = Instant::now() + limit;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::ToolTimeout {
                    program: program.to_string(),
                    secs: limit.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Ok(Err(e)),
        }
    };

    Ok(Ok(Output {
        status,
        stdout: out.join().unwrap_or_default(),
        stderr: err.join().unwrap_or_default(),
    }))
}
