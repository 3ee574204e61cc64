//! Child processes for the system media tools (`ffmpeg`, `ffprobe`, `ffplay`).
//!
//! Helpers return plain `io::Result`; callers map failures into their own error kind.
#![cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]

use std::{
    io::{self, Read as _, Write as _},
    process::{Child, ChildStdin, Command, ExitStatus, Output, Stdio},
    thread::JoinHandle,
};

/// Return `true` when `tool` can be invoked from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `cmd` to completion with `input` on stdin, collecting stdout and stderr.
pub(crate) fn run_with_stdin(mut cmd: Command, input: &[u8]) -> io::Result<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("child stdin was not piped"))?;

    std::thread::scope(|s| {
        s.spawn(move || {
            // The tool may stop reading early; a broken pipe is expected then.
            let _ = stdin.write_all(input);
        });
        child.wait_with_output()
    })
}

/// A long-running tool fed through stdin, with stderr collected on a background thread.
///
/// Dropping a child that was never reaped kills it.
#[derive(Debug)]
pub(crate) struct PipedChild {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    reaped: bool,
}

impl PipedChild {
    pub(crate) fn spawn(mut cmd: Command) -> io::Result<Self> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                // Only diagnostics are lost if this fails.
                let _ = pipe.read_to_end(&mut bytes);
                bytes
            })
        });

        Ok(Self {
            program,
            child,
            stdin,
            stderr,
            reaped: false,
        })
    }

    /// Hand stdin to another owner, e.g. a feeder thread.
    pub(crate) fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    pub(crate) fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.write_all(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} stdin is closed", self.program),
            )),
        }
    }

    pub(crate) fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        self.reaped |= status.is_some();
        Ok(status)
    }

    /// Close stdin and wait for the tool to exit. A failed exit carries the tool's stderr.
    pub(crate) fn finish(mut self) -> io::Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        self.reaped = true;
        let stderr = self.collect_stderr();
        if status.success() {
            return Ok(());
        }
        Err(io::Error::other(format!(
            "{} exited with {status}: {}",
            self.program,
            String::from_utf8_lossy(&stderr).trim()
        )))
    }

    /// Stop the tool now and reap it.
    pub(crate) fn kill(mut self) {
        self.terminate();
    }

    fn terminate(&mut self) {
        drop(self.stdin.take());
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
        self.collect_stderr();
    }

    fn collect_stderr(&mut self) -> Vec<u8> {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for PipedChild {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "../tests/unit/process.rs"]
mod tests;
