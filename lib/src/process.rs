//! Process module.
//!
//! This module runs the shell commands found in configuration files,
//! for example the command printing an account password.

use log::{debug, trace};
use std::{
    io,
    process::{Command, Output},
    string,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("cannot spawn shell for command {1:?}")]
    SpawnCmdError(#[source] io::Error, String),
    #[error("command {0:?} exited with status {1}: {2}")]
    CmdStatusError(String, i32, String),
    #[error("cannot decode output of command {1:?} as utf-8")]
    ParseCmdOutputError(#[source] string::FromUtf8Error, String),
}

fn spawn(cmd: &str) -> io::Result<Output> {
    if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", cmd]).output()
    } else {
        Command::new("sh").arg("-c").arg(cmd).output()
    }
}

/// Runs the given command through the system shell and returns its
/// standard output. A non-zero exit status is an error carrying the
/// standard error output.
pub fn run(cmd: &str) -> Result<String, ProcessError> {
    debug!("run shell command {:?}", cmd);

    let output = spawn(cmd).map_err(|err| ProcessError::SpawnCmdError(err, cmd.to_owned()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let code = output.status.code().unwrap_or(-1);
        return Err(ProcessError::CmdStatusError(cmd.to_owned(), code, stderr));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|err| ProcessError::ParseCmdOutputError(err, cmd.to_owned()))?;
    trace!("command printed {} bytes", stdout.len());

    Ok(stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn it_should_capture_stdout() {
        assert_eq!("hello\n", run("echo hello").unwrap());
    }

    #[test]
    fn it_should_fail_on_non_zero_status() {
        match run("echo oops >&2; exit 3") {
            Err(ProcessError::CmdStatusError(_, code, stderr)) => {
                assert_eq!(3, code);
                assert_eq!("oops", stderr);
            }
            res => panic!("unexpected result {:?}", res),
        }
    }
}
