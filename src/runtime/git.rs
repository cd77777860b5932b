//! Git remote discovery.

use std::io;
use std::process::Command;

use log::debug;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn git_remotes_impl(&self) -> io::Result<String> {
        let output = Command::new("git").args(["remote", "-v"]).output()?;

        if !output.status.success() {
            debug!(
                "git remote -v failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(io::Error::other("git remote -v exited with an error"));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
