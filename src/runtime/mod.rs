//! Runtime abstraction for the few system operations the tool needs.
//!
//! Everything that touches the process environment or spawns a process goes
//! through [`Runtime`], so configuration loading can be tested with a mock.

mod env;
mod git;

use std::env as std_env;
use std::io;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Output of `git remote -v` in the current directory.
    fn git_remotes(&self) -> io::Result<String>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn git_remotes(&self) -> io::Result<String> {
        self.git_remotes_impl()
    }
}
