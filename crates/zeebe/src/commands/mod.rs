//! Gateway commands
//!
//! Each command is a small builder created from a [`Client`](crate::Client).
//! `send()` performs one RPC through the client's retry loop: transient
//! gateway errors are retried with backoff, fatal ones are returned as
//! [`Error::Transport`](crate::Error::Transport), and closing the client or
//! cancelling the command's token yields [`Error::Cancelled`](crate::Error::Cancelled).

mod activate_jobs;
mod complete_job;
mod deploy_resource;
mod fail_job;

pub use activate_jobs::ActivateJobsCommand;
pub use complete_job::CompleteJobCommand;
pub use deploy_resource::DeployResourceCommand;
pub use fail_job::FailJobCommand;
