use thiserror::Error;

use wc_core::JobId;

use crate::JobState;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("job {0} already on the board")]
    DuplicateJob(JobId),

    #[error("job {job}: illegal transition {from} -> {to}")]
    InvalidTransition { job: JobId, from: JobState, to: JobState },

    #[error("invalid job {job}: {reason}")]
    InvalidJob { job: JobId, reason: String },

    #[error("job parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type JobResult<T> = Result<T, JobError>;
