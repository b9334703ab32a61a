use std::time::Duration;

use crate::{Generation, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit code to the execution server.
    StartRun { generation: Generation, code: String },
    /// Poll the job once `delay` has elapsed.
    SchedulePoll {
        generation: Generation,
        job_id: JobId,
        delay: Duration,
    },
    /// Drop pending timers and requests belonging to a superseded run.
    CancelRun { generation: Generation },
    /// Offer the editor contents as a download.
    SaveFile { filename: String, contents: String },
    Navigate { path: String },
}
