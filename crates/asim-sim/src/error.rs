use thiserror::Error;

use asim_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),
}

pub type SimResult<T> = Result<T, SimError>;
