mod format;
mod scheduler;
mod state;
mod time;

pub use format::{format_remaining, OVERDUE_LABEL};
pub use scheduler::{AlarmSnapshot, AlarmStatus, SchedulerContext};
pub use state::{AlarmPhase, AlarmState, Evaluation, GRACE_MS};
pub use time::AlarmTime;
