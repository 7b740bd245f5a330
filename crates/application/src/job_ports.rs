mod command;
mod repository;

pub use command::{JobStateCommand, TimerJobHandler};
pub use repository::{JobDefinitionRepository, JobRepository, ProcessInstanceRepository};
