//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod engine_seed;
mod in_memory_job_definition_repository;
mod in_memory_job_repository;
mod in_memory_operation_log;
mod in_memory_process_instance_repository;

pub use engine_seed::{EngineSeed, EngineSeedSummary};
pub use in_memory_job_definition_repository::InMemoryJobDefinitionRepository;
pub use in_memory_job_repository::InMemoryJobRepository;
pub use in_memory_operation_log::InMemoryOperationLog;
pub use in_memory_process_instance_repository::InMemoryProcessInstanceRepository;
