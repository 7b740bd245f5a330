//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod job;
mod operation_log;
mod runtime;
mod selection;
mod suspension;
mod timer;

pub use audit::{
    AuditLogContext, AuditSelection, EntityType, OperationType, PropertyChange, RETRIES_PROPERTY,
    SUSPENSION_STATE_PROPERTY,
};
pub use job::{
    DEFAULT_JOB_RETRIES, Job, JobDefinition, JobDefinitionInput, START_TIMER_HANDLER_TYPE,
};
pub use operation_log::{AuditingLevel, OperationLogEntry};
pub use runtime::{ProcessInstanceRecord, TaskRecord};
pub use selection::{JobDefinitionSelection, JobDefinitionSelector, JobSelection, JobSelector};
pub use suspension::SuspensionState;
pub use timer::{DeferredActionDescriptor, JobDefinitionSuspensionConfiguration, TimerHandlerType};
