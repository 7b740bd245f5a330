//! Application services and ports.

#![forbid(unsafe_code)]

mod command_context;
mod job_definition_state_service;
mod job_ports;
mod job_state_service;
mod operation_log_ports;
mod operation_log_producer;
mod operation_log_service;
mod suspension_transition;
mod timer_service;

#[cfg(test)]
mod test_support;

pub use command_context::{CommandContext, EngineSettings};
pub use job_definition_state_service::{JobDefinitionStateService, SetJobDefinitionStateInput};
pub use job_ports::{
    JobDefinitionRepository, JobRepository, JobStateCommand, ProcessInstanceRepository,
    TimerJobHandler,
};
pub use job_state_service::JobStateService;
pub use operation_log_ports::{
    OperationLogDeleteScope, OperationLogEventHandler, OperationLogEventProducer,
    OperationLogQuery, OperationLogRepository,
};
pub use operation_log_producer::DefaultOperationLogEventProducer;
pub use operation_log_service::OperationLogService;
pub use suspension_transition::{JobDefinitionStateTransition, JobStateTransition};
pub use timer_service::{
    DEFAULT_TIMER_RETRY_WAIT_SECONDS, JobDefinitionSuspensionTimerHandler, TimerExecutionReport,
    TimerFailure, TimerJobExecutor,
};
