mod pipeline;
mod repository;

pub use pipeline::{OperationLogEventHandler, OperationLogEventProducer};
pub use repository::{OperationLogDeleteScope, OperationLogQuery, OperationLogRepository};
