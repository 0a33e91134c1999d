pub mod error;
pub mod extract;
pub mod node;
pub mod request;

pub use error::{error_response, ErrorDetail, ErrorResponse};
pub use extract::ValidatedJson;
pub use node::{
    liveness_cutoff, HardwareInfo, HostInfo, LimitsInfo, ModelInfo, NetworkInfo, NodeRecord,
    NodeStatus, LIVENESS_WINDOW_SECS,
};
pub use request::{IntakeRecord, Message, QueuedRequest};
