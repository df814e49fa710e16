mod controller;
mod types;

pub use controller::DataSyncController;
pub use types::{
    CyclePayload, CycleReport, CycleTicket, EndpointFailure, FailureReason, SyncOutcome,
};

#[cfg(test)]
pub(crate) use controller::tests as fixtures;
