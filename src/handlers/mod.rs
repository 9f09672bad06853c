//! Event handlers of the charm, split by the external system they drive

mod actions;
pub(crate) mod object_storage;
mod workload;
