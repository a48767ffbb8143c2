//! # Dummy Services
//!
//! Two ways of serving the same [`DummyController`](crate::controller::DummyController):
//!
//! - [`dummy_service`] registers every action by hand, each with a structural validator
//! - [`dummy_commandable_service`] registers the controller's commands as they are
//!
//! Both look the controller up in the references during `set_references`.

pub mod dummy_commandable_service;
pub mod dummy_service;

pub use dummy_service::{DummyActions, DummyService, DUMMY_ROLE};
