//! # Role RPC Sample Library
//!
//! A "dummy" domain wired through every part of `role_rpc`. This library exposes its
//! modules for the demo binary and the integration tests.
//!
//! - **[model]**: [`Dummy`](model::Dummy), page type, request schemas
//! - **[controller]**: In-memory business logic, also [`Commandable`](role_rpc::Commandable)
//! - **[services]**: Hand-written and commandable services over the controller
//! - **[clients]**: Typed clients for both services
//! - **[container]**: The controller and service packaged as a plugin

pub mod clients;
pub mod container;
pub mod controller;
pub mod error;
pub mod model;
pub mod services;
