//! The controller's commands served as-is under the `dummy` role.

use super::DUMMY_ROLE;
use role_rpc::CommandableService;

/// Creates an unconfigured commandable dummy service.
///
/// The controller is looked up under the `dependencies.controller` name.
pub fn new() -> CommandableService {
    CommandableService::commandable(DUMMY_ROLE)
}
