pub mod endpoints;
pub mod gate;
pub mod permission;
pub mod resolver;

pub use gate::{GateKind, PermissionGate, Rendered, Requirement};
pub use permission::{PermissionEntry, PermissionLevel, PermissionParseError, PermissionSet, Resource};
pub use resolver::{Capabilities, PermissionResolver};
