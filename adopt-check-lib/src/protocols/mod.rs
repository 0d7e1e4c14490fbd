//! Clients for the remote lookup services.
//!
//! Two endpoints are involved in every check: the users API resolves a
//! username to a numeric ID, and the groups API lists the groups that ID
//! holds a role in.

/// Username → user ID resolution
pub mod users;

/// User ID → group roles
pub mod groups;

/// Sentinel-returning wrapper used by workers
pub mod lookup;

pub use groups::{GroupMembership, GroupRolesResponse, GroupsClient};
pub use lookup::LookupClient;
pub use users::{UsernamesResponse, UsersClient};
