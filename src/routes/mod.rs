/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// so access control is applied explicitly at the module level (via Axum
/// layers) rather than per handler.

/// Routes accessible to all clients: health probe and the account lifecycle
/// (register/login/reset), which cannot require a session.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a valid
/// token for an existing, ACTIVE student.
pub mod authenticated;
