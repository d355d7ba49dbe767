//! Exit codes for the `rti` binary.
//! Authorization and transport codes match `RtiError::exit_code`.

pub const SUCCESS: i32 = 0;
pub const VALIDATION_FAILED: i32 = 1; // Document failed structural validation
pub const CONFIG_ERROR: i32 = 2; // Bad input, missing credentials, unreadable files
pub const AUTH_FAILED: i32 = 3; // Token endpoint rejected the request
pub const NETWORK_ERROR: i32 = 5;
