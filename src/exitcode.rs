//! Process exit codes

/// Any failure: missing token, transport, API or decode error
pub const FAILURE: i32 = 1;
