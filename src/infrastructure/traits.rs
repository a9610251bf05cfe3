//! I/O boundary traits for testability
//!
//! The dispatcher talks to the remote service only through [`EnvVarApi`],
//! so it can be exercised against an in-memory implementation.

use crate::domain::{EnvironmentVariable, ProjectSlug};
use crate::infrastructure::ApiResult;

/// Environment variable operations on a single project.
pub trait EnvVarApi: Send + Sync {
    /// List variables in the order the service returns them (values obfuscated).
    fn list(&self, slug: &ProjectSlug) -> ApiResult<Vec<EnvironmentVariable>>;

    /// Fetch one variable.
    fn get(&self, slug: &ProjectSlug, key: &str) -> ApiResult<EnvironmentVariable>;

    /// Create or update a variable.
    fn set(&self, slug: &ProjectSlug, key: &str, value: &str) -> ApiResult<()>;

    /// Delete a variable.
    fn delete(&self, slug: &ProjectSlug, key: &str) -> ApiResult<()>;
}
