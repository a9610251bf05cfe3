//! Infrastructure layer: the CircleCI API client and its I/O boundary trait

pub mod circleci;
pub mod error;
pub mod traits;

pub use circleci::{CircleClient, ClientOptions, CIRCLE_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use traits::EnvVarApi;
