//! Manage environment variables of CircleCI projects through the v1.1 REST API.
//!
//! Layers, innermost first: [`domain`] (entities), [`infrastructure`] (the
//! HTTP client behind the [`infrastructure::EnvVarApi`] trait), [`config`]
//! (layered settings) and [`cli`] (argument model and dispatch).

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{EnvironmentVariable, ProjectSlug, VcsType};
pub use infrastructure::{ApiError, CircleClient, ClientOptions, EnvVarApi};
