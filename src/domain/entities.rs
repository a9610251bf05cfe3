//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// An environment variable as stored on a CircleCI project.
///
/// On the wire the key is called `name`. Values returned by listing are
/// obfuscated by the service (`xxxx` followed by the last four characters)
/// and are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    #[serde(rename = "name")]
    pub key: String,
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Reject keys that would collapse the request path onto the collection.
    pub fn validate_key(key: &str) -> Result<(), DomainError> {
        validate_segment("key", key)
    }
}

/// A single path segment; `.` and `..` are dropped by URL normalization
/// and would re-scope the request.
fn validate_segment(field: &'static str, value: &str) -> Result<(), DomainError> {
    match value {
        "" => Err(DomainError::EmptyField { field }),
        "." | ".." => Err(DomainError::DotSegment { field }),
        _ => Ok(()),
    }
}

impl fmt::Display for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Source-control host a project is linked from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    #[default]
    #[serde(alias = "gh")]
    Github,
    #[serde(alias = "bb")]
    Bitbucket,
}

impl VcsType {
    /// Path segment used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            VcsType::Github => "github",
            VcsType::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VcsType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" | "gh" => Ok(VcsType::Github),
            "bitbucket" | "bb" => Ok(VcsType::Bitbucket),
            _ => Err(DomainError::UnknownVcsType(s.to_string())),
        }
    }
}

/// The `(vcs, account, project)` triple every operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSlug {
    pub vcs_type: VcsType,
    pub account: String,
    pub project: String,
}

impl ProjectSlug {
    pub fn new(
        vcs_type: VcsType,
        account: impl Into<String>,
        project: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let account = account.into();
        let project = project.into();
        validate_segment("username", &account)?;
        validate_segment("project", &project)?;
        Ok(Self {
            vcs_type,
            account,
            project,
        })
    }

    /// Path segments below the API root, up to and including `envvar`.
    pub fn envvar_segments(&self) -> [&str; 5] {
        [
            "project",
            self.vcs_type.as_str(),
            self.account.as_str(),
            self.project.as_str(),
            "envvar",
        ]
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vcs_type, self.account, self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_wire_object_when_deserializing_then_name_maps_to_key() {
        let var: EnvironmentVariable =
            serde_json::from_str(r#"{"name":"FOO","value":"xxxxbar1"}"#).unwrap();
        assert_eq!(var, EnvironmentVariable::new("FOO", "xxxxbar1"));
    }

    #[test]
    fn given_variable_when_serializing_then_emits_name_then_value() {
        let body = serde_json::to_string(&EnvironmentVariable::new("FOO", "bar")).unwrap();
        assert_eq!(body, r#"{"name":"FOO","value":"bar"}"#);
    }

    #[test]
    fn given_missing_value_field_when_deserializing_then_fails() {
        let result = serde_json::from_str::<EnvironmentVariable>(r#"{"name":"FOO"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn given_aliases_when_parsing_vcs_type_then_resolves() {
        assert_eq!("gh".parse::<VcsType>().unwrap(), VcsType::Github);
        assert_eq!("Bitbucket".parse::<VcsType>().unwrap(), VcsType::Bitbucket);
        assert!("gitlab".parse::<VcsType>().is_err());
    }

    #[test]
    fn given_empty_project_when_building_slug_then_rejects() {
        let err = ProjectSlug::new(VcsType::Github, "acme", "").unwrap_err();
        assert_eq!(err, DomainError::EmptyField { field: "project" });
    }

    #[test]
    fn given_dot_segments_when_validating_then_rejects() {
        assert_eq!(
            EnvironmentVariable::validate_key(".."),
            Err(DomainError::DotSegment { field: "key" })
        );
        assert_eq!(
            ProjectSlug::new(VcsType::Github, ".", "api").unwrap_err(),
            DomainError::DotSegment { field: "username" }
        );
        assert_eq!(
            ProjectSlug::new(VcsType::Github, "acme", "..").unwrap_err(),
            DomainError::DotSegment { field: "project" }
        );
        assert!(EnvironmentVariable::validate_key("...").is_ok());
        assert!(EnvironmentVariable::validate_key(".env").is_ok());
    }

    #[test]
    fn given_slug_when_displaying_then_joins_with_slashes() {
        let slug = ProjectSlug::new(VcsType::Bitbucket, "acme", "api").unwrap();
        assert_eq!(slug.to_string(), "bitbucket/acme/api");
    }
}
