//! Domain identifier types with validation
//!
//! Newtype wrappers for concept types, job identifiers and transaction ids.
//! Each type ensures type safety and validates its format on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Concept type that carries legal-entity and financial-instrument codes
const ORGANISATION: &str = "Organisation";

/// Concept type newtype wrapper
///
/// Names a category of exported concept, e.g. `Brand` or `Organisation`.
/// The name is used as a graph label in queries, so only ASCII letters and
/// digits are accepted.
///
/// # Examples
///
/// ```
/// use concept_exporter::domain::ids::ConceptType;
/// use std::str::FromStr;
///
/// let concept_type = ConceptType::from_str("Brand").unwrap();
/// assert_eq!(concept_type.as_str(), "Brand");
/// assert!(ConceptType::from_str("Brand) DETACH DELETE (n").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConceptType(String);

impl ConceptType {
    /// Creates a new ConceptType from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ConceptType)` if the name is valid, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Concept type cannot be empty".to_string());
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!(
                "Invalid concept type '{name}': only ASCII letters and digits are allowed"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the concept type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether rows of this type include LEI and FIGI columns
    pub fn carries_financial_identifiers(&self) -> bool {
        self.0 == ORGANISATION
    }
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConceptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ConceptType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConceptType> for String {
    fn from(value: ConceptType) -> Self {
        value.0
    }
}

/// Export job identifier
///
/// Generated once per job as `job_<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh job identifier
    pub fn generate() -> Self {
        Self(format!("job_{}", Uuid::new_v4()))
    }

    /// Returns the job ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id threaded through one export request
///
/// Used only for diagnostics: it is attached to log events and forwarded to
/// the S3 writer as `X-Request-Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a TransactionId from an existing value
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Transaction ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh transaction id of the form `tid_<random>`
    pub fn generate() -> Self {
        Self(format!("tid_{}", Uuid::new_v4().simple()))
    }

    /// Uses the supplied header value when present, otherwise generates one
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::new(v.trim()).ok())
            .unwrap_or_else(Self::generate)
    }

    /// Returns the transaction ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
