//! Concept domain model
//!
//! A concept is a single exported entity: a canonical identifier, a display
//! label, a public API link and, for organisations, financial identifiers.

use serde::{Deserialize, Serialize};

/// Default base for canonical and API URLs
pub const DEFAULT_API_BASE_URL: &str = "http://api.ft.com";

/// A concept read from the graph database
///
/// Concepts are produced by a `ConceptSource` and consumed by the exporter;
/// they are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Canonical identifier URL (`<base>/things/<uuid>`)
    pub id: String,

    /// Canonical UUID
    pub uuid: String,

    /// Preferred display label
    pub pref_label: String,

    /// Public API URL, typed by the most specific label
    pub api_url: String,

    /// Graph labels of the concept
    pub labels: Vec<String>,

    /// Legal Entity Identifier (organisations only)
    pub lei_code: Option<String>,

    /// FactSet identifier (organisations only)
    pub factset_id: Option<String>,

    /// Financial Instrument Global Identifier (organisations only)
    pub figi: Option<String>,
}

impl Concept {
    /// Creates a concept, deriving its id and API URL from the uuid and labels
    pub fn new(
        api_base_url: &str,
        uuid: impl Into<String>,
        pref_label: impl Into<String>,
        labels: Vec<String>,
    ) -> Self {
        let uuid = uuid.into();
        Self {
            id: id_url(api_base_url, &uuid),
            api_url: api_url(api_base_url, &uuid, &labels),
            uuid,
            pref_label: pref_label.into(),
            labels,
            lei_code: None,
            factset_id: None,
            figi: None,
        }
    }

    /// Sets the LEI code
    pub fn with_lei_code(mut self, lei_code: Option<String>) -> Self {
        self.lei_code = lei_code;
        self
    }

    /// Sets the FactSet identifier
    pub fn with_factset_id(mut self, factset_id: Option<String>) -> Self {
        self.factset_id = factset_id;
        self
    }

    /// Sets the FIGI code
    pub fn with_figi(mut self, figi: Option<String>) -> Self {
        self.figi = figi;
        self
    }
}

/// Canonical identifier URL for a uuid
pub fn id_url(api_base_url: &str, uuid: &str) -> String {
    format!("{}/things/{uuid}", api_base_url.trim_end_matches('/'))
}

/// Public API URL for a uuid, typed by its labels
pub fn api_url(api_base_url: &str, uuid: &str, labels: &[String]) -> String {
    format!(
        "{}/{}/{uuid}",
        api_base_url.trim_end_matches('/'),
        api_path(labels)
    )
}

// Ordered from most to least specific.
const API_PATHS: &[(&[&str], &str)] = &[
    (&["Brand"], "brands"),
    (&["Person"], "people"),
    (&["PublicCompany", "Company", "Organisation"], "organisations"),
    (&["Membership"], "memberships"),
    (&["BoardRole", "MembershipRole", "Role"], "roles"),
];

fn api_path(labels: &[String]) -> &'static str {
    API_PATHS
        .iter()
        .find(|(names, _)| labels.iter().any(|l| names.contains(&l.as_str())))
        .map(|(_, path)| *path)
        .unwrap_or("things")
}
