//! Neo4j HTTP API wire types

use crate::domain::{Concept, SourceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a transactional commit request
#[derive(Debug, Serialize)]
pub struct TxRequest<'a> {
    pub statements: Vec<Statement<'a>>,
}

impl<'a> TxRequest<'a> {
    /// A request carrying a single statement
    pub fn single(statement: &'a str) -> Self {
        Self {
            statements: vec![Statement {
                statement,
                result_data_contents: &["row"],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement<'a> {
    pub statement: &'a str,
    pub result_data_contents: &'static [&'static str],
}

/// Body of a transactional commit response
#[derive(Debug, Default, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub errors: Vec<Neo4jError>,
}

impl TxResponse {
    /// Fails when the server reported statement errors, otherwise returns
    /// the first statement's result
    pub fn into_result(self) -> Result<StatementResult, SourceError> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            return Err(SourceError::QueryFailed(messages.join("; ")));
        }
        self.results.into_iter().next().ok_or_else(|| {
            SourceError::InvalidResponse("response contained no statement results".to_string())
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<DataRow>,
}

impl StatementResult {
    /// Pairs every row with the column names and decodes it
    pub fn concept_rows(self) -> Result<Vec<ConceptRow>, SourceError> {
        let columns = self.columns;
        self.data
            .into_iter()
            .map(|data| {
                let object: Map<String, Value> = columns.iter().cloned().zip(data.row).collect();
                serde_json::from_value(Value::Object(object))
                    .map_err(|e| SourceError::InvalidResponse(e.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct DataRow {
    #[serde(default)]
    pub row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Neo4jError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One row returned by a concept query
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRow {
    pub uuid: Option<String>,
    pub pref_label: Option<String>,
    pub labels: Option<Vec<String>>,
    pub lei_code: Option<String>,
    pub figi: Option<String>,
    pub factset_id: Option<String>,
}

impl ConceptRow {
    /// Builds the exported concept, or `None` when the row has no uuid
    pub fn into_concept(self, api_base_url: &str) -> Option<Concept> {
        let uuid = self.uuid.filter(|u| !u.is_empty())?;
        Some(
            Concept::new(
                api_base_url,
                uuid,
                self.pref_label.unwrap_or_default(),
                self.labels.unwrap_or_default(),
            )
            .with_lei_code(self.lei_code)
            .with_figi(self.figi)
            .with_factset_id(self.factset_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::concept::DEFAULT_API_BASE_URL;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(TxRequest::single("RETURN 1")).unwrap();
        assert_eq!(json["statements"][0]["statement"], "RETURN 1");
        assert_eq!(json["statements"][0]["resultDataContents"][0], "row");
    }

    #[test]
    fn test_concept_rows_pairs_columns() {
        let response: TxResponse = serde_json::from_str(
            r#"{
                "results": [{
                    "columns": ["uuid", "prefLabel", "labels"],
                    "data": [
                        {"row": ["u1", "Label 1", ["Thing", "Concept", "Brand"]]},
                        {"row": [null, "No uuid", null]}
                    ]
                }],
                "errors": []
            }"#,
        )
        .unwrap();

        let rows = response.into_result().unwrap().concept_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].uuid.as_deref(), Some("u1"));
        assert_eq!(rows[0].labels.as_ref().map(Vec::len), Some(3));
        assert!(rows[1].uuid.is_none());
        assert!(rows[1].clone().into_concept(DEFAULT_API_BASE_URL).is_none());
    }

    #[test]
    fn test_errors_become_query_failed() {
        let response: TxResponse = serde_json::from_str(
            r#"{"results": [], "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "Invalid input"}]}"#,
        )
        .unwrap();

        let err = response.into_result().unwrap_err();
        assert!(matches!(err, SourceError::QueryFailed(ref m) if m.contains("SyntaxError")));
    }

    #[test]
    fn test_missing_results_is_invalid() {
        let err = TxResponse::default().into_result().unwrap_err();
        assert!(matches!(err, SourceError::InvalidResponse(_)));
    }
}
