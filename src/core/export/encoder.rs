//! CSV encoding of exported concepts
//!
//! One in-memory buffer per concept type. The header row is written when the
//! buffer is prepared, so a type with no rows still yields a valid file.

use crate::domain::{Concept, ConceptType, ExporterError, Result, TransactionId};
use std::collections::HashMap;

const HEADER: &[&str] = &["id", "prefLabel", "apiUrl"];
const FINANCIAL_HEADER: &[&str] = &["id", "prefLabel", "apiUrl", "leiCode", "FIGI"];

/// Buffers encoded rows per concept type for one job
pub trait RecordEncoder: Send {
    /// Allocates a fresh buffer per type and writes its header row
    ///
    /// # Errors
    ///
    /// Fails if any header cannot be written; no buffer should be relied on
    /// afterwards.
    fn prepare(&mut self, concept_types: &[ConceptType]) -> Result<()>;

    /// Appends one row to the buffer of `concept_type`
    fn write(
        &mut self,
        concept: &Concept,
        concept_type: &ConceptType,
        tid: &TransactionId,
    ) -> Result<()>;

    /// Flushes and returns the current contents of the buffer
    fn bytes(&mut self, concept_type: &ConceptType) -> Result<Vec<u8>>;

    /// Name under which the buffer is published
    fn file_name(&self, concept_type: &ConceptType) -> String;
}

/// [`RecordEncoder`] backed by `csv::Writer`s over byte vectors
#[derive(Default)]
pub struct CsvExporter {
    writers: HashMap<ConceptType, csv::Writer<Vec<u8>>>,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn writer(&mut self, concept_type: &ConceptType) -> Result<&mut csv::Writer<Vec<u8>>> {
        self.writers.get_mut(concept_type).ok_or_else(|| {
            ExporterError::Encoding(format!("No CSV buffer prepared for {concept_type}"))
        })
    }
}

fn header(concept_type: &ConceptType) -> &'static [&'static str] {
    if concept_type.carries_financial_identifiers() {
        FINANCIAL_HEADER
    } else {
        HEADER
    }
}

impl RecordEncoder for CsvExporter {
    fn prepare(&mut self, concept_types: &[ConceptType]) -> Result<()> {
        let mut writers = HashMap::with_capacity(concept_types.len());
        for concept_type in concept_types {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(header(concept_type))?;
            writers.insert(concept_type.clone(), writer);
        }
        self.writers = writers;
        Ok(())
    }

    fn write(
        &mut self,
        concept: &Concept,
        concept_type: &ConceptType,
        tid: &TransactionId,
    ) -> Result<()> {
        let financial = concept_type.carries_financial_identifiers();
        let writer = self.writer(concept_type)?;

        let mut record = vec![
            concept.id.as_str(),
            concept.pref_label.as_str(),
            concept.api_url.as_str(),
        ];
        if financial {
            record.push(concept.lei_code.as_deref().unwrap_or_default());
            record.push(concept.figi.as_deref().unwrap_or_default());
        }

        writer.write_record(&record).map_err(|e| {
            tracing::debug!(transaction_id = %tid, uuid = %concept.uuid, "CSV write failed");
            ExporterError::from(e)
        })
    }

    fn bytes(&mut self, concept_type: &ConceptType) -> Result<Vec<u8>> {
        let writer = self.writer(concept_type)?;
        writer.flush()?;
        Ok(writer.get_ref().clone())
    }

    fn file_name(&self, concept_type: &ConceptType) -> String {
        format!("{concept_type}.csv")
    }
}
