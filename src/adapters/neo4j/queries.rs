//! Cypher statements used to read concepts

use crate::domain::ConceptType;

const ANNOTATION_RELATIONSHIPS: &str =
    "MENTIONS|MAJOR_MENTIONS|ABOUT|IS_CLASSIFIED_BY|IS_PRIMARILY_CLASSIFIED_BY|HAS_AUTHOR";

/// Returns the statement that reads every annotated concept of a type
///
/// The concept type is interpolated as a label; `ConceptType` only admits
/// ASCII alphanumerics.
pub fn statement_for(concept_type: &ConceptType) -> String {
    match concept_type.as_str() {
        "Person" => format!(
            "MATCH (content:Content)-[rel:{ANNOTATION_RELATIONSHIPS}]->(concept:Person)
             OPTIONAL MATCH (concept)-[:EQUIVALENT_TO]->(x:Thing)
             RETURN DISTINCT coalesce(x.prefUUID, concept.uuid) AS uuid,
                    coalesce(labels(x), labels(concept)) AS labels,
                    coalesce(x.prefLabel, concept.prefLabel) AS prefLabel"
        ),
        "Organisation" => format!(
            "MATCH (content:Content)-[rel:{ANNOTATION_RELATIONSHIPS}]->(concept:Organisation)
             OPTIONAL MATCH (concept)-[:EQUIVALENT_TO]->(x:Thing)
             OPTIONAL MATCH (concept)<-[:IDENTIFIES]-(factset:FactsetIdentifier)
             OPTIONAL MATCH (concept)<-[:IDENTIFIES]-(lei:LegalEntityIdentifier)
             OPTIONAL MATCH (concept)<-[:ISSUED_BY]-(:FinancialInstrument)<-[:IDENTIFIES]-(figi:FIGIIdentifier)
             RETURN DISTINCT coalesce(x.prefUUID, concept.uuid) AS uuid,
                    coalesce(labels(x), labels(concept)) AS labels,
                    coalesce(x.prefLabel, concept.prefLabel) AS prefLabel,
                    coalesce(x.factsetId, factset.value) AS factsetId,
                    coalesce(x.leiCode, lei.value) AS leiCode,
                    coalesce(x.figiCode, figi.value) AS figi"
        ),
        label => format!(
            "MATCH (c:{label})-[:{ANNOTATION_RELATIONSHIPS}]-(cc:Content)
             MATCH (c)-[:EQUIVALENT_TO]->(x:Thing)
             RETURN DISTINCT x.prefUUID AS uuid, x.prefLabel AS prefLabel, labels(c) AS labels"
        ),
    }
}
