use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// One row of the sources CSV driving the batch orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub dataset_name: String,
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default)]
    pub graph_uri: String,
    #[serde(default, deserialize_with = "deserialize_bool_string")]
    pub use_graph: bool,
    #[serde(default, deserialize_with = "deserialize_bool_string")]
    pub two_phase: bool,
}

impl SourceRecord {
    /// Rows with an empty endpoint are skipped rather than failed.
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint_url.trim().is_empty()
    }

    /// Named-graph restriction to pass to the miner, if the row opts in.
    pub fn graph_uris(&self) -> Option<Vec<String>> {
        if self.use_graph && !self.graph_uri.trim().is_empty() {
            Some(vec![self.graph_uri.clone()])
        } else {
            None
        }
    }
}

fn deserialize_bool_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Read and parse the sources CSV, preserving row order.
pub fn read_sources_csv(path: impl AsRef<Path>) -> Result<Vec<SourceRecord>, EngineError> {
    let mut reader = csv::Reader::from_path(path.as_ref()).map_err(|e| {
        EngineError::Other(format!("failed to open sources CSV: {e}"))
    })?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: SourceRecord = result.map_err(|e| {
            EngineError::Other(format!("failed to parse sources CSV row: {e}"))
        })?;
        rows.push(record);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn parses_all_columns() {
        let file = write_csv(
            "dataset_name,endpoint_url,graph_uri,use_graph,two_phase\n\
             ds1,http://e/sparql,http://e/g,true,false\n",
        );
        let rows = read_sources_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dataset_name, "ds1");
        assert!(rows[0].use_graph);
        assert!(!rows[0].two_phase);
    }

    #[test]
    fn empty_endpoint_is_not_an_endpoint() {
        let file = write_csv(
            "dataset_name,endpoint_url,graph_uri,use_graph,two_phase\n\
             ds0,,,,\n",
        );
        let rows = read_sources_csv(file.path()).unwrap();
        assert!(!rows[0].has_endpoint());
    }

    #[test]
    fn graph_uris_is_none_unless_use_graph_and_uri_are_both_set() {
        let file = write_csv(
            "dataset_name,endpoint_url,graph_uri,use_graph,two_phase\n\
             ds1,http://e/sparql,http://e/g,false,false\n\
             ds2,http://e/sparql,,true,false\n\
             ds3,http://e/sparql,http://e/g,true,false\n",
        );
        let rows = read_sources_csv(file.path()).unwrap();
        assert_eq!(rows[0].graph_uris(), None);
        assert_eq!(rows[1].graph_uris(), None);
        assert_eq!(rows[2].graph_uris(), Some(vec!["http://e/g".to_string()]));
    }

    #[test]
    fn row_order_is_preserved() {
        let file = write_csv(
            "dataset_name,endpoint_url,graph_uri,use_graph,two_phase\n\
             z,http://e/1,,,\n\
             a,http://e/2,,,\n",
        );
        let rows = read_sources_csv(file.path()).unwrap();
        assert_eq!(rows[0].dataset_name, "z");
        assert_eq!(rows[1].dataset_name, "a");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A row is only ever reported as having an endpoint when its
        /// `endpoint_url` has non-whitespace content, no matter what the rest
        /// of the row's fields contain.
        #[test]
        fn has_endpoint_tracks_only_trimmed_endpoint_url(
            endpoint_url in "[ \t]{0,3}(http://e/[a-z]{0,6})?[ \t]{0,3}",
            dataset_name in ".*",
            graph_uri in ".*",
            use_graph in any::<bool>(),
            two_phase in any::<bool>(),
        ) {
            let record = SourceRecord {
                dataset_name,
                endpoint_url: endpoint_url.clone(),
                graph_uri,
                use_graph,
                two_phase,
            };
            prop_assert_eq!(record.has_endpoint(), !endpoint_url.trim().is_empty());
        }
    }
}
