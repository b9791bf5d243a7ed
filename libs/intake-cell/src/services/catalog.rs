// libs/intake-cell/src/services/catalog.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::IntakeError;
use crate::models::Dataset;

/// Resolves logical datasets to concrete CSV files.
///
/// The pattern map is a JSON object of regex pattern to dataset name.
/// Each pattern is matched against the basenames of `*.csv` files in the
/// data directory; the first match (in sorted filename order) wins and
/// extra matches are warned about. A dataset nothing matched is only an
/// error once a caller actually asks for it.
#[derive(Debug)]
pub struct DataCatalog {
    dir: PathBuf,
    resolved: BTreeMap<Dataset, PathBuf>,
}

impl DataCatalog {
    pub fn load(data_dir: &Path, pattern_map: &Path) -> Result<Self, IntakeError> {
        let raw = fs::read_to_string(pattern_map).map_err(|source| IntakeError::PatternMapRead {
            path: pattern_map.to_path_buf(),
            source,
        })?;
        let mapping: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| IntakeError::PatternMapParse {
                path: pattern_map.to_path_buf(),
                source,
            })?;

        let mut csv_files = Vec::new();
        let entries = fs::read_dir(data_dir).map_err(|source| IntakeError::DirList {
            dir: data_dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| IntakeError::DirList {
                dir: data_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "csv") {
                csv_files.push(path);
            }
        }
        csv_files.sort();
        debug!("Found {} CSV files in {}", csv_files.len(), data_dir.display());

        let mut resolved: BTreeMap<Dataset, PathBuf> = BTreeMap::new();
        for (pattern, dataset_name) in &mapping {
            let Some(dataset) = Dataset::from_name(dataset_name) else {
                warn!(
                    "Pattern map entry '{}' names unknown dataset '{}', ignoring",
                    pattern, dataset_name
                );
                continue;
            };
            let regex = Regex::new(pattern).map_err(|source| IntakeError::BadPattern {
                pattern: pattern.clone(),
                source,
            })?;

            let matches: Vec<&PathBuf> = csv_files
                .iter()
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map_or(false, |name| regex.is_match(name))
                })
                .collect();

            match matches.as_slice() {
                [] => {
                    warn!(
                        "No CSV file in {} matches pattern '{}' for dataset {}",
                        data_dir.display(),
                        pattern,
                        dataset
                    );
                }
                [only] => {
                    debug!("Dataset {} resolved to {}", dataset, only.display());
                    resolved.entry(dataset).or_insert_with(|| (*only).clone());
                }
                [first, ..] => {
                    warn!(
                        "{} files match pattern '{}' for dataset {}, using {}",
                        matches.len(),
                        pattern,
                        dataset,
                        first.display()
                    );
                    resolved.entry(dataset).or_insert_with(|| (*first).clone());
                }
            }
        }

        info!(
            "Data catalog resolved {} of {} datasets in {}",
            resolved.len(),
            Dataset::ALL.len(),
            data_dir.display()
        );
        Ok(Self {
            dir: data_dir.to_path_buf(),
            resolved,
        })
    }

    /// Path of a dataset the pipeline cannot run without.
    pub fn path(&self, dataset: Dataset) -> Result<&Path, IntakeError> {
        self.resolved
            .get(&dataset)
            .map(PathBuf::as_path)
            .ok_or_else(|| IntakeError::DatasetMissing {
                dataset,
                dir: self.dir.clone(),
            })
    }

    pub fn try_path(&self, dataset: Dataset) -> Option<&Path> {
        self.resolved.get(&dataset).map(PathBuf::as_path)
    }
}
