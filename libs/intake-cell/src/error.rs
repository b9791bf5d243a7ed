use std::path::PathBuf;

use thiserror::Error;

use crate::models::Dataset;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Could not open {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not list CSV files in {dir}")]
    DirList {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read the pattern map at {path}")]
    PatternMapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The pattern map at {path} is not a JSON object of pattern to dataset name")]
    PatternMapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filename pattern '{pattern}' is not a valid regex")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No CSV file in {dir} matches the {dataset} dataset")]
    DatasetMissing { dataset: Dataset, dir: PathBuf },

    #[error("{file} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("CSV error in {file}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Could not rewrite {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
