//! Wire types mirroring backend response shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Processing state of a server-side job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Waiting,
    InProgress,
    Success,
    Failed,
    /// Status string this client does not know about.
    Other(String),
}

impl JobStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "WAITING",
            Self::InProgress => "INPROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "WAITING" | "PENDING" => Self::Waiting,
            "INPROGRESS" | "IN_PROGRESS" | "STARTED" => Self::InProgress,
            "SUCCESS" => Self::Success,
            "FAILED" | "FAILURE" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated geospatial product (orthomosaic, DSM, point cloud, ...) for
/// one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProduct {
    pub id: Uuid,
    #[serde(default)]
    pub flight_id: Option<Uuid>,
    pub data_type: String,
    pub status: JobStatus,
    #[serde(default)]
    pub url: Option<String>,
}

/// Path identifiers for one data product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataProductRef {
    pub project_id: Uuid,
    pub flight_id: Uuid,
    pub data_product_id: Uuid,
}
