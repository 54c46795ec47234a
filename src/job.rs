//! Compute jobs: containerized tasks run by the platform.
//!
//! A [`Job`] is a read-only snapshot of the remote job at fetch time. Jobs are
//! driven entirely by the server, so the operations here are free functions
//! over an [`HttpClient`] rather than methods on a live object: submit,
//! get, list and terminate. Observe progress by fetching again.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ParcelError;
use crate::http::{HttpClient, HttpError, Page, PageParams};
use crate::ids::{DocumentId, IdentityId, JobId};
use crate::wire::{parse_timestamp, resource_path};

const JOBS_EP: &str = "compute/jobs";

fn job_ep(id: &JobId) -> String {
    resource_path(JOBS_EP, id.as_str())
}

/// Parameters accepted by [`list_jobs`]: pagination plus any server-side
/// filter keys, sent unchanged in the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListJobsFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl ListJobsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page.page_size = Some(page_size);
        self
    }

    pub fn with_page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page.page_token = Some(page_token.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// What to run. Authored by the caller and never changed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Human-readable name, not required to be unique.
    pub name: String,
    /// Arguments appended to the image's entrypoint.
    pub cmd: Vec<String>,
    /// Container image reference, e.g. `bash` or `registry.io/team/tool:1.2`.
    pub image: String,
    /// Extra environment variables. The server rejects a `PATH` key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Documents downloaded into the container before it starts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_documents: Vec<InputDocumentSpec>,
    /// Files uploaded as new documents after the job succeeds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_documents: Vec<OutputDocumentSpec>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>, cmd: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cmd,
            image: image.into(),
            env: BTreeMap::new(),
            input_documents: Vec::new(),
            output_documents: Vec::new(),
        }
    }

    /// Reads a spec from disk: TOML for `.toml` files, JSON otherwise.
    pub fn load(path: &Path) -> Result<Self, ParcelError> {
        let contents = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_input(mut self, mount_path: impl Into<String>, id: DocumentId) -> Self {
        self.input_documents.push(InputDocumentSpec {
            mount_path: mount_path.into(),
            id,
        });
        self
    }

    pub fn with_output(mut self, mount_path: impl Into<String>, owner: Option<IdentityId>) -> Self {
        self.output_documents.push(OutputDocumentSpec {
            mount_path: mount_path.into(),
            owner,
        });
        self
    }
}

/// An existing document mounted into the job's container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDocumentSpec {
    pub mount_path: String,
    pub id: DocumentId,
}

/// A container path whose contents become a document on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocumentSpec {
    pub mount_path: String,
    /// Owner of the uploaded document. The server picks one when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<IdentityId>,
}

/// Coarse lifecycle state of a job.
///
/// Jobs move `Pending -> Running -> Succeeded | Failed` and never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Succeeded | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Pending => write!(f, "Pending"),
            JobPhase::Running => write!(f, "Running"),
            JobPhase::Succeeded => write!(f, "Succeeded"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for JobPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(JobPhase::Pending),
            "Running" => Ok(JobPhase::Running),
            "Succeeded" => Ok(JobPhase::Succeeded),
            "Failed" => Ok(JobPhase::Failed),
            other => Err(format!("unknown job phase: {other}")),
        }
    }
}

/// A document produced by a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    /// Mount path from the matching [`OutputDocumentSpec`].
    pub mount_path: String,
    pub id: DocumentId,
}

/// Server-owned view of how the job is doing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub phase: JobPhase,
    /// Explanation of the phase, typically set when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// One entry per declared output that was actually written. Empty until
    /// the job succeeds.
    #[serde(default)]
    pub output_documents: Vec<OutputDocument>,
    /// Node that ran the job. Debugging aid only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Job as transmitted by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub created_at: String,
    pub spec: JobSpec,
    #[serde(default)]
    pub status: JobStatus,
}

/// Snapshot of a remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    pub spec: JobSpec,
    pub status: JobStatus,
}

impl Job {
    pub fn phase(&self) -> JobPhase {
        self.status.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.status.phase.is_terminal()
    }

    /// The document produced at `mount_path`, if the job wrote one.
    pub fn output_document(&self, mount_path: &str) -> Option<&OutputDocument> {
        self.status
            .output_documents
            .iter()
            .find(|doc| doc.mount_path == mount_path)
    }
}

impl TryFrom<JobRecord> for Job {
    type Error = HttpError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: parse_timestamp("createdAt", &record.created_at)?,
            id: JobId::new(record.id),
            spec: record.spec,
            status: record.status,
        })
    }
}

/// Submits `spec` for execution. The spec is sent as-is; validation happens
/// server-side.
pub async fn submit_job(client: &impl HttpClient, spec: &JobSpec) -> Result<Job, HttpError> {
    let record: JobRecord = client.create(JOBS_EP, spec).await?;
    let job = Job::try_from(record)?;
    debug!(job_id = %job.id, name = %job.spec.name, "submitted job");
    Ok(job)
}

/// Lists jobs visible to the caller, in the order the server returns them.
pub async fn list_jobs(
    client: &impl HttpClient,
    filter: &ListJobsFilter,
) -> Result<Page<Job>, HttpError> {
    let page: Page<JobRecord> = client.get(JOBS_EP, filter).await?;
    page.try_map(Job::try_from)
}

pub async fn get_job(client: &impl HttpClient, id: &JobId) -> Result<Job, HttpError> {
    let record: JobRecord = client.get(&job_ep(id), &()).await?;
    Job::try_from(record)
}

/// Asks the server to stop the job. The resulting phase is visible on the
/// next [`get_job`].
pub async fn terminate_job(client: &impl HttpClient, id: &JobId) -> Result<(), HttpError> {
    debug!(job_id = %id, "terminating job");
    client.delete(&job_ep(id)).await
}
