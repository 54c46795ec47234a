//! Typed client for the Parcel compute-job and access-grant API.
//!
//! Resource operations take any [`HttpClient`]; [`ApiClient`] is the
//! `reqwest`-backed implementation used by the `parcel` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod ids;
pub mod job;
pub mod ui;
mod wire;

pub use config::ParcelConfig;
pub use error::ParcelError;
pub use grant::{Constraints, Grant, GrantCreateParams, Grantee, delete_grant};
pub use http::{ApiClient, HttpClient, HttpError, Page, PageParams};
pub use ids::{ConsentId, DocumentId, GrantId, IdentityId, JobId};
pub use job::{
    InputDocumentSpec, Job, JobPhase, JobSpec, JobStatus, ListJobsFilter, OutputDocument,
    OutputDocumentSpec, get_job, list_jobs, submit_job, terminate_job,
};
