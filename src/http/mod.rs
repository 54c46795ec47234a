pub mod client;
pub mod error;
pub mod page;

pub use client::{ApiClient, HttpClient};
pub use error::HttpError;
pub use page::{Page, PageParams};
