//! Cached access to issue, pull request and user metadata on the hosting API.

pub mod client;
pub mod fetch;
pub mod types;

pub use client::{
    ClientOptions, Endpoints, HostProfile, MetadataClient, CACHE_NAMESPACE, DEFAULT_API_URL,
    ENTERPRISE_AUTH_VAR, PUBLIC_AUTH_VAR,
};
pub use fetch::{CachedFetcher, HttpTransport, ResponseCache, Transport};
pub use types::{IssueAuthor, IssueRecord, Label, PullRequestRef, UserRecord};
