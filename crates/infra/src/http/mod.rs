//! HTTP transport shared by the identity and vendor API clients

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
