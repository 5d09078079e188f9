//! HTTP plumbing shared by every remote integration

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
