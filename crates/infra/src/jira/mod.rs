//! Jira issue-query integration

pub mod client;

pub use client::JiraClient;
