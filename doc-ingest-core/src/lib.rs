#![doc = "doc-ingest-core: core pipeline library for doc-ingest."]

//! This crate contains the ingestion pipeline and the data models shared with
//! the CLI. Transport code for the remote API is not included here; it plugs
//! in through [`contract::Uploader`].
//!
//! # Usage
//! Build an [`config::IngestConfig`], pick an `Uploader` and hand both to
//! [`batch::BatchOrchestrator`].

pub mod batch;
pub mod config;
pub mod contract;
pub mod discovery;
pub mod manage;
pub mod metadata;
pub mod pdf_text;
pub mod validate;
