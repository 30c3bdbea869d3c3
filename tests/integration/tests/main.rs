//! End-to-End Integration Tests
//!
//! These tests build complete IdP metadata documents with real keys and
//! check their structure and signatures.

mod cli;
mod common;
mod metadata_document;
