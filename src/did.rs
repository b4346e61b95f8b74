//! # Decentralized Identifiers
//!
//! DID documents and the resolution contract that turns a bare DID string
//! into one. Resolution is the crate's one network-bound edge (together with
//! well-known configuration fetch); everything downstream of it is
//! synchronous computation over the resolved document.

pub mod document;
pub mod resolve;
pub mod service;

pub use document::{Document, DocumentKey};
pub use resolve::{HttpClient, HttpFetch, HttpResolver, Resolver};
pub use service::{Service, ServiceEndpoint, LINKED_DOMAINS};
