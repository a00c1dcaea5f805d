//! Client code for precache.
//!
//! This crate provides the network layer and the offline-first worker that
//! drives the install, activate, and fetch lifecycle over the cache store.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchConfig, HttpNetwork, Network};
pub use worker::{
    ActivateReport, FetchOutcome, InstallReport, Source, StartReport, Worker, WorkerConfig, WorkerState,
};
