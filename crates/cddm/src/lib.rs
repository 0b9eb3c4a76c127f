//! CDDM - departments, users, tasks and the dependencies between tasks.
//!
//! The crate holds the whole model behind a dependency-graph editor:
//!
//! - [`store`]: the single owner of the four record collections
//! - [`layout`]: canvas coordinates for tasks, reconciled against the store
//! - [`render`]: pure derivation of node and edge visuals from current state
//! - [`interaction`]: selection and drag state for pointer input
//! - [`workspace`]: ties the above together and propagates store changes
//!
//! Persistence, configuration and the CLI sit on top of that.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod store;

// Graph model
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod workspace;

// Editing and session support
pub mod auth;
pub mod draft;

// Storage and repository configuration
pub mod config;
pub mod persistence;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod output;
