//! Topograph - a graph-editing backend.
//!
//! Nodes in three architectural layers, directed edges between them, named
//! projects over the graph, per-node operational status and an append-only
//! audit trail, all persisted in `SQLite`.
//!
//! The [`storage`] module defines the repository traits, the `SQLite` store
//! and the audit and logging decorators. [`service`] and [`traversal`] build
//! on any repository; [`cli`] is the command-line front end.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod traversal;

// Application context and configuration
pub mod app;
pub mod commands;

// Public CLI module (needed by binary)
pub mod cli;
pub mod output;
