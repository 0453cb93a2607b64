//! # IO Module
//!
//! Adapter layer between the portal frontend and the domain logic.
//!
//! Translates HTTP requests into domain commands, runs them through the
//! enrollment service, and maps the results (or the error kind) back into
//! JSON responses with the matching status code.

pub mod rest;
