//! readme-gen: README generation and README datasets from source repositories
//!
//! Walks a repository, classifies its files, and either prompts a hosted
//! model for a README or emits dataset rows in fixed-size chunk files.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod domain;
pub mod emit;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod remote;
pub mod render;
pub mod scan;
pub mod utils;
