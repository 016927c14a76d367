//! Inbound adapters that translate user input into domain use-case calls
//! while keeping presentation details at the edge.
//!
//! The command-line surface lives under [`cli`].

pub mod cli;
