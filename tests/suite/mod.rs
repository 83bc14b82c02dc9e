//! Integration test suite modules

mod cli;
mod commitments;
mod composition;
mod properties;
mod scenarios;
mod scoping;
