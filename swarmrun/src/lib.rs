pub mod acceptance;
pub mod command;
pub mod compression;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sra;
pub mod swarm;
pub mod tools;
pub mod workspace;

#[doc(hidden)]
pub mod _internal_test_data;
