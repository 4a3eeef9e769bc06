//! CLI module for the user service
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `exercise`: drive a running server through the CRUD endpoints

pub mod exercise;
pub mod serve;

use clap::{Parser, Subcommand};

/// User CRUD service
#[derive(Parser)]
#[command(name = "user-crud-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Call every users endpoint in turn against a running server
    Exercise(exercise::ExerciseArgs),
}
