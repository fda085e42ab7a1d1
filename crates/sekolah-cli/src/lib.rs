//! # Sekolah CLI
//!
//! Administrative commands for Sekolah: creating admin accounts, seeding the
//! reference dataset and purging expired sessions.
//!
//! ## Usage
//!
//! ```ignore
//! use sekolah_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new("password123").with_students_per_class(10);
//! seed_all(&pool, config).await?;
//! ```

pub mod accounts;
pub mod seeder;
pub mod sessions;

/// Error type shared by the CLI commands.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
