//! voicecmd - Voice command definitions for AI agents
//!
//! Define a phrase, what it should do, and any alternative phrases. Each
//! definition becomes a small markdown file that an AI agent reads to decide
//! what to run when it hears the phrase.
//!
//! # File Format
//!
//! ```text
//! ---
//! description: Verify framework test
//! aliases: ["ready now", "check it"]
//! ---
//!
//! ./verify_test.sh
//! ```
//!
//! The file name is derived from the first phrase (`ready-now.md`).
//!
//! # Quick Start
//!
//! ```no_run
//! use voicecmd::CommandStore;
//!
//! let store = CommandStore::open("/tmp/commands").unwrap();
//!
//! // Create a command with two extra phrases
//! let id = store.create("ready now", "./verify_test.sh", "Verify framework test", "check it, verify this").unwrap();
//!
//! // List what the agent will see
//! for cmd in store.list().unwrap() {
//!     println!("{}: \"{}\" - {}", cmd.id, cmd.phrase, cmd.description);
//! }
//!
//! store.delete(&id).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod serve;
pub mod store;

pub use config::Config;
pub use error::StoreError;
pub use record::{derive_id, CommandDefinition, HeaderField, ParsedHeader, DEFAULT_DESCRIPTION};
pub use store::{CommandStore, CommandSummary};
