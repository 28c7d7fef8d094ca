//! Shared types, error model, and configuration for TutorHub.
//!
//! This crate is the foundation depended on by all other TutorHub crates.
//! It provides:
//! - [`TutorHubError`], the unified error type
//! - Domain types ([`BlogPost`], [`Participant`], [`UserProfile`], [`RelationRef`])
//! - Configuration ([`AppConfig`], [`BlogDefaults`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BlogDefaults, CmsConfig, ContactsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, TutorHubError};
pub use types::{BlogPost, Participant, ParticipantRole, RelationRef, ResolvedRef, UserProfile};
