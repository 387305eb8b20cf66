//! Client SDK for the migasfree REST API.
//!
//! The centre of the crate is [`client::RestClient`]: a blocking client bound to
//! one server and one API token. It builds endpoint URLs, performs CRUD calls,
//! walks paginated lists lazily and exports list results to CSV.
//!
//! ```no_run
//! use migasfree_sdk::client::RestClient;
//!
//! # fn main() -> Result<(), migasfree_sdk::error::ApiError> {
//! let client = RestClient::builder()
//!     .server("migasfree.example.org")
//!     .user("admin")
//!     .save_token(true)
//!     .build()?;
//!
//! let computer = client.get("computers", 42u64)?;
//! for package in client.filter("packages", vec![("project".into(), "1".into())]) {
//!     println!("{}", package?["name"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - `client`: the REST client and its builder
//! - `commands`: CLI command parsing
//! - `configuration`: optional YAML configuration file
//! - `credentials`: credential providers (interactive prompt, fixed answers)
//! - `error`: error taxonomy
//! - `export`: CSV export
//! - `model`: shared data types
//! - `pagination`: lazy page-following iterator
//! - `token_cache`: per-user, per-server token files

pub mod client;
pub mod commands;
pub mod configuration;
pub mod credentials;
pub mod error;
pub mod exit_codes;
pub mod export;
pub mod http_utils;
pub mod model;
pub mod pagination;
pub mod token_cache;
