//! keeper-core — configuration and static tables for cfkeeper.
//!
//! Everything here is immutable after startup: the region table used to
//! map an application URL onto a Cloud Foundry region, the registry of
//! monitored applications, and the operator settings (credentials,
//! Telegram, server, display).
//!
//! # Loading
//!
//! ```text
//! keeper.toml ──► KeeperConfig ──► + env overlay ──► Settings
//!                                                     ├── RegionTable (compiled patterns)
//!                                                     ├── AppRegistry (derived names)
//!                                                     └── credentials / telegram / server
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod region;

pub use app::{AppConfig, AppRegistry, derive_app_name};
pub use config::{
    Credentials, DisplayConfig, KeeperConfig, ServerConfig, Settings, TelegramConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use region::{RegionConfig, RegionTable};
