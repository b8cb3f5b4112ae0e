#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
//! ## Generating Seeders
//!
//! `model-seeder` reads the rows currently stored for each model of a Laravel
//! project and writes seeders that recreate them:
//!
//! ```sh
//! ❯ model-seeder --root ~/code/shop --only User,Order
//! * /home/me/code/shop/database/seeders/UserSeeder.php
//! * /home/me/code/shop/database/seeders/RoleUserPivotSeeder.php
//! * /home/me/code/shop/database/seeders/OrderSeeder.php
//! * /home/me/code/shop/database/seeders/DatabaseSeeder.php
//! Database seeders created!
//! ```
//!
//! ## Available Features
//!
//! | Feature   | Default | Description            |
//! |-----------|---------|------------------------|
//! | `cli`     | true    | Expose Cli commands.   |
//! | `testing` | false   | Test Utilities Module. |
pub use self::errors::Error;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod db;
pub mod discovery;
pub mod environment;
pub mod errors;
pub mod generate;
mod logger;
pub mod record;
pub mod registry;
pub mod resolver;
mod tera;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Application results options list
pub type Result<T> = std::result::Result<T, Error>;
