//! Shared test fixtures for MarketForge crates.
//!
//! - [`market`] - [`MarketBuilder`] for market snapshots
//! - [`merchant`] - [`MerchantFixture`] for merchant records
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! marketforge-test = { workspace = true }
//! ```
//!
//! Then describe the market in a few lines:
//!
//! ```
//! use marketforge_test::{MarketBuilder, MerchantFixture};
//!
//! let market = MarketBuilder::new("noordermarkt")
//!     .row(&["1", "2", "3"])
//!     .merchant(MerchantFixture::vpl("vpl", 1, &["1"]))
//!     .merchant(MerchantFixture::soll("soll", 7).prefer(&["2", "3"]))
//!     .market();
//!
//! assert_eq!(market.merchant_count(), 2);
//! ```

pub mod market;
pub mod merchant;

pub use market::{fixture_date, MarketBuilder};
pub use merchant::MerchantFixture;
