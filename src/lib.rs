//! OurToken: a fixed-supply ERC-20 style token ledger
//!
//! This crate provides:
//! - A single-asset ledger with balances and allowances
//! - Transfer and approval notifications
//! - A deployment routine minting 100 OT to the deployer
//! - A thread-safe shared handle with event subscription
//! - JSON persistence with backups
//! - A REST/WebSocket API and a CLI
//!
//! # Example
//!
//! ```rust
//! use ourtoken::deploy::{DeployOurToken, INITIAL_SUPPLY};
//! use ourtoken::token::Address;
//!
//! let deployer = Address::from_label("deployer");
//! let bob = Address::from_label("bob");
//! let alice = Address::from_label("alice");
//!
//! let mut ledger = DeployOurToken::new().run(deployer).unwrap();
//! ledger.transfer(deployer, bob, INITIAL_SUPPLY).unwrap();
//!
//! // Bob lets Alice spend 1000 units on his behalf
//! ledger.approve(bob, alice, 1000).unwrap();
//! ledger.transfer_from(alice, bob, alice, 500).unwrap();
//!
//! assert_eq!(ledger.balance_of(alice), 500);
//! assert_eq!(ledger.allowance(bob, alice), 500);
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod deploy;
pub mod service;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use deploy::{DeployOurToken, INITIAL_SUPPLY};
pub use service::SharedLedger;
pub use storage::{Storage, StorageConfig};
pub use token::{Address, Erc20, LedgerEvent, TokenError, TokenLedger};
