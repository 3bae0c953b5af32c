//! ERC-20 style fixed-supply token ledger
//!
//! Provides the OurToken ledger with:
//! - Balances per address
//! - Allowances for delegated transfers
//! - Transfer and approval notifications
//!
//! # Example
//!
//! ```
//! use ourtoken::token::{Address, TokenLedger};
//!
//! let deployer = Address::from_label("deployer");
//! let bob = Address::from_label("bob");
//!
//! let mut ledger = TokenLedger::new(1_000, deployer).unwrap();
//! ledger.transfer(deployer, bob, 250).unwrap();
//!
//! assert_eq!(ledger.balance_of(bob), 250);
//! assert_eq!(ledger.total_supply(), 1_000);
//! ```

pub mod address;
pub mod amount;
pub mod events;
pub mod interface;
pub mod ledger;

pub use address::{Address, AddressError};
pub use amount::{format_units, parse_units, AmountError};
pub use events::{ApprovalEvent, LedgerEvent, TransferEvent};
pub use interface::{Erc20, TokenInfo};
pub use ledger::{
    TokenError, TokenLedger, TokenMetadata, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL,
    UNLIMITED_ALLOWANCE,
};
