//! Fixed-supply ERC-20 style ledger
//!
//! Holds balances and allowances for a single fungible token. The whole
//! supply is minted to the deployer on construction and is never changed
//! afterwards; every mutation either applies completely or not at all.

use crate::token::address::Address;
use crate::token::events::{ApprovalEvent, LedgerEvent, TransferEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Token name
pub const TOKEN_NAME: &str = "OurToken";
/// Token symbol
pub const TOKEN_SYMBOL: &str = "OT";
/// Decimal places
pub const TOKEN_DECIMALS: u8 = 18;

/// Allowance value that is never decremented by `transfer_from`
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

/// Number of events kept in the in-memory history
const MAX_HISTORY: usize = 100;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },
    #[error("Invalid recipient: cannot transfer to the zero address")]
    InvalidRecipient,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
    #[error("Invalid deployer: cannot mint to the zero address")]
    InvalidDeployer,
}

/// Token metadata (immutable after construction)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Total supply (fixed at construction)
    #[serde(with = "crate::token::amount::as_string")]
    pub total_supply: u128,
    /// Address credited with the initial supply
    pub deployer: Address,
    pub created_at: DateTime<Utc>,
}

/// The OurToken ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenLedger {
    metadata: TokenMetadata,
    /// Balances: address -> amount
    balances: HashMap<Address, u128>,
    /// Allowances: owner -> (spender -> amount)
    allowances: HashMap<Address, HashMap<Address, u128>>,
    /// Recent events, oldest first
    history: VecDeque<LedgerEvent>,
}

impl TokenLedger {
    /// Create the ledger and mint `initial_supply` to `deployer`
    pub fn new(initial_supply: u128, deployer: Address) -> Result<Self, TokenError> {
        if initial_supply == 0 {
            return Err(TokenError::InvalidSupply);
        }
        if deployer.is_zero() {
            return Err(TokenError::InvalidDeployer);
        }

        let mut balances = HashMap::new();
        balances.insert(deployer, initial_supply);

        let mut ledger = Self {
            metadata: TokenMetadata {
                name: TOKEN_NAME.to_string(),
                symbol: TOKEN_SYMBOL.to_string(),
                decimals: TOKEN_DECIMALS,
                total_supply: initial_supply,
                deployer,
                created_at: Utc::now(),
            },
            balances,
            allowances: HashMap::new(),
            history: VecDeque::new(),
        };

        ledger.record(TransferEvent::new(Address::ZERO, deployer, initial_supply).into());
        Ok(ledger)
    }

    // =========================================================================
    // View Functions
    // =========================================================================

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.metadata.total_supply
    }

    /// Get balance of an address (zero if never credited)
    pub fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Get the amount `spender` may still move out of `owner`'s balance
    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    /// All holders with a non-zero balance, sorted by address
    pub fn holders(&self) -> Vec<(Address, u128)> {
        let mut holders: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, &b)| b > 0)
            .map(|(a, b)| (*a, *b))
            .collect();
        holders.sort();
        holders
    }

    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    /// Recent events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.history.iter()
    }

    /// Sum of all balances (always equal to the total supply)
    pub fn circulating(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Check the conservation invariant
    ///
    /// Only fails for state that did not come from this type's operations,
    /// such as a hand-edited ledger file.
    pub fn is_consistent(&self) -> bool {
        let sum = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b));
        sum == Some(self.metadata.total_supply)
    }

    // =========================================================================
    // Mutating Functions
    // =========================================================================

    /// Move `amount` from `from` to `to`
    ///
    /// Zero-amount and self transfers are valid and still emit an event.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        self.move_balance(from, to, amount);

        let event = TransferEvent::new(from, to, amount);
        self.record(event.clone().into());
        log::debug!("transfer {} -> {}: {}", from, to, amount);

        Ok(event)
    }

    /// Set the allowance of `spender` over `owner`'s balance
    ///
    /// Overwrites any previous value; `0` revokes.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<ApprovalEvent, TokenError> {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);

        let event = ApprovalEvent::new(owner, spender, amount);
        self.record(event.clone().into());
        log::debug!("approve {} for {}: {}", spender, owner, amount);

        Ok(event)
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`
    ///
    /// Requires a prior `approve(from, spender, >= amount)`. All checks run
    /// before any state is touched.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        let current_allowance = self.allowance(from, spender);
        if current_allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                have: current_allowance,
                need: amount,
            });
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        if current_allowance != UNLIMITED_ALLOWANCE {
            if let Some(allowance) = self
                .allowances
                .get_mut(&from)
                .and_then(|spenders| spenders.get_mut(&spender))
            {
                *allowance -= amount;
            }
        }
        self.move_balance(from, to, amount);

        let event = TransferEvent::new(from, to, amount);
        self.record(event.clone().into());
        log::debug!(
            "transfer_from {} -> {} by {}: {}",
            from,
            to,
            spender,
            amount
        );

        Ok(event)
    }

    /// Debit then credit; caller has already checked the balance
    fn move_balance(&mut self, from: Address, to: Address, amount: u128) {
        *self.balances.entry(from).or_insert(0) -= amount;
        // Cannot overflow: every balance is bounded by the fixed supply
        *self.balances.entry(to).or_insert(0) += amount;
    }

    fn record(&mut self, event: LedgerEvent) {
        self.history.push_back(event);
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }
}
