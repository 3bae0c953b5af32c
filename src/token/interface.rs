//! The ERC-20 capability set
//!
//! [`Erc20`] is the external contract of a token: metadata, balances,
//! allowances and the three mutating operations. The acting account is
//! always passed explicitly.

use crate::token::address::Address;
use crate::token::amount::{self, format_units};
use crate::token::events::{ApprovalEvent, TransferEvent};
use crate::token::ledger::{TokenError, TokenLedger};
use serde::Serialize;

pub trait Erc20 {
    fn name(&self) -> &str;
    fn symbol(&self) -> &str;
    fn decimals(&self) -> u8;
    fn total_supply(&self) -> u128;
    fn balance_of(&self, account: Address) -> u128;
    fn allowance(&self, owner: Address, spender: Address) -> u128;

    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: u128,
    ) -> Result<TransferEvent, TokenError>;

    fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        value: u128,
    ) -> Result<ApprovalEvent, TokenError>;

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: u128,
    ) -> Result<TransferEvent, TokenError>;
}

impl Erc20 for TokenLedger {
    fn name(&self) -> &str {
        TokenLedger::name(self)
    }

    fn symbol(&self) -> &str {
        TokenLedger::symbol(self)
    }

    fn decimals(&self) -> u8 {
        TokenLedger::decimals(self)
    }

    fn total_supply(&self) -> u128 {
        TokenLedger::total_supply(self)
    }

    fn balance_of(&self, account: Address) -> u128 {
        TokenLedger::balance_of(self, account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u128 {
        TokenLedger::allowance(self, owner, spender)
    }

    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: u128,
    ) -> Result<TransferEvent, TokenError> {
        TokenLedger::transfer(self, caller, to, value)
    }

    fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        value: u128,
    ) -> Result<ApprovalEvent, TokenError> {
        TokenLedger::approve(self, caller, spender, value)
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: u128,
    ) -> Result<TransferEvent, TokenError> {
        TokenLedger::transfer_from(self, caller, from, to, value)
    }
}

/// Token summary returned by the query surfaces
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "amount::as_string")]
    pub total_supply: u128,
    /// Total supply in whole tokens ("100")
    pub total_supply_display: String,
}

impl TokenInfo {
    pub fn of<T: Erc20 + ?Sized>(token: &T) -> Self {
        Self {
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            decimals: token.decimals(),
            total_supply: token.total_supply(),
            total_supply_display: format_units(token.total_supply(), token.decimals()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pay_through<T: Erc20>(token: &mut T, from: Address, to: Address, value: u128) {
        let middle = Address::from_label("middle");
        token.approve(from, middle, value).unwrap();
        token.transfer_from(middle, from, to, value).unwrap();
    }

    #[test]
    fn test_generic_usage() {
        let deployer = Address::from_label("deployer");
        let target = Address::from_label("target");
        let mut ledger = TokenLedger::new(1_000, deployer).unwrap();

        pay_through(&mut ledger, deployer, target, 400);

        let token: &dyn Erc20 = &ledger;
        assert_eq!(token.balance_of(target), 400);
        assert_eq!(token.balance_of(deployer), 600);
        assert_eq!(token.allowance(deployer, Address::from_label("middle")), 0);
    }

    #[test]
    fn test_token_info() {
        let ledger =
            TokenLedger::new(100_000_000_000_000_000_000, Address::from_label("d")).unwrap();
        let info = TokenInfo::of(&ledger);

        assert_eq!(info.name, "OurToken");
        assert_eq!(info.symbol, "OT");
        assert_eq!(info.decimals, 18);
        assert_eq!(info.total_supply, 100_000_000_000_000_000_000);
        assert_eq!(info.total_supply_display, "100");

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"total_supply\":\"100000000000000000000\""));
    }
}
