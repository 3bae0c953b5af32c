//! Deployment routine for OurToken
//!
//! Mints the standard initial supply of 100 whole tokens to the deploying
//! account and hands back the constructed ledger.

use crate::token::{Address, TokenError, TokenLedger, TOKEN_DECIMALS};

/// 100 tokens at 18 decimals
pub const INITIAL_SUPPLY: u128 = 100 * 10u128.pow(TOKEN_DECIMALS as u32);

/// Deploys the token ledger
#[derive(Debug, Clone, Copy)]
pub struct DeployOurToken {
    initial_supply: u128,
}

impl Default for DeployOurToken {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployOurToken {
    pub fn new() -> Self {
        Self {
            initial_supply: INITIAL_SUPPLY,
        }
    }

    /// Deploy with a non-standard supply
    pub fn with_supply(initial_supply: u128) -> Self {
        Self { initial_supply }
    }

    /// Construct the ledger with the whole supply credited to `deployer`
    pub fn run(&self, deployer: Address) -> Result<TokenLedger, TokenError> {
        let ledger = TokenLedger::new(self.initial_supply, deployer)?;

        log::info!(
            "Token deployed: {} ({}) supply {} to {}",
            ledger.name(),
            ledger.symbol(),
            ledger.total_supply(),
            deployer
        );

        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_supply_constant() {
        assert_eq!(INITIAL_SUPPLY, 100_000_000_000_000_000_000);
    }

    #[test]
    fn test_deploy() {
        let deployer = Address::from_label("deployer");
        let ledger = DeployOurToken::new().run(deployer).unwrap();

        assert_eq!(ledger.total_supply(), INITIAL_SUPPLY);
        assert_eq!(ledger.balance_of(deployer), INITIAL_SUPPLY);
        assert_eq!(ledger.holder_count(), 1);
    }

    #[test]
    fn test_deploy_custom_supply() {
        let deployer = Address::from_label("deployer");
        let ledger = DeployOurToken::with_supply(5).run(deployer).unwrap();
        assert_eq!(ledger.total_supply(), 5);

        assert_eq!(
            DeployOurToken::new().run(Address::ZERO).unwrap_err(),
            TokenError::InvalidDeployer
        );
    }
}
