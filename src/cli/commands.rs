//! CLI commands for the token ledger
//!
//! Implements all command handlers for the CLI interface.

use crate::deploy::DeployOurToken;
use crate::storage::{Storage, StorageConfig};
use crate::token::{format_units, parse_units, Address, LedgerEvent, TokenInfo, TokenLedger};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub ledger: TokenLedger,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the deployed ledger from `data_dir`
    pub fn load(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "No ledger found in {:?}. Deploy one with: ourtoken deploy",
                data_dir
            )
            .into());
        }

        let ledger = storage.load()?;
        log::debug!("Loaded ledger from {:?}", data_dir);

        Ok(Self {
            ledger,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger)?;
        Ok(())
    }

    fn display(&self, amount: u128) -> String {
        format!(
            "{} {}",
            format_units(amount, self.ledger.decimals()),
            self.ledger.symbol()
        )
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(config)?)
}

/// Parse an account argument (hex or `@label`)
pub fn parse_account(input: &str) -> CliResult<Address> {
    Address::parse_account(input).map_err(|e| format!("{}: {}", input, e).into())
}

/// Parse an amount argument
///
/// Raw smallest-unit integer by default; whole tokens ("1.5") when
/// `in_tokens` is set.
pub fn parse_amount(input: &str, in_tokens: bool, decimals: u8) -> CliResult<u128> {
    if in_tokens {
        return Ok(parse_units(input, decimals)?);
    }
    input
        .trim()
        .parse::<u128>()
        .map_err(|_| format!("Invalid amount: {}", input).into())
}

/// Deploy a new ledger
pub fn cmd_deploy(data_dir: &Path, deployer: Option<Address>, force: bool) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !force {
        println!("⚠️  A ledger already exists at {:?}", data_dir);
        println!("   Use --force to redeploy (this will replace existing balances)");
        return Ok(());
    }

    let deployer = deployer.unwrap_or_else(Address::random);
    let ledger = DeployOurToken::new().run(deployer)?;
    storage.save(&ledger)?;

    println!("✅ Token deployed!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🪙 {} ({})", ledger.name(), ledger.symbol());
    println!(
        "   💰 Supply: {} minted to {}",
        format_units(ledger.total_supply(), ledger.decimals()),
        deployer
    );

    Ok(())
}

/// Display token info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let info = TokenInfo::of(&state.ledger);
    let stats = state.storage.stats()?;

    println!("🪙 Token Info");
    println!("   ├─ Name: {}", info.name);
    println!("   ├─ Symbol: {}", info.symbol);
    println!("   ├─ Decimals: {}", info.decimals);
    println!(
        "   ├─ Total supply: {} ({} raw)",
        info.total_supply_display, info.total_supply
    );
    println!("   ├─ Deployer: {}", state.ledger.metadata().deployer);
    println!("   ├─ Holders: {}", state.ledger.holder_count());
    println!(
        "   └─ Ledger file: {} bytes, {} backup(s)",
        stats.file_size, stats.backup_count
    );

    Ok(())
}

/// Show the balance of an account
pub fn cmd_balance(state: &AppState, account: Address) -> CliResult<()> {
    let balance = state.ledger.balance_of(account);

    println!("💰 Balance for {}", account);
    println!("   {} ({} raw)", state.display(balance), balance);

    Ok(())
}

/// List holders with non-zero balances
pub fn cmd_holders(state: &AppState) -> CliResult<()> {
    let holders = state.ledger.holders();

    println!("📋 Holders ({}):", holders.len());
    for (address, balance) in holders {
        println!("   {} - {}", address, state.display(balance));
    }

    Ok(())
}

/// Show a remaining allowance
pub fn cmd_allowance(state: &AppState, owner: Address, spender: Address) -> CliResult<()> {
    let allowance = state.ledger.allowance(owner, spender);

    println!("🔓 Allowance");
    println!("   ├─ Owner: {}", owner);
    println!("   ├─ Spender: {}", spender);
    println!(
        "   └─ Remaining: {} ({} raw)",
        state.display(allowance),
        allowance
    );

    Ok(())
}

/// Transfer tokens
pub fn cmd_transfer(
    state: &mut AppState,
    from: Address,
    to: Address,
    amount: u128,
) -> CliResult<()> {
    let event = state.ledger.transfer(from, to, amount)?;
    state.save()?;

    println!("📤 Transfer complete");
    println!("   ├─ From: {}", event.from);
    println!("   ├─ To: {}", event.to);
    println!("   └─ Amount: {}", state.display(event.value));

    Ok(())
}

/// Set an allowance
pub fn cmd_approve(
    state: &mut AppState,
    owner: Address,
    spender: Address,
    amount: u128,
) -> CliResult<()> {
    let event = state.ledger.approve(owner, spender, amount)?;
    state.save()?;

    println!("🔓 Approval set");
    println!("   ├─ Owner: {}", event.owner);
    println!("   ├─ Spender: {}", event.spender);
    println!("   └─ Amount: {}", state.display(event.value));

    Ok(())
}

/// Delegated transfer
pub fn cmd_transfer_from(
    state: &mut AppState,
    caller: Address,
    owner: Address,
    to: Address,
    amount: u128,
) -> CliResult<()> {
    let event = state.ledger.transfer_from(caller, owner, to, amount)?;
    state.save()?;

    println!("📤 Delegated transfer complete");
    println!("   ├─ Spender: {}", caller);
    println!("   ├─ From: {}", event.from);
    println!("   ├─ To: {}", event.to);
    println!("   ├─ Amount: {}", state.display(event.value));
    println!(
        "   └─ Allowance left: {}",
        state.display(state.ledger.allowance(owner, caller))
    );

    Ok(())
}

/// List recent events
pub fn cmd_history(state: &AppState, count: usize) -> CliResult<()> {
    let events: Vec<&LedgerEvent> = state.ledger.history().collect();
    let start = events.len().saturating_sub(count);

    println!("📜 Recent events:");
    for event in events[start..].iter().rev() {
        match event {
            LedgerEvent::Transfer(e) if e.is_mint() => println!(
                "   {} | Mint | {} | {}",
                e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                e.to,
                state.display(e.value)
            ),
            LedgerEvent::Transfer(e) => println!(
                "   {} | Transfer | {} -> {} | {}",
                e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                e.from,
                e.to,
                state.display(e.value)
            ),
            LedgerEvent::Approval(e) => println!(
                "   {} | Approval | {} allows {} | {}",
                e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                e.owner,
                e.spender,
                state.display(e.value)
            ),
        }
    }

    Ok(())
}

/// Generate a random address
pub fn cmd_address_new() -> CliResult<()> {
    println!("📍 {}", Address::random());
    Ok(())
}

/// Show the address derived from a label
pub fn cmd_address_label(label: &str) -> CliResult<()> {
    println!("📍 @{} = {}", label, Address::from_label(label));
    Ok(())
}

/// Export ledger to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.ledger, path)?;
    println!("📦 Ledger exported to {:?}", path);
    Ok(())
}

/// Import ledger from file
pub fn cmd_import(data_dir: &Path, path: &Path) -> CliResult<()> {
    let ledger = crate::storage::load_from_file(path)?;
    let storage = open_storage(data_dir)?;
    storage.save(&ledger)?;

    println!("📥 Ledger imported from {:?}", path);
    println!("   Holders: {}", ledger.holder_count());

    Ok(())
}

/// Replace the ledger with a backup (0 is the most recent)
///
/// The state being replaced is itself rotated into the backups, so a
/// restore can be undone with `restore --backup 0`.
pub fn cmd_restore(state: &mut AppState, backup: usize) -> CliResult<()> {
    let available = state.storage.list_backups();
    if !available.contains(&backup) {
        println!("❌ Backup {} not found", backup);
        println!("   Available: {:?}", available);
        return Err(format!("Backup {} not found", backup).into());
    }

    state.ledger = state.storage.restore_backup(backup)?;
    state.save()?;

    println!("♻️  Restored backup {}", backup);
    println!("   Holders: {}", state.ledger.holder_count());

    Ok(())
}
