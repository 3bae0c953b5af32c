//! Ledger persistence layer
//!
//! Provides save/load functionality for the token ledger.

use crate::crypto::sha256_hex;
use crate::token::TokenLedger;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ourtoken_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Ledger storage manager
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }


    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Save the ledger to disk
    pub fn save(&self, ledger: &TokenLedger) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("ledger.tmp");
        save_to_file(ledger, &temp_path)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Ledger saved to {:?}", path);
        Ok(())
    }

    /// Load the ledger from disk
    pub fn load(&self) -> Result<TokenLedger, StorageError> {
        let path = self.ledger_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Ledger file not found".to_string(),
            ));
        }

        load_from_file(&path)
    }

    /// Check if a saved ledger exists
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup (0 is the most recent)
    pub fn restore_backup(&self, backup_index: usize) -> Result<TokenLedger, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.ledger_path();

        let (file_size, checksum) = if path.exists() {
            let bytes = fs::read(&path)?;
            (bytes.len() as u64, Some(sha256_hex(&bytes)))
        } else {
            (0, None)
        };

        Ok(StorageStats {
            file_size,
            checksum,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    /// SHA-256 of the ledger file
    pub checksum: Option<String>,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Save ledger to a specific file path
pub fn save_to_file(ledger: &TokenLedger, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, ledger)?;
    Ok(())
}

/// Load ledger from a specific file path, rejecting inconsistent state
pub fn load_from_file(path: &Path) -> Result<TokenLedger, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let ledger: TokenLedger = serde_json::from_reader(reader)?;

    if !ledger.is_consistent() {
        return Err(StorageError::InvalidData(format!(
            "Balances in {:?} do not sum to the total supply",
            path
        )));
    }

    Ok(ledger)
}
