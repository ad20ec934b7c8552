/// Store front — wallet and a purchasable item catalog.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::inventory::Inventory;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("item not sold here: {0}")]
    UnknownItem(String),
    #[error("already owned: {0}")]
    AlreadyOwned(String),
    #[error("insufficient funds: need {price}, have {balance}")]
    InsufficientFunds { price: u32, balance: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// In-game currency earned from minigames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    balance: u32,
}

impl Wallet {
    pub fn with_balance(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: u32) -> Result<(), ShopError> {
        if amount > self.balance {
            return Err(ShopError::InsufficientFunds {
                price: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub price: u32,
    #[serde(default)]
    pub description: String,
}

/// The vending catalog. Items are listed in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub items: Vec<ShopItem>,
}

impl Shop {
    pub fn load_from_ron(path: &Path) -> Result<Shop, ShopError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Shop, ShopError> {
        Ok(ron::from_str(input)?)
    }

    pub fn item(&self, name: &str) -> Option<&ShopItem> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Charge `wallet` for `name`. Items are one-of-a-kind, so anything
    /// already in `owned` is refused before any money moves.
    pub fn purchase(
        &self,
        name: &str,
        wallet: &mut Wallet,
        owned: &Inventory,
    ) -> Result<&ShopItem, ShopError> {
        let item = self
            .item(name)
            .ok_or_else(|| ShopError::UnknownItem(name.to_string()))?;
        if owned.contains(&item.name) {
            return Err(ShopError::AlreadyOwned(item.name.clone()));
        }
        wallet.debit(item.price)?;
        Ok(item)
    }
}
