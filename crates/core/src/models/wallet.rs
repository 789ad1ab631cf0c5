use serde::{Deserialize, Serialize};

/// A place money is kept (cash, bank account, e-wallet).
///
/// `balance` is a stored running total. It is adjusted by every ledger write
/// that touches the wallet and is never recomputed from the transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub icon: String,
    pub color: String,
}

impl Wallet {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            icon: icon.into(),
            color: color.into(),
        }
    }
}

/// Wallets used when storage holds none.
pub fn default_wallets() -> Vec<Wallet> {
    vec![
        Wallet::new("cash", "Tiền mặt", 0.0, "zi-star", "#10b981"),
        Wallet::new("bank", "Ngân hàng", 0.0, "zi-user-circle", "#3b82f6"),
        Wallet::new("zalopay", "ZaloPay", 0.0, "zi-user-circle-solid", "#006af5"),
    ]
}

/// Form data for creating or editing a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInput {
    pub name: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

impl WalletInput {
    pub fn named(name: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            balance,
            icon: "zi-user-circle".to_string(),
            color: "#3b82f6".to_string(),
        }
    }
}
