use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// How checkout settles payment. The two policies mirror the two order
/// flows the platform supports: synchronous wallet debit at checkout, or
/// deferred payment collected outside the order core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutPolicy {
    /// Wallet payments are debited inside the checkout transaction and the
    /// order starts in `processing`. Non-wallet orders start `pending`.
    WalletSync,
    /// Every order starts `pending`; no wallet debit happens at checkout.
    Deferred,
}

impl FromStr for CheckoutPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet-sync" => Ok(CheckoutPolicy::WalletSync),
            "deferred" => Ok(CheckoutPolicy::Deferred),
            other => anyhow::bail!(
                "invalid CHECKOUT_POLICY '{}' (expected 'wallet-sync' or 'deferred')",
                other
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth_secret: String,
    pub checkout_policy: CheckoutPolicy,
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            auth_secret: env::var("AUTH_SECRET")?,
            checkout_policy: env::var("CHECKOUT_POLICY")
                .unwrap_or_else(|_| "wallet-sync".to_string())
                .parse()?,
            reconcile_interval_secs: env::var("RECONCILE_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_policy_parse() {
        assert_eq!(
            "wallet-sync".parse::<CheckoutPolicy>().unwrap(),
            CheckoutPolicy::WalletSync
        );
        assert_eq!(
            "deferred".parse::<CheckoutPolicy>().unwrap(),
            CheckoutPolicy::Deferred
        );
        assert!("instant".parse::<CheckoutPolicy>().is_err());
    }
}
