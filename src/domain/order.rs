//! Order domain types.
//! Statuses, delivery methods and payment methods are stored as text in
//! Postgres; these enums are the typed counterparts used by the services.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Standard,
    Express,
    Pickup,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Standard => "standard",
            DeliveryMethod::Express => "express",
            DeliveryMethod::Pickup => "pickup",
        }
    }

    /// Flat delivery fee per method. Methods outside this table cost zero,
    /// but request validation rejects them before the lookup happens.
    pub fn fee(&self) -> BigDecimal {
        match self {
            DeliveryMethod::Standard => BigDecimal::from(500),
            DeliveryMethod::Express => BigDecimal::from(1500),
            DeliveryMethod::Pickup => BigDecimal::from(0),
        }
    }

    /// Human-readable delivery estimate shown on the order.
    pub fn estimated_delivery(&self, now: DateTime<Utc>) -> String {
        match self {
            DeliveryMethod::Express => (now + Duration::days(2)).format("%Y-%m-%d").to_string(),
            DeliveryMethod::Standard => (now + Duration::days(5)).format("%Y-%m-%d").to_string(),
            DeliveryMethod::Pickup => "Ready for pickup".to_string(),
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(DeliveryMethod::Standard),
            "express" => Ok(DeliveryMethod::Express),
            "pickup" => Ok(DeliveryMethod::Pickup),
            other => Err(format!("unknown delivery method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "seller" => Ok(Role::Seller),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Generate a unique human-readable tracking number, e.g. `TRK-3F0A9C2D41BE`.
pub fn new_tracking_number() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("TRK-{}", &hex[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_delivery_fees() {
        assert_eq!(DeliveryMethod::Standard.fee(), BigDecimal::from(500));
        assert_eq!(DeliveryMethod::Express.fee(), BigDecimal::from(1500));
        assert_eq!(DeliveryMethod::Pickup.fee(), BigDecimal::from(0));
    }

    #[test]
    fn test_estimated_delivery_labels() {
        let now = "2026-08-04T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(DeliveryMethod::Express.estimated_delivery(now), "2026-08-06");
        assert_eq!(DeliveryMethod::Standard.estimated_delivery(now), "2026-08-09");
        assert_eq!(
            DeliveryMethod::Pickup.estimated_delivery(now),
            "Ready for pickup"
        );
    }

    #[test]
    fn test_unknown_delivery_method_rejected() {
        assert!("drone".parse::<DeliveryMethod>().is_err());
    }

    #[test]
    fn test_tracking_number_format() {
        let tracking = new_tracking_number();
        assert!(tracking.starts_with("TRK-"));
        assert_eq!(tracking.len(), 16);
        assert!(tracking[4..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(tracking, new_tracking_number());
    }
}
