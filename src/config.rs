use std::env;

use crate::pricing::FeeRates;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Platform percentage cut of an order's value.
    pub application_fee_rate: f64,
    /// Credit-card surcharge rate passed on to customers.
    pub customer_cc_rate: f64,
    /// Rate for the expedited payout path.
    pub instant_transfer_fee_rate: f64,
    /// Delivery charge per mile between vendor and delivery location.
    pub delivery_fee_per_mile: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        Ok(Self {
            database_url,
            host,
            port,
            application_fee_rate: rate_from_env("APPLICATION_FEE_RATE", 0.1),
            customer_cc_rate: rate_from_env("CUSTOMER_CC_RATE", 0.029),
            instant_transfer_fee_rate: rate_from_env("INSTANT_TRANSFER_FEE_RATE", 0.15),
            delivery_fee_per_mile: rate_from_env("DELIVERY_FEE_PER_MILE", 2.0),
        })
    }

    pub fn fee_rates(&self) -> FeeRates {
        FeeRates {
            application: self.application_fee_rate,
            customer_cc: self.customer_cc_rate,
            instant_transfer: self.instant_transfer_fee_rate,
        }
    }
}

fn rate_from_env(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}
