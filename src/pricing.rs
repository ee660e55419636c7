use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Role,
};

/// External rate parameters, loaded from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FeeRates {
    pub application: f64,
    pub customer_cc: f64,
    pub instant_transfer: f64,
}

/// The monetary fields of an order that feed the fee calculation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeInputs {
    pub amount: Option<f64>,
    pub offered_amount: Option<f64>,
    pub is_setup: bool,
    pub setup_fee: f64,
    pub delivery_fee: f64,
    pub is_instant_transfer: bool,
}

/// Role-specific fee view attached to order listings.
#[derive(Debug, Clone, PartialEq, Serialize, Default, ToSchema)]
pub struct FeeBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_charge_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_charge_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instant_transfer_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instant_transfer_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_receivable: Option<f64>,
    pub sub_total: f64,
}

/// Derives the role-specific charges for one order. Pure and deterministic:
/// identical inputs and rates always produce an identical breakdown.
pub fn calculate_order_charges(
    order: &FeeInputs,
    role: Role,
    rates: &FeeRates,
) -> AppResult<FeeBreakdown> {
    let order_amount = order
        .amount
        .or(order.offered_amount)
        .ok_or_else(|| {
            AppError::Validation("Either amount or offered amount must be present".to_string())
        })?;

    let cc_charge = order_amount * rates.customer_cc;
    let mut breakdown = FeeBreakdown::default();

    match role {
        Role::Customer => {
            breakdown.cc_charge_rate = Some(rates.customer_cc);
            breakdown.cc_charge = Some(cc_charge);
        }
        Role::Vendor => {
            let platform_rate = if order.is_instant_transfer {
                rates.instant_transfer
            } else {
                rates.application
            };
            let platform_charge = (order_amount * platform_rate).floor();
            let instant_fee = if order.is_instant_transfer {
                (order_amount * rates.instant_transfer).floor()
            } else {
                0.0
            };

            if order.is_instant_transfer {
                breakdown.instant_transfer_rate = Some(rates.instant_transfer);
                breakdown.instant_transfer_fee = Some(instant_fee);
            } else {
                breakdown.application_charge_rate = Some(rates.application);
            }

            let setup_fee = if order.is_setup { order.setup_fee } else { 0.0 };
            breakdown.application_charge = Some(platform_charge);
            breakdown.vendor_receivable = Some(
                (order_amount + setup_fee + order.delivery_fee
                    - platform_charge
                    - instant_fee
                    - cc_charge)
                    .floor(),
            );
        }
    }

    breakdown.sub_total =
        (order_amount + order.setup_fee + order.delivery_fee + cc_charge).floor();

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: FeeRates = FeeRates {
        application: 0.1,
        customer_cc: 0.029,
        instant_transfer: 0.15,
    };

    fn accepted_order(amount: f64) -> FeeInputs {
        FeeInputs {
            amount: Some(amount),
            ..FeeInputs::default()
        }
    }

    #[test]
    fn vendor_view_standard_transfer() {
        let fees = calculate_order_charges(&accepted_order(100.0), Role::Vendor, &RATES).unwrap();
        assert_eq!(fees.application_charge, Some(10.0));
        assert_eq!(fees.application_charge_rate, Some(0.1));
        assert_eq!(fees.instant_transfer_fee, None);
        // floor(100 - 10 - 2.9)
        assert_eq!(fees.vendor_receivable, Some(87.0));
    }

    #[test]
    fn vendor_view_instant_transfer() {
        let order = FeeInputs {
            is_instant_transfer: true,
            ..accepted_order(200.0)
        };
        let fees = calculate_order_charges(&order, Role::Vendor, &RATES).unwrap();
        assert_eq!(fees.application_charge, Some(30.0));
        assert_eq!(fees.instant_transfer_fee, Some(30.0));
        assert_eq!(fees.instant_transfer_rate, Some(0.15));
        assert_eq!(fees.application_charge_rate, None);
        // floor(200 - 30 - 30 - 5.8)
        assert_eq!(fees.vendor_receivable, Some(134.0));
    }

    #[test]
    fn customer_view_carries_cc_charge() {
        let fees = calculate_order_charges(&accepted_order(100.0), Role::Customer, &RATES).unwrap();
        assert_eq!(fees.cc_charge, Some(2.9));
        assert_eq!(fees.cc_charge_rate, Some(0.029));
        assert_eq!(fees.vendor_receivable, None);
        // floor(100 + 2.9)
        assert_eq!(fees.sub_total, 102.0);
    }

    #[test]
    fn falls_back_to_offered_amount() {
        let order = FeeInputs {
            offered_amount: Some(50.0),
            ..FeeInputs::default()
        };
        let fees = calculate_order_charges(&order, Role::Customer, &RATES).unwrap();
        assert_eq!(fees.cc_charge, Some(50.0 * 0.029));
    }

    #[test]
    fn missing_amount_is_rejected() {
        let err =
            calculate_order_charges(&FeeInputs::default(), Role::Vendor, &RATES).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let order = FeeInputs {
            is_setup: true,
            setup_fee: 25.0,
            delivery_fee: 12.5,
            is_instant_transfer: true,
            ..accepted_order(317.43)
        };
        let first = calculate_order_charges(&order, Role::Vendor, &RATES).unwrap();
        let second = calculate_order_charges(&order, Role::Vendor, &RATES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn vendor_charges_reconcile_with_order_total() {
        let order = FeeInputs {
            is_setup: true,
            setup_fee: 25.0,
            delivery_fee: 12.5,
            ..accepted_order(317.0)
        };
        let fees = calculate_order_charges(&order, Role::Vendor, &RATES).unwrap();
        let cc_charge = 317.0 * RATES.customer_cc;
        let total = fees.vendor_receivable.unwrap()
            + fees.application_charge.unwrap()
            + fees.instant_transfer_fee.unwrap_or(0.0)
            + cc_charge;
        let gross = 317.0 + 25.0 + 12.5;
        assert!((total - gross).abs() < 1.0, "receivable must reconcile to within rounding");
    }
}
