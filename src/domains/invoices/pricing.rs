//! Invoice total and discount computation.
//!
//! `total = amount + tax - discount_amount`, where the discount amount is
//! derived once from `(amount, discount_type, discount_value)`. All money
//! values are kept at two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use shared::{AppError, FieldViolation};
use thiserror::Error;

use super::models::DiscountType;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Discount cannot be negative: {value}")]
    NegativeDiscount { value: Decimal },

    #[error("Percentage discount must be between 0 and 100: {value}")]
    PercentageOutOfRange { value: Decimal },

    #[error("Discount {discount_amount} exceeds invoice total {base_total}")]
    DiscountExceedsTotal {
        discount_amount: Decimal,
        base_total: Decimal,
    },

    #[error("Invoice {field} is too large")]
    Overflow { field: &'static str },
}

impl PricingError {
    fn field(&self) -> &'static str {
        match self {
            PricingError::Overflow { field } => *field,
            _ => "discount",
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::validation_with(
            "Please provide valid inputs.",
            vec![FieldViolation::new(err.field(), err.to_string())],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedInvoice {
    pub base_total: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

/// Rounds to two decimal places and pins the scale so `470` renders as `470.00`.
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Amount due before any discount.
pub fn base_total(amount: Decimal, tax_amount: Option<Decimal>) -> Result<Decimal, PricingError> {
    amount
        .checked_add(tax_amount.unwrap_or(Decimal::ZERO))
        .map(money)
        .ok_or(PricingError::Overflow { field: "taxAmount" })
}

/// Discount amount for a discount specification.
///
/// `Direct` takes the value as-is, `Percentage` takes `amount * value / 100`.
/// A missing type or value yields zero.
pub fn apply_discount(
    amount: Decimal,
    discount_type: Option<DiscountType>,
    discount_value: Option<Decimal>,
) -> Result<Decimal, PricingError> {
    let value = match discount_value {
        Some(value) => value,
        None => return Ok(money(Decimal::ZERO)),
    };

    match discount_type {
        Some(DiscountType::Direct) => Ok(money(value)),
        Some(DiscountType::Percentage) => amount
            .checked_mul(value)
            .and_then(|scaled| scaled.checked_div(HUNDRED))
            .map(money)
            .ok_or(PricingError::Overflow { field: "discount" }),
        None => Ok(money(Decimal::ZERO)),
    }
}

/// Full pricing for a draft. Rejects negative discounts, percentages above
/// 100 and discounts that would drive the total below zero.
pub fn price_invoice(
    amount: Decimal,
    tax_amount: Option<Decimal>,
    discount_type: Option<DiscountType>,
    discount_value: Option<Decimal>,
) -> Result<PricedInvoice, PricingError> {
    if let Some(value) = discount_value {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PricingError::NegativeDiscount { value });
        }
        if discount_type == Some(DiscountType::Percentage) && value > HUNDRED {
            return Err(PricingError::PercentageOutOfRange { value });
        }
    }

    let base_total = base_total(amount, tax_amount)?;
    let discount_amount = apply_discount(amount, discount_type, discount_value)?;

    if discount_amount > base_total {
        return Err(PricingError::DiscountExceedsTotal {
            discount_amount,
            base_total,
        });
    }

    Ok(PricedInvoice {
        base_total,
        discount_amount,
        total_amount: money(base_total - discount_amount),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_direct_discount() {
        assert_eq!(
            apply_discount(dec("500"), Some(DiscountType::Direct), Some(dec("50"))),
            Ok(dec("50.00"))
        );
    }

    #[test]
    fn test_percentage_discount() {
        assert_eq!(
            apply_discount(dec("1000"), Some(DiscountType::Percentage), Some(dec("10"))),
            Ok(dec("100.00"))
        );
        assert_eq!(
            apply_discount(dec("99.99"), Some(DiscountType::Percentage), Some(dec("12.5"))),
            Ok(dec("12.50"))
        );
    }

    #[test]
    fn test_missing_specification_is_zero() {
        assert_eq!(apply_discount(dec("500"), None, Some(dec("50"))), Ok(Decimal::ZERO));
        assert_eq!(apply_discount(dec("500"), Some(DiscountType::Direct), None), Ok(Decimal::ZERO));
        assert_eq!(apply_discount(dec("500"), None, None), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_tax_is_part_of_base_total() {
        let priced = price_invoice(
            dec("500"),
            Some(dec("20")),
            Some(DiscountType::Direct),
            Some(dec("50")),
        )
        .unwrap();

        assert_eq!(priced.base_total, dec("520"));
        assert_eq!(priced.discount_amount, dec("50"));
        assert_eq!(priced.total_amount, dec("470"));
    }

    #[test]
    fn test_percentage_is_taken_from_amount_not_tax() {
        let priced = price_invoice(
            dec("1000"),
            Some(dec("180")),
            Some(DiscountType::Percentage),
            Some(dec("10")),
        )
        .unwrap();

        assert_eq!(priced.discount_amount, dec("100"));
        assert_eq!(priced.total_amount, dec("1080"));
    }

    #[test]
    fn test_no_discount_keeps_base_total() {
        let priced = price_invoice(dec("250.50"), None, None, None).unwrap();
        assert_eq!(priced.total_amount, priced.base_total);
        assert_eq!(priced.total_amount, dec("250.50"));
    }

    #[test]
    fn test_discount_equal_to_total_is_allowed() {
        let priced =
            price_invoice(dec("100"), None, Some(DiscountType::Percentage), Some(dec("100")))
                .unwrap();
        assert_eq!(priced.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_discount_is_rejected() {
        let err = price_invoice(dec("100"), None, Some(DiscountType::Direct), Some(dec("150")))
            .unwrap_err();
        assert!(matches!(err, PricingError::DiscountExceedsTotal { .. }));
    }

    #[test]
    fn test_negative_discount_is_rejected() {
        let err = price_invoice(dec("100"), None, Some(DiscountType::Direct), Some(dec("-5")))
            .unwrap_err();
        assert_eq!(err, PricingError::NegativeDiscount { value: dec("-5") });
    }

    #[test]
    fn test_percentage_above_hundred_is_rejected() {
        let err = price_invoice(
            dec("100"),
            Some(dec("50")),
            Some(DiscountType::Percentage),
            Some(dec("120")),
        )
        .unwrap_err();
        assert_eq!(err, PricingError::PercentageOutOfRange { value: dec("120") });

        // Direct discounts are bounded by the total, not by 100.
        let priced =
            price_invoice(dec("100"), Some(dec("50")), Some(DiscountType::Direct), Some(dec("120")))
                .unwrap();
        assert_eq!(priced.total_amount, dec("30"));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = dec("70000000000000000000000000000");
        assert_eq!(
            price_invoice(huge, Some(huge), None, None).unwrap_err(),
            PricingError::Overflow { field: "taxAmount" }
        );

        let big = dec("10000000000000000000");
        assert_eq!(
            apply_discount(big, Some(DiscountType::Percentage), Some(big)),
            Err(PricingError::Overflow { field: "discount" })
        );

        let err: AppError = PricingError::Overflow { field: "taxAmount" }.into();
        match err {
            AppError::Validation { violations, .. } => assert_eq!(violations[0].field, "taxAmount"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_money_scale() {
        assert_eq!(money(dec("470")).to_string(), "470.00");
        assert_eq!(money(dec("12.345")).to_string(), "12.35");
    }
}
