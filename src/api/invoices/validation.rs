use rust_decimal::Decimal;
use serde_json::Value;
use shared::{AppError, FieldViolation, Page, Result};
use tracing::warn;
use validator::Validate;

use crate::api::invoices::models::{
    InvoiceListQuery, InvoiceRequest, PatchInvoiceRequest, UpdateInvoiceRequest,
};
use crate::domains::invoices::{DiscountType, InvoiceChanges, InvoiceDraft};

const INVALID_INPUTS: &str = "Please provide valid inputs.";

/// Largest value a `NUMERIC(10,2)` column holds.
const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

// ============================================================================
// REQUEST CONVERSION
// ============================================================================

pub fn validate_create_request(request: InvoiceRequest) -> Result<InvoiceDraft> {
    validate_with_money(&request, &money_fields(&request, None))?;

    let (amount, payment_mode, shop_id, customer_id) = match (
        request.amount,
        request.payment_mode,
        request.shop_id,
        request.customer_id,
    ) {
        (Some(amount), Some(payment_mode), Some(shop_id), Some(customer_id)) => {
            (amount, payment_mode, shop_id, customer_id)
        }
        _ => return Err(AppError::validation(INVALID_INPUTS)),
    };

    Ok(InvoiceDraft {
        invoice_number: request.invoice_number,
        amount,
        payment_mode,
        shop_id,
        customer_id,
        discount: request.discount,
        discount_type: parse_discount_type(request.discount_type.as_deref()),
        tax_amount: request.tax_amount,
        due_date: request.due_date,
        status: request.status,
    })
}

pub fn validate_update_request(request: UpdateInvoiceRequest) -> Result<InvoiceChanges> {
    let total_amount = request.total_amount;
    validate_with_money(
        &request.invoice,
        &money_fields(&request.invoice, total_amount),
    )?;

    let invoice = request.invoice;
    Ok(InvoiceChanges {
        invoice_number: invoice.invoice_number,
        amount: invoice.amount,
        payment_mode: invoice.payment_mode,
        discount: invoice.discount,
        discount_type: parse_discount_type(invoice.discount_type.as_deref()),
        tax_amount: invoice.tax_amount,
        total_amount,
        status: invoice.status,
        due_date: invoice.due_date,
        shop_id: invoice.shop_id,
        customer_id: invoice.customer_id,
    })
}

/// Returns the target id and the changes to apply.
pub fn validate_patch_request(request: PatchInvoiceRequest) -> Result<(i32, InvoiceChanges)> {
    let money = [
        ("amount", request.amount),
        ("discount", request.discount),
        ("taxAmount", request.tax_amount),
        ("totalAmount", request.total_amount),
    ];
    let mut violations = collect_violations(&request);
    violations.extend(check_money(&money));

    let invoice_id = match request.id.as_ref().map(parse_json_id) {
        Some(Ok(id)) => Some(id),
        Some(Err(violation)) => {
            violations.push(violation);
            None
        }
        None => {
            violations.push(FieldViolation::new("id", "Invoice id is required"));
            None
        }
    };

    if !violations.is_empty() {
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(AppError::validation_with(INVALID_INPUTS, violations));
    }
    let invoice_id = invoice_id.ok_or_else(|| AppError::validation(INVALID_INPUTS))?;

    let changes = InvoiceChanges {
        invoice_number: request.invoice_number,
        amount: request.amount,
        payment_mode: request.payment_mode,
        discount: request.discount,
        discount_type: parse_discount_type(request.discount_type.as_deref()),
        tax_amount: request.tax_amount,
        total_amount: request.total_amount,
        status: request.status,
        due_date: request.due_date,
        shop_id: request.shop_id,
        customer_id: request.customer_id,
    };
    Ok((invoice_id, changes))
}

/// Paging for `GET /invoices`. Missing values fall back to the defaults.
pub fn parse_page(query: &InvoiceListQuery) -> Result<Page> {
    let mut violations = Vec::new();

    let limit = parse_positive(
        query.limit.as_deref(),
        "limit",
        Page::DEFAULT_LIMIT,
        Page::MAX_LIMIT,
    )
    .map_err(|v| violations.push(v))
    .ok();
    let page_number = parse_positive(
        query.page_number.as_deref(),
        "pageNumber",
        Page::DEFAULT_PAGE_NUMBER,
        i64::MAX,
    )
    .map_err(|v| violations.push(v))
    .ok();

    match (limit, page_number) {
        (Some(limit), Some(page_number)) => {
            let page = Page::new(limit, page_number);
            if page.offset().is_none() {
                return Err(AppError::validation_with(
                    INVALID_INPUTS,
                    vec![FieldViolation::new("pageNumber", "pageNumber is out of range")],
                ));
            }
            Ok(page)
        }
        _ => Err(AppError::validation_with(INVALID_INPUTS, violations)),
    }
}

/// Path ids must be positive integers.
pub fn parse_path_id(raw: &str, field: &str) -> Result<i32> {
    parse_id(raw, field).map_err(|violation| AppError::validation_with(INVALID_INPUTS, vec![violation]))
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

fn parse_discount_type(raw: Option<&str>) -> Option<DiscountType> {
    let raw = raw?;
    let parsed = DiscountType::parse(raw);
    if parsed.is_none() {
        warn!("Unrecognized discount type '{}', treating as no discount", raw);
    }
    parsed
}

fn parse_id(raw: &str, field: &str) -> std::result::Result<i32, FieldViolation> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(FieldViolation::new(
            field,
            format!("{} must be a positive integer", field),
        )),
    }
}

fn parse_json_id(value: &Value) -> std::result::Result<i32, FieldViolation> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| FieldViolation::new("id", "id must be a positive integer")),
        Value::String(s) => parse_id(s, "id"),
        _ => Err(FieldViolation::new("id", "id must be a positive integer")),
    }
}

fn parse_positive(
    raw: Option<&str>,
    field: &str,
    default: i64,
    max: i64,
) -> std::result::Result<i64, FieldViolation> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value > max => Err(FieldViolation::new(
                field,
                format!("{} must not exceed {}", field, max),
            )),
            Ok(value) if value > 0 => Ok(value),
            _ => Err(FieldViolation::new(
                field,
                format!("{} must be a positive integer", field),
            )),
        },
    }
}

fn money_fields(
    request: &InvoiceRequest,
    total_amount: Option<Decimal>,
) -> [(&'static str, Option<Decimal>); 4] {
    [
        ("amount", request.amount),
        ("discount", request.discount),
        ("taxAmount", request.tax_amount),
        ("totalAmount", total_amount),
    ]
}

/// Money must be non-negative, fit `NUMERIC(10,2)` and carry at most two
/// decimal places.
fn check_money(fields: &[(&'static str, Option<Decimal>)]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for (field, value) in fields {
        let Some(value) = value else { continue };
        if value.is_sign_negative() && !value.is_zero() {
            violations.push(FieldViolation::new(*field, format!("{} cannot be negative", field)));
        } else if *value > MAX_MONEY {
            violations.push(FieldViolation::new(
                *field,
                format!("{} must not exceed {}", field, MAX_MONEY),
            ));
        } else if value.normalize().scale() > 2 {
            violations.push(FieldViolation::new(
                *field,
                format!("{} must have at most 2 decimal places", field),
            ));
        }
    }
    violations
}

fn collect_violations<T: Validate>(request: &T) -> Vec<FieldViolation> {
    match request.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match AppError::from(errors) {
            AppError::Validation { violations, .. } => violations,
            _ => Vec::new(),
        },
    }
}

fn validate_with_money<T: Validate>(
    request: &T,
    money: &[(&'static str, Option<Decimal>)],
) -> Result<()> {
    let mut violations = collect_violations(request);
    violations.extend(check_money(money));

    if violations.is_empty() {
        Ok(())
    } else {
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Err(AppError::validation_with(INVALID_INPUTS, violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn valid_request() -> InvoiceRequest {
        serde_json::from_value(json!({
            "amount": 1000,
            "paymentMode": "Cash",
            "shop": 1,
            "customer": 2,
            "discount": 10,
            "discountType": "Percentage"
        }))
        .unwrap()
    }

    fn violations(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation { violations, .. } => {
                violations.into_iter().map(|v| v.field).collect()
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_create_request() {
        let draft = validate_create_request(valid_request()).unwrap();
        assert_eq!(draft.shop_id, 1);
        assert_eq!(draft.customer_id, 2);
        assert_eq!(draft.discount_type, Some(DiscountType::Percentage));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = validate_create_request(InvoiceRequest::default()).unwrap_err();
        assert_eq!(
            violations(err),
            vec!["amount", "customerId", "paymentMode", "shopId"]
        );
    }

    #[test]
    fn test_money_rules() {
        let mut request = valid_request();
        request.amount = Some(Decimal::new(-100, 0));
        request.tax_amount = Some(Decimal::new(1005, 3));

        let err = validate_create_request(request).unwrap_err();
        assert_eq!(violations(err), vec!["amount", "taxAmount"]);
    }

    #[test]
    fn test_money_upper_bound() {
        assert_eq!(MAX_MONEY.to_string(), "99999999.99");

        let mut request = valid_request();
        request.amount = Some(Decimal::from_str("99999999.99").unwrap());
        assert!(validate_create_request(request.clone()).is_ok());

        request.amount = Some(Decimal::from_str("100000000").unwrap());
        request.tax_amount = Some(Decimal::from_str("70000000000000000000000000000").unwrap());
        let err = validate_create_request(request).unwrap_err();
        assert_eq!(violations(err), vec!["amount", "taxAmount"]);
    }

    #[test]
    fn test_unknown_discount_type_means_no_discount() {
        let mut request = valid_request();
        request.discount_type = Some("Coupon".to_string());

        let draft = validate_create_request(request).unwrap();
        assert_eq!(draft.discount_type, None);
    }

    #[test]
    fn test_patch_id_forms() {
        let from_number: PatchInvoiceRequest =
            serde_json::from_value(json!({"id": 4, "status": "Paid"})).unwrap();
        let from_string: PatchInvoiceRequest =
            serde_json::from_value(json!({"id": " 4 ", "status": "Paid"})).unwrap();

        assert_eq!(validate_patch_request(from_number).unwrap().0, 4);
        assert_eq!(validate_patch_request(from_string).unwrap().0, 4);
    }

    #[test]
    fn test_patch_rejects_bad_ids() {
        for body in [json!({}), json!({"id": "abc"}), json!({"id": 0}), json!({"id": true})] {
            let request: PatchInvoiceRequest = serde_json::from_value(body).unwrap();
            let err = validate_patch_request(request).unwrap_err();
            assert_eq!(violations(err), vec!["id"]);
        }
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(parse_page(&InvoiceListQuery::default()).unwrap(), Page::default());

        let query = InvoiceListQuery {
            limit: Some("5".to_string()),
            page_number: Some("3".to_string()),
            status: None,
        };
        assert_eq!(parse_page(&query).unwrap(), Page::new(5, 3));

        let query = InvoiceListQuery {
            limit: Some("0".to_string()),
            page_number: Some("x".to_string()),
            status: None,
        };
        assert_eq!(
            violations(parse_page(&query).unwrap_err()),
            vec!["limit", "pageNumber"]
        );
    }

    #[test]
    fn test_page_bounds() {
        let query = InvoiceListQuery {
            limit: Some(i64::MAX.to_string()),
            page_number: Some("2".to_string()),
            status: None,
        };
        assert_eq!(violations(parse_page(&query).unwrap_err()), vec!["limit"]);

        let query = InvoiceListQuery {
            limit: Some("1000".to_string()),
            page_number: Some(i64::MAX.to_string()),
            status: None,
        };
        assert_eq!(violations(parse_page(&query).unwrap_err()), vec!["pageNumber"]);
    }

    #[test]
    fn test_path_id() {
        assert_eq!(parse_path_id("12", "id").unwrap(), 12);
        assert!(parse_path_id("twelve", "id").is_err());
        assert!(parse_path_id("-3", "id").is_err());
    }
}
