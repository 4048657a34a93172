//! Payload validation for create and update requests.
//!
//! Payloads arrive as loosely typed JSON: numbers may be sent as text and
//! must be coerced, text is trimmed before it is checked and stored. A field
//! counts as present when its key exists in the object, so `stock: 0` and
//! `rating: 0` are real updates rather than "nothing to change".

use serde_json::{Map, Value};

use crate::domain::product::{ProductDraft, ProductPatch, RATING_MAX, RATING_MIN};
use crate::errors::ValidationError;

pub const FIELD_NAME: &str = "name";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_STOCK: &str = "stock";
pub const FIELD_RATING: &str = "rating";

pub const RECOGNIZED_FIELDS: [&str; 6] =
    [FIELD_NAME, FIELD_CATEGORY, FIELD_DESCRIPTION, FIELD_PRICE, FIELD_STOCK, FIELD_RATING];

const REQUIRED_FIELDS: [&str; 5] =
    [FIELD_NAME, FIELD_CATEGORY, FIELD_DESCRIPTION, FIELD_PRICE, FIELD_STOCK];

pub fn parse_draft(payload: &Value) -> Result<ProductDraft, ValidationError> {
    let object = as_object(payload)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(ProductDraft {
        name: required_text(object, FIELD_NAME)?,
        category: required_text(object, FIELD_CATEGORY)?,
        description: required_text(object, FIELD_DESCRIPTION)?,
        price: price(&object[FIELD_PRICE])?,
        stock: stock(&object[FIELD_STOCK])?,
        rating: object.get(FIELD_RATING).map(rating).transpose()?.unwrap_or(RATING_MIN),
    })
}

/// The "nothing to update" check runs on key presence before any field is
/// validated.
pub fn parse_patch(payload: &Value) -> Result<ProductPatch, ValidationError> {
    let object = as_object(payload)?;

    if !RECOGNIZED_FIELDS.iter().any(|field| object.contains_key(*field)) {
        return Err(ValidationError::NothingToUpdate);
    }

    Ok(ProductPatch {
        name: optional(object, FIELD_NAME, |value| text(FIELD_NAME, value))?,
        category: optional(object, FIELD_CATEGORY, |value| text(FIELD_CATEGORY, value))?,
        description: optional(object, FIELD_DESCRIPTION, |value| text(FIELD_DESCRIPTION, value))?,
        price: optional(object, FIELD_PRICE, price)?,
        stock: optional(object, FIELD_STOCK, stock)?,
        rating: optional(object, FIELD_RATING, rating)?,
    })
}

/// Re-applies the create rules to a draft that was built in code rather than
/// parsed from a request.
pub fn check_draft(draft: ProductDraft) -> Result<ProductDraft, ValidationError> {
    let price = finite(FIELD_PRICE, draft.price)?;
    if price <= 0.0 {
        return Err(ValidationError::PriceOutOfRange);
    }
    let rating = finite(FIELD_RATING, draft.rating)?;
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange);
    }

    Ok(ProductDraft {
        name: trimmed(FIELD_NAME, &draft.name)?,
        category: trimmed(FIELD_CATEGORY, &draft.category)?,
        description: trimmed(FIELD_DESCRIPTION, &draft.description)?,
        price,
        stock: draft.stock,
        rating,
    })
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload.as_object().ok_or(ValidationError::NotAnObject)
}

fn optional<T>(
    object: &Map<String, Value>,
    field: &'static str,
    parse: impl Fn(&Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    object.get(field).map(parse).transpose()
}

fn required_text(object: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    text(field, &object[field])
}

fn text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    value.as_str().ok_or(ValidationError::BlankText { field }).and_then(|raw| trimmed(field, raw))
}

fn trimmed(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    match raw.trim() {
        "" => Err(ValidationError::BlankText { field }),
        trimmed => Ok(trimmed.to_string()),
    }
}

fn finite(field: &'static str, number: f64) -> Result<f64, ValidationError> {
    if number.is_finite() {
        Ok(number)
    } else {
        Err(ValidationError::NotNumeric { field })
    }
}

/// Numbers pass through, text is trimmed and parsed. Non-finite results are
/// rejected because `f64::from_str` accepts `inf` and `NaN`.
fn coerce_number(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    number.ok_or(ValidationError::NotNumeric { field }).and_then(|number| finite(field, number))
}

fn price(value: &Value) -> Result<f64, ValidationError> {
    let price = coerce_number(FIELD_PRICE, value)?;
    if price <= 0.0 {
        return Err(ValidationError::PriceOutOfRange);
    }
    Ok(price)
}

fn stock(value: &Value) -> Result<u32, ValidationError> {
    let stock = coerce_number(FIELD_STOCK, value)?;
    if stock < 0.0 || stock.fract() != 0.0 || stock > f64::from(u32::MAX) {
        return Err(ValidationError::InvalidStock);
    }
    Ok(stock as u32)
}

fn rating(value: &Value) -> Result<f64, ValidationError> {
    if is_falsy(value) {
        return Ok(RATING_MIN);
    }

    let rating = coerce_number(FIELD_RATING, value)?;
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange);
    }
    Ok(rating)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(raw) => raw.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
