// Validation utilities module
// Request body extraction with validation, and domain-specific rules

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Largest value a NUMERIC(10,2) column holds: 99999999.99
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// JSON body that has been deserialized and validated
///
/// Malformed JSON, a missing JSON content type and failed validation rules
/// all reject with `ValidationError`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Validates that a price is non-negative and fits in NUMERIC(10,2)
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price_must_not_be_negative"));
    }
    if normalize_price(*price) > max_price() {
        return Err(ValidationError::new("price_out_of_range"));
    }
    Ok(())
}

/// Normalizes a price to the two decimal places the store keeps,
/// rounding half away from zero as PostgreSQL does
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut price = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(2);
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(required, length(min = 1))]
        name: Option<String>,
        #[validate(custom = "validate_price")]
        price: Option<Decimal>,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_price_bounds() {
        assert!(validate_price(&dec!(0)).is_ok());
        assert!(validate_price(&dec!(12.50)).is_ok());
        assert!(validate_price(&dec!(99999999.99)).is_ok());
        assert!(validate_price(&dec!(-0.01)).is_err());
        assert!(validate_price(&dec!(100000000.00)).is_err());
    }

    #[test]
    fn test_normalize_price_rounds_to_cents() {
        assert_eq!(normalize_price(dec!(1.005)), dec!(1.01));
        assert_eq!(normalize_price(dec!(1.239)), dec!(1.24));
        assert_eq!(normalize_price(dec!(7)).to_string(), "7.00");
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ValidatedJson(body) =
            ValidatedJson::<Named>::from_request(json_request(r#"{"name": "Tea", "price": "3.5"}"#), &())
                .await
                .unwrap();

        assert_eq!(body.name.as_deref(), Some("Tea"));
        assert_eq!(body.price, Some(dec!(3.5)));
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_error() {
        let err = ValidatedJson::<Named>::from_request(json_request(r#"{"price": "1.00"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.name(), "ValidationError");

        let err = ValidatedJson::<Named>::from_request(
            json_request(r#"{"name": "Tea", "price": "-4"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.name(), "ValidationError");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let err = ValidatedJson::<Named>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.name(), "ValidationError");
    }
}
