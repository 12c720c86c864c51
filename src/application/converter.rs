//! Token to element conversion.
//!
//! The parser hands every literal token to an [`ElementConverter`]. Types
//! implementing `FromStr` get [`FromStrConverter`]; anything else can supply a
//! closure through [`FnConverter`].

use std::marker::PhantomData;
use std::str::FromStr;

use crate::application::configuration::Configuration;
use crate::application::error::BoxError;

pub trait ElementConverter<T> {
    fn to_element(&self, token: &str, config: &Configuration) -> Result<T, BoxError>;
}

/// Converts with `str::parse`.
pub struct FromStrConverter<T>(PhantomData<fn() -> T>);

impl<T> Default for FromStrConverter<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> FromStrConverter<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> ElementConverter<T> for FromStrConverter<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn to_element(&self, token: &str, _config: &Configuration) -> Result<T, BoxError> {
        token.parse::<T>().map_err(|e| Box::new(e) as BoxError)
    }
}

/// Adapts a closure into an [`ElementConverter`].
pub struct FnConverter<F>(pub F);

impl<T, F> ElementConverter<T> for FnConverter<F>
where
    F: Fn(&str, &Configuration) -> Result<T, BoxError>,
{
    fn to_element(&self, token: &str, config: &Configuration) -> Result<T, BoxError> {
        (self.0)(token, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_numeric_token_when_converting_with_from_str_then_parses() {
        let converter = FromStrConverter::<i64>::new();
        let config = Configuration::default();
        assert_eq!(converter.to_element("42", &config).unwrap(), 42);
        assert!(converter.to_element("forty-two", &config).is_err());
    }

    #[test]
    fn given_closure_when_converting_then_delegates() {
        let converter = FnConverter(|token: &str, _: &Configuration| -> Result<usize, BoxError> {
            Ok(token.len())
        });
        assert_eq!(
            converter
                .to_element("abcd", &Configuration::default())
                .unwrap(),
            4
        );
    }
}
