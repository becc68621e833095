//! Shipping location reference data.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A state/province with a fixed shipping rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// State code (e.g., "CA").
    pub code: String,
    /// Shipping cost for deliveries to this state.
    #[serde(alias = "shipping_cost")]
    pub shipping_cost: Money,
}

impl State {
    pub fn new(code: impl Into<String>, shipping_cost: Money) -> Self {
        Self {
            code: code.into(),
            shipping_cost,
        }
    }
}

/// A country with a default shipping rate and optional per-state rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Country code (e.g., "US").
    pub code: String,
    /// Shipping cost when no state is selected.
    #[serde(alias = "default_shipping_cost")]
    pub default_shipping_cost: Money,
    /// States with their own rates.
    #[serde(default)]
    pub states: Vec<State>,
}

impl Country {
    pub fn new(code: impl Into<String>, default_shipping_cost: Money) -> Self {
        Self {
            code: code.into(),
            default_shipping_cost,
            states: Vec::new(),
        }
    }

    /// Add a state.
    pub fn with_state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Look up a state by code (case-insensitive).
    pub fn state(&self, code: &str) -> Option<&State> {
        self.states
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code.trim()))
    }
}

/// Reference list of shippable countries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationCatalog {
    #[serde(default)]
    pub countries: Vec<Country>,
}

impl LocationCatalog {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// Look up a country by code (case-insensitive).
    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Look up a state within a country.
    pub fn state(&self, country_code: &str, state_code: &str) -> Option<&State> {
        self.country(country_code)?.state(state_code)
    }

    /// Resolve a country and optional state code into owned reference data.
    pub fn resolve(
        &self,
        country_code: &str,
        state_code: Option<&str>,
    ) -> Result<(Country, Option<State>), CommerceError> {
        let country = self
            .country(country_code)
            .ok_or_else(|| CommerceError::UnknownCountry(country_code.to_string()))?;

        let state = match state_code {
            Some(code) => Some(country.state(code).cloned().ok_or_else(|| {
                CommerceError::UnknownState {
                    country: country.code.clone(),
                    state: code.to_string(),
                }
            })?),
            None => None,
        };

        Ok((country.clone(), state))
    }
}
