//! City datasets.
//!
//! Loads every configured city once at startup and hands out
//! read-only references afterwards.

pub mod loader;

use crate::config::CityConfig;
use crate::errors::DataError;
use crate::models::CityDataset;

pub use loader::load_city;

/// All loaded cities, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    cities: Vec<CityDataset>,
}

impl Datasets {
    pub fn new(cities: Vec<CityDataset>) -> Self {
        Self { cities }
    }

    /// Load every configured city. Any failure is fatal.
    pub fn load_all(configs: &[CityConfig]) -> Result<Self, DataError> {
        let cities = configs
            .iter()
            .map(load_city)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(cities))
    }

    /// Find a city by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<&CityDataset, DataError> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::UnknownCity(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.name.as_str()).collect()
    }
}
