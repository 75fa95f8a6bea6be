//! Normalized feature vector for one (location, crop, season) query.
//! Built upstream by the feature-engineering layer; the core reads it and
//! never mutates it.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const FEATURE_COUNT: usize = 8;

/// The eight model input features, in canonical order. Scalers, importance
/// tables and serialized vectors all follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureName {
    NdviMean,
    NdviTrend,
    NdviVariance,
    RainfallDeviation,
    TemperatureAnomaly,
    SoilMoistureIndex,
    SoilTypeEncoded,
    PestFrequency,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::NdviMean,
        FeatureName::NdviTrend,
        FeatureName::NdviVariance,
        FeatureName::RainfallDeviation,
        FeatureName::TemperatureAnomaly,
        FeatureName::SoilMoistureIndex,
        FeatureName::SoilTypeEncoded,
        FeatureName::PestFrequency,
    ];

    /// Snake-case key used in artifacts and serialized vectors.
    pub fn key(self) -> &'static str {
        match self {
            FeatureName::NdviMean => "ndvi_mean",
            FeatureName::NdviTrend => "ndvi_trend",
            FeatureName::NdviVariance => "ndvi_variance",
            FeatureName::RainfallDeviation => "rainfall_deviation",
            FeatureName::TemperatureAnomaly => "temperature_anomaly",
            FeatureName::SoilMoistureIndex => "soil_moisture_index",
            FeatureName::SoilTypeEncoded => "soil_type_encoded",
            FeatureName::PestFrequency => "pest_frequency",
        }
    }

    pub fn from_key(key: &str) -> Option<FeatureName> {
        FeatureName::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Human-readable name used in explanation output.
    pub fn display_name(self) -> &'static str {
        match self {
            FeatureName::NdviMean => "NDVI Mean",
            FeatureName::NdviTrend => "NDVI Trend",
            FeatureName::NdviVariance => "NDVI Variance",
            FeatureName::RainfallDeviation => "Rainfall Deviation %",
            FeatureName::TemperatureAnomaly => "Temperature Anomaly °C",
            FeatureName::SoilMoistureIndex => "Soil Moisture Index",
            FeatureName::SoilTypeEncoded => "Soil Type (1-5)",
            FeatureName::PestFrequency => "Pest Frequency",
        }
    }
}

/// One query's normalized features. NDVI, soil moisture, soil type and pest
/// frequency sit in [0, 1]; rainfall deviation and temperature anomaly are
/// pre-scaled but unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean NDVI over the season window
    pub ndvi_mean: f64,
    /// NDVI slope rescaled into [0, 1]
    pub ndvi_trend: f64,
    /// NDVI variance rescaled into [0, 1]
    pub ndvi_variance: f64,
    /// Percent deviation from the seasonal rainfall norm
    pub rainfall_deviation: f64,
    /// Degrees C away from the seasonal norm
    pub temperature_anomaly: f64,
    /// Soil moisture fraction
    pub soil_moisture_index: f64,
    /// Soil class code 1-5 divided by 5
    pub soil_type_encoded: f64,
    /// Pest incident frequency
    pub pest_frequency: f64,
}

impl FeatureVector {
    pub fn get(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::NdviMean => self.ndvi_mean,
            FeatureName::NdviTrend => self.ndvi_trend,
            FeatureName::NdviVariance => self.ndvi_variance,
            FeatureName::RainfallDeviation => self.rainfall_deviation,
            FeatureName::TemperatureAnomaly => self.temperature_anomaly,
            FeatureName::SoilMoistureIndex => self.soil_moisture_index,
            FeatureName::SoilTypeEncoded => self.soil_type_encoded,
            FeatureName::PestFrequency => self.pest_frequency,
        }
    }

    /// Copy with a single field replaced. The counterfactual engine's only
    /// write path; the original vector is untouched.
    pub fn with(&self, name: FeatureName, value: f64) -> Self {
        let mut out = self.clone();
        match name {
            FeatureName::NdviMean => out.ndvi_mean = value,
            FeatureName::NdviTrend => out.ndvi_trend = value,
            FeatureName::NdviVariance => out.ndvi_variance = value,
            FeatureName::RainfallDeviation => out.rainfall_deviation = value,
            FeatureName::TemperatureAnomaly => out.temperature_anomaly = value,
            FeatureName::SoilMoistureIndex => out.soil_moisture_index = value,
            FeatureName::SoilTypeEncoded => out.soil_type_encoded = value,
            FeatureName::PestFrequency => out.pest_frequency = value,
        }
        out
    }

    /// Values in canonical order for scaler and model input.
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(vec![
            self.ndvi_mean,
            self.ndvi_trend,
            self.ndvi_variance,
            self.rainfall_deviation,
            self.temperature_anomaly,
            self.soil_moisture_index,
            self.soil_type_encoded,
            self.pest_frequency,
        ])
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        const BOUNDED: [FeatureName; 6] = [
            FeatureName::NdviMean,
            FeatureName::NdviTrend,
            FeatureName::NdviVariance,
            FeatureName::SoilMoistureIndex,
            FeatureName::SoilTypeEncoded,
            FeatureName::PestFrequency,
        ];
        for name in BOUNDED {
            let v = self.get(name);
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(EngineError::InvalidFeatures(format!(
                    "{} = {} outside [0, 1]",
                    name.key(),
                    v
                )));
            }
        }
        for name in [FeatureName::RainfallDeviation, FeatureName::TemperatureAnomaly] {
            if !self.get(name).is_finite() {
                return Err(EngineError::InvalidFeatures(format!(
                    "{} is not finite",
                    name.key()
                )));
            }
        }
        Ok(())
    }
}
