use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::Pollutant;
use crate::utils::constants::TIMESTAMP_FORMATS;

/// One row of the air quality time series: a timestamp, eight pollutant
/// concentrations in ug/m^3 (any of which may be absent), and the derived
/// AQI fields written by the index engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    #[serde(with = "timestamp_format")]
    pub date: NaiveDateTime,

    #[validate(range(min = 0.0))]
    pub co: Option<f64>,

    #[validate(range(min = 0.0))]
    pub no: Option<f64>,

    #[validate(range(min = 0.0))]
    pub no2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub o3: Option<f64>,

    #[validate(range(min = 0.0))]
    pub so2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub pm2_5: Option<f64>,

    #[validate(range(min = 0.0))]
    pub pm10: Option<f64>,

    #[validate(range(min = 0.0))]
    pub nh3: Option<f64>,

    // Derived fields, written once by the index engine
    #[serde(default)]
    pub aqi: Option<u16>,

    #[serde(default)]
    pub aqi_category: Option<String>,
}

impl Observation {
    pub fn new(date: NaiveDateTime) -> Self {
        Self {
            date,
            co: None,
            no: None,
            no2: None,
            o3: None,
            so2: None,
            pm2_5: None,
            pm10: None,
            nh3: None,
            aqi: None,
            aqi_category: None,
        }
    }

    pub fn builder() -> ObservationBuilder {
        ObservationBuilder::new()
    }

    /// Concentration for a single pollutant field
    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Co => self.co,
            Pollutant::No => self.no,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::So2 => self.so2,
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Nh3 => self.nh3,
        }
    }

    pub fn set_concentration(&mut self, pollutant: Pollutant, value: f64) {
        match pollutant {
            Pollutant::Co => self.co = Some(value),
            Pollutant::No => self.no = Some(value),
            Pollutant::No2 => self.no2 = Some(value),
            Pollutant::O3 => self.o3 = Some(value),
            Pollutant::So2 => self.so2 = Some(value),
            Pollutant::Pm25 => self.pm2_5 = Some(value),
            Pollutant::Pm10 => self.pm10 = Some(value),
            Pollutant::Nh3 => self.nh3 = Some(value),
        }
    }

    pub fn has_any_concentration(&self) -> bool {
        Pollutant::ALL
            .iter()
            .any(|p| self.concentration(*p).is_some())
    }

    /// Hour-of-day bucket key, 0-23
    pub fn hour(&self) -> u32 {
        self.date.hour()
    }

    /// Weekday bucket key
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// True once the index engine has derived an AQI for this row
    pub fn is_indexed(&self) -> bool {
        self.aqi.is_some()
    }

    /// Range-check all concentration fields (non-negative, NaN rejected)
    pub fn validate_concentrations(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ObservationBuilder {
    date: Option<NaiveDateTime>,
    pending: Vec<(Pollutant, f64)>,
}

impl ObservationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn concentration(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.pending.push((pollutant, value));
        self
    }

    pub fn build(self) -> Result<Observation> {
        let date = self
            .date
            .ok_or_else(|| ProcessingError::MissingData("date".to_string()))?;

        let mut observation = Observation::new(date);
        for (pollutant, value) in self.pending {
            observation.set_concentration(pollutant, value);
        }

        observation.validate_concentrations()?;
        Ok(observation)
    }
}

/// Parse a timestamp in any of the accepted CSV layouts
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    Err(ProcessingError::InvalidFormat(format!(
        "Unrecognized timestamp: '{}'",
        value
    )))
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::constants::TIMESTAMP_FORMATS;

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(TIMESTAMP_FORMATS[0]).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_timestamp(&value).map_err(serde::de::Error::custom)
    }
}
