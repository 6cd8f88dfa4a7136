use serde::{Deserialize, Serialize};

/// The eight pollutant fields carried by every observation, in the fixed
/// order they are scanned during index derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Co,
    No,
    No2,
    O3,
    So2,
    #[serde(rename = "pm2_5")]
    Pm25,
    Pm10,
    Nh3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 8] = [
        Pollutant::Co,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::Nh3,
    ];

    /// Column name in the observation CSV
    pub fn column_name(&self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Nh3 => "nh3",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::Co => "CO",
            Pollutant::No => "NO",
            Pollutant::No2 => "NO2",
            Pollutant::O3 => "O3",
            Pollutant::So2 => "SO2",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::Nh3 => "NH3",
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}
