//! External API integrations

pub mod open_meteo;

pub use open_meteo::{
    build_reading, AirQualityResponse, EnvironmentalSource, OpenMeteoClient, WeatherResponse,
};
