use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to the user when a city search cannot be resolved by any provider.
pub const CITY_NOT_FOUND_MESSAGE: &str = "Could not find city. Please check spelling.";

/// Message shown when the very first weather load fails.
pub const INITIAL_LOAD_MESSAGE: &str = "Could not load weather data. Check connection.";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response contained no {what}")]
    Incomplete {
        service: &'static str,
        what: &'static str,
    },

    #[error("Could not find city. Please check spelling.")]
    CityNotFound { query: String },

    #[error("all weather services unavailable")]
    Unavailable,

    #[error("Could not load weather data. Check connection.")]
    InitialLoad(#[source] Box<WeatherError>),

    #[error("no API key configured for {0}")]
    MissingCredential(&'static str),

    #[error("failed to process generated image: {0}")]
    Image(#[from] image::ImageError),
}

impl WeatherError {
    /// True for the errors that are meant to be shown to the user verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::CityNotFound { .. } | Self::InitialLoad(_))
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
