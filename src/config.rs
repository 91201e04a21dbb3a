use std::env;

use crate::error::ConfigError;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE_NAME: &str = "TourPlanner";
const DEFAULT_TRIP_NAME: &str = "My Trip";
const DEFAULT_TRIP_DESCRIPTION: &str = "Places I want to visit";
const MAX_SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database_name: String,
    pub trips: TripConfig,
}

/// Settings the trip service needs at runtime.
#[derive(Debug, Clone)]
pub struct TripConfig {
    pub default_trip_name: String,
    pub default_trip_description: String,
    pub max_save_attempts: u32,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            default_trip_name: DEFAULT_TRIP_NAME.to_string(),
            default_trip_description: DEFAULT_TRIP_DESCRIPTION.to_string(),
            max_save_attempts: MAX_SAVE_ATTEMPTS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port = parse_var("PORT", PORT)?;
        let mongo_uri = env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?;
        let database_name =
            env::var("DATABASE_NAME").unwrap_or_else(|_| DATABASE_NAME.to_string());

        let max_save_attempts: u32 = parse_var("MAX_SAVE_ATTEMPTS", MAX_SAVE_ATTEMPTS)?;
        if max_save_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_SAVE_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        let trips = TripConfig {
            default_trip_name: env::var("DEFAULT_TRIP_NAME")
                .unwrap_or_else(|_| DEFAULT_TRIP_NAME.to_string()),
            default_trip_description: env::var("DEFAULT_TRIP_DESCRIPTION")
                .unwrap_or_else(|_| DEFAULT_TRIP_DESCRIPTION.to_string()),
            max_save_attempts,
        };

        Ok(Self {
            host,
            port,
            mongo_uri,
            database_name,
            trips,
        })
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
