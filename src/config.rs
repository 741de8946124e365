use crate::domain::{Address, Decimal, Token};
use crate::risk::Prices;
use std::collections::HashMap;
use thiserror::Error;

/// Hashstack V1 lending contract on Starknet mainnet.
pub const HASHSTACK_ADDRESS: &str =
    "0x03dcf5c72ba60eb7b2fe151032769d49dd3df6b04fa3141dffd6e2aa162b7a6e";

#[derive(Debug, Clone)]
pub struct Config {
    pub event_source: EventSourceConfig,
    pub protocol_address: Address,
    pub start_block: u64,
    pub verbose_user: Option<Address>,
    pub prices: Prices,
    pub risk_scenario: Option<RiskScenario>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSourceConfig {
    File { path: String },
    Sqlite { database_path: String },
    Indexer { url: String },
}

/// Hypothetical collateral prices to evaluate liquidable debt at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScenario {
    pub collateral_token: Token,
    pub debt_token: Token,
    pub price_points: Vec<Decimal>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    Address::parse(value).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str_canonical(value.trim()).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), format!("not a decimal: {}", value))
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let event_source = match env_map
            .get("EVENT_SOURCE")
            .map(|s| s.as_str())
            .unwrap_or("file")
        {
            "file" => EventSourceConfig::File {
                path: required(&env_map, "EVENTS_PATH")?,
            },
            "sqlite" => EventSourceConfig::Sqlite {
                database_path: required(&env_map, "DATABASE_PATH")?,
            },
            "indexer" => EventSourceConfig::Indexer {
                url: required(&env_map, "INDEXER_URL")?,
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "EVENT_SOURCE".to_string(),
                    format!("must be file, sqlite, or indexer, got {}", other),
                ))
            }
        };

        let protocol_address = parse_address(
            "PROTOCOL_ADDRESS",
            env_map
                .get("PROTOCOL_ADDRESS")
                .map(|s| s.as_str())
                .unwrap_or(HASHSTACK_ADDRESS),
        )?;

        let start_block = env_map
            .get("START_BLOCK")
            .map(|s| s.as_str())
            .unwrap_or("0")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "START_BLOCK".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let verbose_user = env_map
            .get("VERBOSE_USER")
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_address("VERBOSE_USER", s))
            .transpose()?;

        let prices = match env_map.get("PRICES") {
            Some(raw) => parse_prices(raw)?,
            None => Prices::new(),
        };

        let risk_scenario = parse_risk_scenario(&env_map)?;

        Ok(Config {
            event_source,
            protocol_address,
            start_block,
            verbose_user,
            prices,
            risk_scenario,
        })
    }
}

/// `SYMBOL=price,SYMBOL=price`
fn parse_prices(raw: &str) -> Result<Prices, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (symbol, price) = entry.split_once('=').ok_or_else(|| {
                ConfigError::InvalidValue(
                    "PRICES".to_string(),
                    format!("expected SYMBOL=price, got {}", entry),
                )
            })?;
            Ok((Token::from(symbol.trim()), parse_decimal("PRICES", price)?))
        })
        .collect()
}

fn parse_risk_scenario(
    env_map: &HashMap<String, String>,
) -> Result<Option<RiskScenario>, ConfigError> {
    let (collateral_token, debt_token) = match (
        env_map.get("RISK_COLLATERAL_TOKEN"),
        env_map.get("RISK_DEBT_TOKEN"),
    ) {
        (Some(collateral), Some(debt)) => (Token::from(collateral.trim()), Token::from(debt.trim())),
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(ConfigError::MissingEnv("RISK_DEBT_TOKEN".to_string())),
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnv(
                "RISK_COLLATERAL_TOKEN".to_string(),
            ))
        }
    };

    let price_points = required(env_map, "RISK_PRICE_POINTS")?
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_decimal("RISK_PRICE_POINTS", s))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(RiskScenario {
        collateral_token,
        debt_token,
        price_points,
    }))
}
