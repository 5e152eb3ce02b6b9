//! [`Config`]-related definitions.

use std::time;

use common::Percent;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Display, Error};
use rust_decimal::Decimal;
use serde::Deserialize;
use service::domain::invoice;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Lifetime of a newly created user session.
    #[default(time::Duration::from_secs(30 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Invoicing configuration.
    pub billing: Billing,
}

impl TryFrom<Service> for service::Config {
    type Error = InvalidBillingError;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service {
            jwt_secret,
            session_ttl,
            billing,
        } = value;
        Ok(Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            session_ttl,
            billing: billing.try_into()?,
        })
    }
}

/// Invoicing configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Billing {
    /// Share of the selling price charged to the buyer, in percents.
    #[default(Decimal::from(6))]
    pub selling_fee: Decimal,

    /// Flat fee charged to the buyer.
    #[default(Decimal::ONE_HUNDRED)]
    pub administration_fee: Decimal,

    /// Code of the journal invoices are registered in.
    #[default("INV".to_owned())]
    pub journal: String,

    /// Code of the currency invoices are issued in.
    #[default("USD".to_owned())]
    pub currency: String,
}

impl TryFrom<Billing> for service::billing::Config {
    type Error = InvalidBillingError;

    fn try_from(value: Billing) -> Result<Self, Self::Error> {
        use InvalidBillingError as E;

        let Billing {
            selling_fee,
            administration_fee,
            journal,
            currency,
        } = value;
        if administration_fee.is_sign_negative() {
            return Err(E::AdministrationFee(administration_fee));
        }
        Ok(Self {
            selling_fee: Percent::new(selling_fee)
                .ok_or(E::SellingFee(selling_fee))?,
            administration_fee,
            journal: invoice::Journal::new(journal.clone())
                .ok_or(E::Journal(journal))?,
            currency: currency.parse().map_err(|_| E::Currency(currency))?,
        })
    }
}

/// Invalid [`Billing`] configuration.
#[derive(Clone, Debug, Display, Error)]
pub enum InvalidBillingError {
    /// Selling fee is not a valid percentage.
    #[display("`billing.selling_fee` must be within [0, 100]: {_0}")]
    SellingFee(#[error(not(source))] Decimal),

    /// Administration fee is negative.
    #[display("`billing.administration_fee` cannot be negative: {_0}")]
    AdministrationFee(#[error(not(source))] Decimal),

    /// Journal code is empty or too long.
    #[display("`billing.journal` is invalid: `{_0}`")]
    Journal(#[error(not(source))] String),

    /// Currency code is unknown.
    #[display("`billing.currency` is unknown: `{_0}`")]
    Currency(#[error(not(source))] String),
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Currency;
    use rust_decimal::Decimal;

    use super::{Billing, InvalidBillingError};

    #[test]
    fn converts_default_billing() {
        let conf = service::billing::Config::try_from(Billing::default())
            .unwrap();

        assert_eq!(conf.selling_fee.value(), Decimal::from(6));
        assert_eq!(conf.administration_fee, Decimal::ONE_HUNDRED);
        assert_eq!(conf.journal.to_string(), "INV");
        assert_eq!(conf.currency, Currency::Usd);
    }

    #[test]
    fn rejects_invalid_billing() {
        let res = service::billing::Config::try_from(Billing {
            selling_fee: Decimal::from(101),
            ..Billing::default()
        });
        assert!(matches!(res, Err(InvalidBillingError::SellingFee(_))));

        let res = service::billing::Config::try_from(Billing {
            administration_fee: Decimal::NEGATIVE_ONE,
            ..Billing::default()
        });
        assert!(matches!(
            res,
            Err(InvalidBillingError::AdministrationFee(_)),
        ));

        let res = service::billing::Config::try_from(Billing {
            currency: "XYZ".to_owned(),
            ..Billing::default()
        });
        assert!(matches!(res, Err(InvalidBillingError::Currency(_))));
    }
}
