use std::env;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FRONTEND_URL: &str = "http://127.0.0.1:5502";

/// Process configuration, read once at startup and handed by reference to
/// every component. Nothing reads the environment after this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub admin: AdminConfig,
    /// absent when the SMTP variables are not (fully) set; the mail worker
    /// then drops jobs with a warning instead of sending
    pub mail: Option<MailConfig>,
    /// base URL the cancellation link in confirmation mails points at
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// None means admin endpoints answer with a server error (fail closed)
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub username: String,
    pub password: String,
    pub from: String,
    pub server: String,
    pub port: u16,
}

impl Config {
    /// Read the whole configuration from the environment.
    ///
    /// `DATABASE_URL` is the only hard requirement; everything else has a
    /// default or degrades a single feature when absent.
    pub fn from_env() -> Result<Self, Error> {
        let url = env::var("DATABASE_URL").map_err(|_| Error::MissingConfig("DATABASE_URL"))?;
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("PORT is not a port number: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            db: DbConfig {
                url,
                max_connections: 5,
            },
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            admin: AdminConfig {
                password: env::var("ADMIN_PASSWORD").ok(),
            },
            mail: MailConfig::from_env()?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
        })
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr())
    }
}

impl MailConfig {
    fn from_env() -> Result<Option<Self>, Error> {
        let vars = (
            env::var("MAIL_USERNAME").ok(),
            env::var("MAIL_PASSWORD").ok(),
            env::var("MAIL_FROM").ok(),
            env::var("MAIL_SERVER").ok(),
        );
        let (Some(username), Some(password), Some(from), Some(server)) = vars else {
            return Ok(None);
        };
        let port = match env::var("MAIL_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::InvalidConfig(format!("MAIL_PORT is not a port number: {raw}"))
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        Ok(Some(Self {
            username,
            password,
            from,
            server,
            port,
        }))
    }
}
