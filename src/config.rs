use crate::widget::SendPolicy;
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat server
    #[arg(long, env = "CHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Path of the chat endpoint under the base URL
    #[arg(long, env = "CHAT_PATH")]
    pub chat_path: Option<String>,

    /// Initial cookie string, e.g. "csrftoken=XYZ; sessionid=abc"
    #[arg(long, env = "CHAT_COOKIES")]
    pub cookies: Option<String>,

    /// Fetch the page at startup to obtain the CSRF cookie
    #[arg(long, env = "CHAT_CSRF_BOOTSTRAP")]
    pub csrf_bootstrap: Option<bool>,

    /// Disable the send trigger while a request is in flight
    #[arg(long, env = "CHAT_SINGLE_FLIGHT")]
    pub single_flight: Option<bool>,

    /// Emit logs as JSON
    #[arg(long, env = "CHAT_LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub csrf: CsrfConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    pub chat_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
    /// Document cookie string the jar starts from.
    pub cookies: String,
    pub bootstrap: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub send_policy: SendPolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the layered config: defaults < file < `CHAT_` env < CLI.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("endpoint.base_url", "http://127.0.0.1:8000/")?
            .set_default("endpoint.chat_path", "/api/chat/")?
            .set_default("csrf.cookie_name", "csrftoken")?
            .set_default("csrf.header_name", "X-CSRFToken")?
            .set_default("csrf.cookies", "")?
            .set_default("csrf.bootstrap", true)?
            .set_default("widget.send_policy", "concurrent")?
            .set_default("logging.format", "text")?;

        // Explicit file must exist; the cwd fallback is optional
        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::new(path, FileFormat::Yaml).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder
                    .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));
            }
            None => {}
        }

        // E.g. CHAT_ENDPOINT__BASE_URL=http://example.com
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and the env vars clap maps onto them) win
        if let Some(url) = &cli.base_url {
            builder = builder.set_override("endpoint.base_url", url.as_str())?;
        }
        if let Some(path) = &cli.chat_path {
            builder = builder.set_override("endpoint.chat_path", path.as_str())?;
        }
        if let Some(cookies) = &cli.cookies {
            builder = builder.set_override("csrf.cookies", cookies.as_str())?;
        }
        if let Some(bootstrap) = cli.csrf_bootstrap {
            builder = builder.set_override("csrf.bootstrap", bootstrap)?;
        }
        if let Some(single) = cli.single_flight {
            let policy = if single { "single_flight" } else { "concurrent" };
            builder = builder.set_override("widget.send_policy", policy)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.format", if json { "json" } else { "text" })?;
        }

        let cfg = builder.build()?;
        let app: Self = cfg.try_deserialize()?;
        app.chat_url()
            .map_err(|e| config::ConfigError::Message(format!("invalid endpoint: {e}")))?;
        Ok(app)
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.endpoint.base_url)?.join(&self.endpoint.chat_path)
    }
}
