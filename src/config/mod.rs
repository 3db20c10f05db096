//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{
    BackendOverrides, CliArgs, Command, ServeArgs, ServeOverrides, SitemapArgs, SitemapTarget,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storefront";
const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_NAVIGATION_MENU: &str = "primary";
const DEFAULT_PER_PAGE: u32 = 100;
const MAX_PER_PAGE: u32 = 100;
const DEFAULT_MAX_PAGES: u32 = 50;
const DEFAULT_TOOLS_CATEGORY: &str = "tools";
const DEFAULT_PACKAGES_CATEGORY: &str = "packages";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub wordpress: WordPressSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Backend connection. Missing values are allowed here and reported when a
/// request needs them.
#[derive(Debug, Clone)]
pub struct WordPressSettings {
    pub base_url: Option<Url>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub navigation_menu: String,
    pub per_page: NonZeroU32,
    pub max_pages: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub public_url: Url,
    pub tools_category: String,
    pub packages_category: String,
    pub popular_tools: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("site.popular_tools"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_backend_overrides(&cli.backend);
    if let Some(Command::Serve(args)) = cli.command.as_ref() {
        raw.apply_serve_overrides(&args.overrides);
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    wordpress: RawWordPressSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_backend_overrides(&mut self, overrides: &BackendOverrides) {
        if let Some(url) = overrides.wordpress_url.as_ref() {
            self.wordpress.base_url = Some(url.clone());
        }
        if let Some(key) = overrides.consumer_key.as_ref() {
            self.wordpress.consumer_key = Some(key.clone());
        }
        if let Some(secret) = overrides.consumer_secret.as_ref() {
            self.wordpress.consumer_secret = Some(secret.clone());
        }
        if let Some(menu) = overrides.navigation_menu.as_ref() {
            self.wordpress.navigation_menu = Some(menu.clone());
        }
        if let Some(url) = overrides.site_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            wordpress,
            site,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            wordpress: build_wordpress_settings(wordpress)?,
            site: build_site_settings(site)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }
    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_wordpress_settings(
    wordpress: RawWordPressSettings,
) -> Result<WordPressSettings, LoadError> {
    let base_url = non_blank(wordpress.base_url)
        .map(|raw| parse_http_url(&raw, "wordpress.base_url"))
        .transpose()?;

    let navigation_menu = non_blank(wordpress.navigation_menu)
        .unwrap_or_else(|| DEFAULT_NAVIGATION_MENU.to_string());

    let per_page_value = wordpress.per_page.unwrap_or(DEFAULT_PER_PAGE.into());
    let per_page = non_zero_u32(per_page_value, "wordpress.per_page")?;
    if per_page.get() > MAX_PER_PAGE {
        return Err(LoadError::invalid(
            "wordpress.per_page",
            format!("must not exceed {MAX_PER_PAGE}"),
        ));
    }
    let max_pages_value = wordpress.max_pages.unwrap_or(DEFAULT_MAX_PAGES.into());
    let max_pages = non_zero_u32(max_pages_value, "wordpress.max_pages")?;

    Ok(WordPressSettings {
        base_url,
        consumer_key: non_blank(wordpress.consumer_key),
        consumer_secret: non_blank(wordpress.consumer_secret),
        navigation_menu,
        per_page,
        max_pages,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let public_url_value =
        non_blank(site.public_url).unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    let public_url = parse_http_url(&public_url_value, "site.public_url")?;

    let tools_category =
        non_blank(site.tools_category).unwrap_or_else(|| DEFAULT_TOOLS_CATEGORY.to_string());
    let packages_category = non_blank(site.packages_category)
        .unwrap_or_else(|| DEFAULT_PACKAGES_CATEGORY.to_string());

    let mut popular_tools: Vec<String> = Vec::new();
    for slug in site.popular_tools.unwrap_or_default() {
        let slug = slug.trim();
        if slug.is_empty() || popular_tools.iter().any(|known| known == slug) {
            continue;
        }
        if slug.contains('/') {
            return Err(LoadError::invalid(
                "site.popular_tools",
                format!("`{slug}` is not a slug"),
            ));
        }
        popular_tools.push(slug.to_string());
    }

    Ok(SiteSettings {
        public_url,
        tools_category,
        packages_category,
        popular_tools,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWordPressSettings {
    base_url: Option<String>,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    navigation_menu: Option<String>,
    per_page: Option<u64>,
    max_pages: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    public_url: Option<String>,
    tools_category: Option<String>,
    packages_category: Option<String>,
    popular_tools: Option<Vec<String>>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(raw: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(raw).map_err(|err| LoadError::invalid(key, format!("`{raw}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`, expected http or https"),
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
