use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

use crate::domain::sitemap::SitemapDocument;

/// Command-line arguments for the storefront binary.
#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Storefront for a WordPress/WooCommerce backend"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STOREFRONT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the storefront HTTP service.
    Serve(Box<ServeArgs>),
    /// Print one sitemap document to stdout.
    Sitemap(SitemapArgs),
    /// Probe every backend endpoint and print the report as JSON.
    Check,
}

/// Backend connection overrides, accepted before or after any subcommand.
#[derive(Debug, Args, Default, Clone)]
pub struct BackendOverrides {
    /// Override the WordPress base URL.
    #[arg(
        long = "wordpress-url",
        global = true,
        env = "WORDPRESS_URL",
        value_name = "URL"
    )]
    pub wordpress_url: Option<String>,

    /// Override the WooCommerce consumer key.
    #[arg(
        long = "wc-consumer-key",
        global = true,
        env = "WC_CONSUMER_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    pub consumer_key: Option<String>,

    /// Override the WooCommerce consumer secret.
    #[arg(
        long = "wc-consumer-secret",
        global = true,
        env = "WC_CONSUMER_SECRET",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub consumer_secret: Option<String>,

    /// Override the WordPress menu used for site navigation.
    #[arg(long = "navigation-menu", global = true, value_name = "MENU")]
    pub navigation_menu: Option<String>,

    /// Override the public site URL used in sitemaps.
    #[arg(long = "site-url", global = true, value_name = "URL")]
    pub site_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct SitemapArgs {
    /// Document to print.
    #[arg(value_enum, value_name = "DOCUMENT")]
    pub document: SitemapTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SitemapTarget {
    Index,
    Static,
    Tools,
    Packages,
    Blog,
    Pages,
    Products,
}

impl SitemapTarget {
    /// The category document, or `None` for the index.
    pub fn document(self) -> Option<SitemapDocument> {
        match self {
            SitemapTarget::Index => None,
            SitemapTarget::Static => Some(SitemapDocument::Static),
            SitemapTarget::Tools => Some(SitemapDocument::Tools),
            SitemapTarget::Packages => Some(SitemapDocument::Packages),
            SitemapTarget::Blog => Some(SitemapDocument::Blog),
            SitemapTarget::Pages => Some(SitemapDocument::Pages),
            SitemapTarget::Products => Some(SitemapDocument::Products),
        }
    }
}
