use std::{process, sync::Arc, time::Duration};

use storefront::{
    application::{
        cart::CartService,
        catalog::CatalogService,
        chrome::ChromeService,
        content::ContentService,
        error::AppError,
        sitemap::{SitemapConfig, SitemapService},
        source::ContentSource,
    },
    cache::CacheStore,
    config::{self, SitemapArgs},
    infra::{
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        telemetry,
        wordpress::{WordPressClient, WordPressConfig},
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    let app = build_application_context(&settings)?;

    match command {
        config::Command::Serve(_) => run_serve(&settings, app).await,
        config::Command::Sitemap(args) => run_sitemap(app, args).await,
        config::Command::Check => run_check(app).await,
    }
}

struct ApplicationContext {
    router_state: RouterState,
    sitemap: Arc<SitemapService>,
    catalog: Arc<CatalogService>,
}

fn build_application_context(settings: &config::Settings) -> Result<ApplicationContext, AppError> {
    let client = WordPressClient::new(WordPressConfig::from(&settings.wordpress))?;
    let backend = client.base_url().cloned();
    if backend.is_none() {
        warn!("wordpress.base_url is not set; every backend request will fail");
    }

    let source: Arc<dyn ContentSource> = Arc::new(client);
    let cache = Arc::new(CacheStore::new());
    let content = Arc::new(ContentService::new(source, cache));

    let sitemap = Arc::new(SitemapService::new(
        content.clone(),
        SitemapConfig::from(&settings.site),
    ));
    let catalog = Arc::new(CatalogService::new(content.clone()));
    let chrome = Arc::new(ChromeService::new(content.clone(), backend));
    let cart = Arc::new(CartService::new(content.clone()));

    let router_state = RouterState {
        http: HttpState {
            sitemap: sitemap.clone(),
        },
        api: ApiState {
            content,
            catalog: catalog.clone(),
            chrome,
            cart,
        },
    };

    Ok(ApplicationContext {
        router_state,
        sitemap,
        catalog,
    })
}

async fn run_serve(settings: &config::Settings, app: ApplicationContext) -> Result<(), AppError> {
    let router = http::build_app(app.router_state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "storefront listening");

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    tokio::select! {
        biased;
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(signalled_rx, settings.server.graceful_shutdown) => {
            warn!(
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("storefront stopped");
    Ok(())
}

/// Resolves `grace` after the shutdown signal fired. Never resolves otherwise.
async fn drain_deadline(signalled: tokio::sync::oneshot::Receiver<()>, grace: Duration) {
    if signalled.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received, draining connections");
}

async fn run_sitemap(app: ApplicationContext, args: SitemapArgs) -> Result<(), AppError> {
    let xml = match args.document.document() {
        Some(document) => app.sitemap.document_xml(document).await,
        None => app.sitemap.index_xml(),
    };
    print!("{xml}");
    Ok(())
}

async fn run_check(app: ApplicationContext) -> Result<(), AppError> {
    let report = app.catalog.test_connection().await;
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|err| AppError::unexpected(format!("failed to encode report: {err}")))?;
    println!("{rendered}");

    if report.success {
        Ok(())
    } else {
        let failed: Vec<&str> = report
            .probes
            .iter()
            .filter(|probe| !probe.ok)
            .map(|probe| probe.name)
            .collect();
        Err(AppError::unexpected(format!(
            "backend check failed for: {}",
            failed.join(", ")
        )))
    }
}
