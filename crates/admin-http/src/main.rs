use admin_http::{
    init_logging, log_shutdown_info, log_startup_info, seed_repositories, AdminConfig, AdminServer, AdminState,
    AppConfigTrait,
};
use admin_relations::ResourceCatalog;
use anyhow::Context;

const SERVICE_NAME: &str = "admin-server";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdminConfig::from_env().context("invalid admin configuration")?;

    init_logging(
        config
            .logging_config()
            .with_service(SERVICE_NAME, env!("CARGO_PKG_VERSION")),
    )
    .map_err(|e| anyhow::anyhow!(e))?;
    log_startup_info(SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    let catalog = match &config.resources_path {
        Some(path) => ResourceCatalog::load(path)
            .with_context(|| format!("failed to load resource catalog from {}", path.display()))?,
        None => {
            tracing::warn!(target: "admin::catalog", "ADMIN_RESOURCES_PATH not set; serving an empty catalog");
            ResourceCatalog::default()
        }
    };
    let repositories = seed_repositories(&catalog).context("failed to seed repositories")?;

    AdminServer::new(config, AdminState::new(catalog, repositories))
        .listen()
        .await?;

    log_shutdown_info(SERVICE_NAME);
    Ok(())
}
