use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client};
use tracing::info;

const APP_NAME: &str = "student-records";

/// Build a driver client from configuration and verify the deployment answers
/// a `ping` before the HTTP server starts accepting requests.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<Client> {
    let mut opts = ClientOptions::parse(&cfg.url).await?;
    opts.app_name = Some(APP_NAME.to_string());
    opts.max_pool_size = Some(cfg.max_pool_size);
    opts.min_pool_size = Some(cfg.min_pool_size);
    opts.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    opts.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));

    let client = Client::with_options(opts)?;
    client.database(&cfg.name).run_command(doc! { "ping": 1 }).await?;
    info!(database = %cfg.name, collection = %cfg.collection, "connected to document store");
    Ok(client)
}
