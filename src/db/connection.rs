use crate::config::types::Connection;
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    let Some((protocol, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    if let Some((user_info, host_and_path)) = rest.split_once('@')
        && let Some((username, _)) = user_info.split_once(':')
    {
        return format!("{}://{}:***@{}", protocol, username, host_and_path);
    }

    url.to_string()
}

/// Connect to the target database, retrying transient failures.
///
/// Covers containers that are still starting and short network blips. The error
/// names the masked URL and the number of attempts made.
pub async fn connect_with_retry(url: &str, config: &Connection) -> Result<PgPool> {
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let result = PgPoolOptions::new()
            .acquire_timeout(config.acquire_timeout)
            .connect(url)
            .await;

        match result {
            Ok(pool) => {
                if attempt > 0 {
                    info!(
                        "Connected to database (after {} retr{})",
                        attempt,
                        if attempt == 1 { "y" } else { "ies" }
                    );
                } else {
                    info!("Connected to database");
                }
                return Ok(pool);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < config.max_retries {
                    if attempt == 0 {
                        info!("Database not ready, retrying...");
                    }
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }

    let attempts = config.max_retries + 1;
    match last_error {
        Some(e) => Err(e).with_context(|| {
            format!(
                "Failed to connect to database at {} after {} attempts",
                mask_url_password(url),
                attempts
            )
        }),
        None => Err(anyhow::anyhow!(
            "Failed to connect to database at {}",
            mask_url_password(url)
        )),
    }
}
