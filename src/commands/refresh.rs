use crate::cache::Cache;
use crate::commands::Out;
use crate::{Config, Result};

/// Discards the cached expense table so that the next `show` downloads the sheet again.
pub async fn refresh(config: Config) -> Result<Out<()>> {
    let cache = Cache::for_table(&config);
    let message = if cache.clear().await? {
        "Cleared the cached expense data"
    } else {
        "There was no cached expense data to clear"
    };
    Ok(message.into())
}
