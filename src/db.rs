use mongodb::{Client, Database};
use tracing::info;

use crate::error::StoreError;

pub async fn init_db(uri: &str, name: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    info!(database = name, "Connected to MongoDB");
    Ok(client.database(name))
}
