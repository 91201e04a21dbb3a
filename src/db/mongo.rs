use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

pub const TRIPS_COLLECTION: &str = "trips";
pub const PLACES_COLLECTION: &str = "places";
pub const GUIDES_COLLECTION: &str = "guides";
pub const HOTELS_COLLECTION: &str = "hotels";
pub const VEHICLES_COLLECTION: &str = "vehicles";

pub async fn create_mongo_client(
    uri: &str,
    database_name: &str,
) -> Result<Arc<Client>, mongodb::error::Error> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Stable API, MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal: the pool reconnects on first use.
    match ping(&client, database_name).await {
        Ok(()) => log::info!("Connected to MongoDB, ping succeeded"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping test failed: {}", e);
            log::warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

pub async fn ping(client: &Client, database_name: &str) -> Result<(), mongodb::error::Error> {
    client
        .database(database_name)
        .run_command(doc! {"ping": 1})
        .await
        .map(|_| ())
}
