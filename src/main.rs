use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bandsite::{BandStore, Config, SupabaseClient};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; variables may come from the environment
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Required: SUPABASE_URL, SUPABASE_ANON_KEY");
            eprintln!("Optional: BANDSITE_ACCESS_TOKEN, BANDSITE_ASSET_BUCKET, BANDSITE_LOCALE");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting bandsite content sync");
    tracing::info!("Supabase URL: {}", config.supabase_url);
    tracing::info!("Asset bucket: {}", config.asset_bucket);

    let Config {
        supabase_url,
        anon_key,
        access_token,
        asset_bucket,
        locale,
    } = config;

    let mut client = SupabaseClient::new(supabase_url, anon_key);
    if let Some(token) = access_token {
        client = client.with_access_token(token);
    }

    let mut store = BandStore::new(Arc::new(client), asset_bucket);
    store.initialize().await;

    if let Some(err) = store.error() {
        eprintln!("Failed to load site content: {}", err);
        std::process::exit(1);
    }

    let about = store.config().about_text.get(&locale);
    if !about.is_empty() {
        tracing::info!("About ({}): {}", locale, about);
    }
    tracing::info!("{} banner images", store.config().banner_images.len());

    for show in store.shows() {
        tracing::info!("Show {} {} at {}, {}", show.date, show.time, show.venue, show.address);
    }
    for member in store.members() {
        tracing::info!("Member {}: {}", member.name, member.role.get(&locale));
    }
    for album in store.albums() {
        tracing::info!("Album {} ({} photos)", album.title, album.photos.len());
    }
}
