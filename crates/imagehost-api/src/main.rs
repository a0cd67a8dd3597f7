use imagehost_core::Config;

// mimalloc keeps allocation overhead low on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let (_state, router) = imagehost_api::setup::initialize_app(config.clone()).await?;

    imagehost_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
