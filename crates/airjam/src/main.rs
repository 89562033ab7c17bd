use airjam::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    if let Err(error) = airjam::run(config).await {
        tracing::error!(%error, "airjam exited with an error");
        std::process::exit(1);
    }
}
