use anyhow::Context;
use bookstack_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstack settings")?;

    bookstack_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookstack-app bootstrap starting"
    );

    let store = bookstack_db::connect(&settings.database.url)
        .await
        .with_context(|| format!("failed to connect to {}", settings.database.url))?;

    let registry = bookstack_app::registry();
    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookstack-app bootstrap complete");

    let served = bookstack_http::start_server(&registry, &ctx).await;
    registry.stop_all().await?;
    served
}
