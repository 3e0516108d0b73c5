use async_trait::async_trait;
use bookstack_db::SharedStore;
use utoipa_axum::router::OpenApiRouter;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    /// Document store opened once at startup and shared by every request
    pub store: &'a SharedStore,
}

/// Core module trait that all bookstack modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes served by this module together with their OpenAPI operations.
    /// Handler state is bound here, so the returned router is ready to merge.
    fn routes(&self, _ctx: &InitCtx<'_>) -> OpenApiRouter {
        OpenApiRouter::new()
    }

    /// Start background tasks for this module
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
