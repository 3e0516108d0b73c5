//! Bookstack application library
//!
//! Hosts the project modules and assembles them into a servable router.

pub mod modules;

use axum::Router;
use bookstack_db::SharedStore;
use bookstack_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry holding every project module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Full HTTP application over `store`, as served by the binary
pub fn app(settings: &Settings, store: &SharedStore) -> Router {
    let ctx = InitCtx { settings, store };
    bookstack_http::build_router(&registry(), &ctx)
}
