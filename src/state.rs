use std::ops::Deref;
use std::sync::Arc;
use crate::config::AppConfig;
use crate::services::{EventPublisher, Storefront};
use crate::store::Repositories;

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Storefront>,
}

impl AppState {
    pub fn new(config: &AppConfig, repos: Repositories, events: EventPublisher) -> Self {
        Self { inner: Arc::new(Storefront::new(config, repos, events)) }
    }
}

impl Deref for AppState {
    type Target = Storefront;
    fn deref(&self) -> &Storefront { &self.inner }
}
