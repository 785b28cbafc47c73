//! Application services.
//!
//! [`Storefront`] is the one context every operation runs against. Each
//! submodule adds the operations for one area as an `impl Storefront` block.
//! Operations that depend on who is asking take an explicit [`Actor`].
//!
//! [`Actor`]: crate::domain::aggregates::Actor

pub mod auth;
pub mod captcha;
pub mod events;
mod accounts;
mod catalog;
mod cart;
mod orders;
mod exhibitions;
mod reports;

pub use accounts::{Registration, Session};
pub use auth::{Claims, TokenIssuer};
pub use captcha::{CaptchaChallenge, CaptchaStore};
pub use events::EventPublisher;
pub use orders::{BulkRequest, OrderListing};

use std::time::Duration;
use crate::config::AppConfig;
use crate::domain::aggregates::{Actor, Role};
use crate::error::{Result, StorefrontError};
use crate::store::Repositories;

pub struct Storefront {
    pub repos: Repositories,
    pub events: EventPublisher,
    pub tokens: TokenIssuer,
    pub captcha: CaptchaStore,
    checkout_delay: Duration,
    require_captcha: bool,
}

impl Storefront {
    pub fn new(config: &AppConfig, repos: Repositories, events: EventPublisher) -> Self {
        Self {
            repos,
            events,
            tokens: TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_hours),
            captcha: CaptchaStore::default(),
            checkout_delay: config.checkout_delay,
            require_captcha: config.require_captcha,
        }
    }
}

fn new_id() -> String { uuid::Uuid::now_v7().to_string() }

fn require_role(actor: &Actor, roles: &[Role]) -> Result<()> {
    if actor.has_role(roles) {
        Ok(())
    } else {
        Err(StorefrontError::forbidden(format!("{} accounts cannot do this", actor.role)))
    }
}
