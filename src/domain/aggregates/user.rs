//! User Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Email;
use crate::domain::events::{DomainEvent, UserEvent};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role { Admin, Artisan, #[default] Customer, Consultant }

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Artisan => "artisan",
            Self::Customer => "customer",
            Self::Consultant => "consultant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "artisan" => Ok(Self::Artisan),
            "customer" => Ok(Self::Customer),
            "consultant" => Ok(Self::Consultant),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// A registered account. The password hash never leaves the server.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl User {
    pub fn register(id: impl Into<String>, name: Option<String>, email: Email, password_hash: String, role: Role) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| match email.local_part() { "" => "User".to_string(), local => local.to_string() });
        let mut user = Self::restore(id.into(), name, email, password_hash, role, false, Utc::now());
        user.raise_event(DomainEvent::User(UserEvent::Registered { user_id: user.id.clone(), role }));
        user
    }

    /// Rebuild a user from storage without raising events.
    pub fn restore(id: String, name: String, email: Email, password_hash: String, role: Role, is_blocked: bool, created_at: DateTime<Utc>) -> Self {
        Self { id, name, email, password_hash, role, is_blocked, created_at, events: vec![] }
    }

    /// Records the blocked flag the store settled on.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.is_blocked = blocked;
        self.raise_event(DomainEvent::User(UserEvent::BlockToggled { user_id: self.id.clone(), blocked }));
    }

    pub fn actor(&self) -> Actor { Actor { id: self.id.clone(), name: self.name.clone(), role: self.role } }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// The authenticated identity a request acts as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn has_role(&self, roles: &[Role]) -> bool { roles.contains(&self.role) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_register_defaults_name_to_email_local_part() {
        let mut user = User::register("u1", None, Email::new("ramesh@tribal.com").unwrap(), "hash".into(), Role::Artisan);
        assert_eq!(user.name, "ramesh");
        assert!(!user.is_blocked);
        assert_eq!(user.take_events().len(), 1);
    }
    #[test]
    fn test_set_blocked_raises_event() {
        let mut user = User::register("u1", Some("Priya".into()), Email::new("priya@tribal.com").unwrap(), "hash".into(), Role::Customer);
        let _ = user.take_events();
        user.set_blocked(true);
        assert!(user.is_blocked);
        user.set_blocked(false);
        assert!(!user.is_blocked);
        assert_eq!(user.take_events().len(), 2);
    }
    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::register("u1", Some("Priya".into()), Email::new("priya@tribal.com").unwrap(), "secret-hash".into(), Role::Customer);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "customer");
        assert_eq!(json["isBlocked"], false);
    }
    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("consultant".parse::<Role>(), Ok(Role::Consultant));
        assert!("root".parse::<Role>().is_err());
    }
}
