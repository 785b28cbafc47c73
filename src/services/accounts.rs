use serde::Serialize;
use crate::domain::aggregates::{Actor, Role, User};
use crate::domain::value_objects::Email;
use crate::error::{Result, StorefrontError};
use super::auth::{hash_password, verify_password};
use super::{new_id, require_role, Storefront};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Storefront {
    pub async fn register(&self, registration: Registration) -> Result<Session> {
        let email = Email::new(registration.email)?;
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StorefrontError::validation(format!("password must be at least {MIN_PASSWORD_LENGTH} characters")));
        }
        let role = registration.role.unwrap_or_default();
        if role == Role::Admin && self.repos.users.list().await?.iter().any(|u| u.role == Role::Admin) {
            return Err(StorefrontError::forbidden("admin accounts cannot be self-registered"));
        }
        if self.repos.users.find_by_email(&email).await?.is_some() {
            return Err(StorefrontError::conflict("email already registered"));
        }
        let hash = hash_password(&registration.password)?;
        let mut user = User::register(new_id(), registration.name, email, hash, role);
        self.repos.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        self.events.publish(user.take_events()).await;
        let token = self.tokens.issue(&user)?;
        Ok(Session { user, token })
    }

    /// `captcha` is `(id, answer)`; it is only checked when the store requires one.
    pub async fn login(&self, email: &str, password: &str, captcha: Option<(&str, &str)>) -> Result<Session> {
        if self.require_captcha {
            let solved = match captcha {
                Some((id, answer)) => self.captcha.verify(id, answer).await,
                None => false,
            };
            if !solved {
                return Err(StorefrontError::validation("captcha answer is missing or wrong"));
            }
        }
        let invalid = || StorefrontError::Unauthorized("invalid email or password".into());
        let email = Email::new(email).map_err(|_| invalid())?;
        let user = self.repos.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "failed login");
            return Err(invalid());
        }
        if user.is_blocked {
            return Err(StorefrontError::forbidden("this account has been blocked"));
        }
        let token = self.tokens.issue(&user)?;
        Ok(Session { user, token })
    }

    /// Resolves a bearer token to the current account state. Blocked users are refused.
    pub async fn authenticate(&self, token: &str) -> Result<Actor> {
        let claims = self.tokens.verify(token)?;
        let user = self.repos.users.find(&claims.sub).await?
            .ok_or_else(|| StorefrontError::Unauthorized("account no longer exists".into()))?;
        if user.is_blocked {
            return Err(StorefrontError::forbidden("this account has been blocked"));
        }
        Ok(user.actor())
    }

    /// Admin view of all accounts, filtered case-insensitively on name or email.
    pub async fn list_users(&self, actor: &Actor, query: Option<&str>) -> Result<Vec<User>> {
        require_role(actor, &[Role::Admin])?;
        let needle = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
        let users = self.repos.users.list().await?;
        Ok(match needle {
            None => users,
            Some(q) => users.into_iter()
                .filter(|u| u.name.to_lowercase().contains(&q) || u.email.as_str().contains(&q))
                .collect(),
        })
    }

    pub async fn toggle_block(&self, actor: &Actor, user_id: &str) -> Result<User> {
        require_role(actor, &[Role::Admin])?;
        if actor.id == user_id {
            return Err(StorefrontError::validation("admins cannot block themselves"));
        }
        let mut user = self.repos.users.find(user_id).await?
            .ok_or_else(|| StorefrontError::not_found(format!("user {user_id}")))?;
        let blocked = self.repos.users.toggle_blocked(&user.id).await?;
        user.set_blocked(blocked);
        tracing::info!(user_id = %user.id, blocked = user.is_blocked, admin_id = %actor.id, "user block toggled");
        self.events.publish(user.take_events()).await;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{actor, storefront};

    fn registration(email: &str, role: Role) -> Registration {
        Registration { name: None, email: email.into(), password: "secret1".into(), role: Some(role) }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let store = storefront();
        let session = store.register(registration("Ramesh@Tribal.com", Role::Artisan)).await.unwrap();
        assert_eq!(session.user.name, "ramesh");
        assert_eq!(session.user.email.as_str(), "ramesh@tribal.com");
        assert_eq!(store.authenticate(&session.token).await.unwrap().role, Role::Artisan);
        let again = store.login("ramesh@tribal.com", "secret1", None).await.unwrap();
        assert_eq!(again.user.id, session.user.id);
    }
    #[tokio::test]
    async fn test_register_rules() {
        let store = storefront();
        store.register(registration("priya@tribal.com", Role::Customer)).await.unwrap();
        let dup = store.register(registration("PRIYA@tribal.com", Role::Customer)).await.unwrap_err();
        assert!(matches!(dup, StorefrontError::Conflict(_)));
        let short = Registration { password: "12345".into(), ..registration("a@tribal.com", Role::Customer) };
        assert!(matches!(store.register(short).await, Err(StorefrontError::Validation(_))));
        assert!(matches!(store.register(registration("not-an-email", Role::Customer)).await, Err(StorefrontError::Validation(_))));
        let defaulted = Registration { role: None, ..registration("b@tribal.com", Role::Customer) };
        assert_eq!(store.register(defaulted).await.unwrap().user.role, Role::Customer);
    }
    #[tokio::test]
    async fn test_only_first_admin_self_registers() {
        let store = storefront();
        store.register(registration("root@tribal.com", Role::Admin)).await.unwrap();
        let err = store.register(registration("root2@tribal.com", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Forbidden(_)));
    }
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_admin_registrations_yield_one_admin() {
        let store = std::sync::Arc::new(storefront());
        let handles: Vec<_> = (0..4).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.register(registration(&format!("root{i}@tribal.com"), Role::Admin)).await })
        }).collect();
        let mut admins = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => admins += 1,
                Err(e) => assert!(matches!(e, StorefrontError::Forbidden(_))),
            }
        }
        assert_eq!(admins, 1);
        let listed = store.list_users(&actor("admin-1", Role::Admin), None).await.unwrap();
        assert_eq!(listed.iter().filter(|u| u.role == Role::Admin).count(), 1);
    }
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_block_toggles_alternate() {
        let store = std::sync::Arc::new(storefront());
        let session = store.register(registration("priya@tribal.com", Role::Customer)).await.unwrap();
        let handles: Vec<_> = (0..6).map(|_| {
            let store = store.clone();
            let id = session.user.id.clone();
            tokio::spawn(async move { store.toggle_block(&actor("admin-1", Role::Admin), &id).await })
        }).collect();
        let mut blocked = 0;
        for h in handles {
            if h.await.unwrap().unwrap().is_blocked { blocked += 1; }
        }
        assert_eq!(blocked, 3);
        store.login("priya@tribal.com", "secret1", None).await.unwrap();
    }
    #[tokio::test]
    async fn test_bad_credentials() {
        let store = storefront();
        store.register(registration("priya@tribal.com", Role::Customer)).await.unwrap();
        assert!(matches!(store.login("priya@tribal.com", "wrong!", None).await, Err(StorefrontError::Unauthorized(_))));
        assert!(matches!(store.login("nobody@tribal.com", "secret1", None).await, Err(StorefrontError::Unauthorized(_))));
    }
    #[tokio::test]
    async fn test_blocked_user_cannot_log_in_or_use_token() {
        let store = storefront();
        let admin = actor("admin-1", Role::Admin);
        let session = store.register(registration("priya@tribal.com", Role::Customer)).await.unwrap();
        let blocked = store.toggle_block(&admin, &session.user.id).await.unwrap();
        assert!(blocked.is_blocked);
        assert!(matches!(store.login("priya@tribal.com", "secret1", None).await, Err(StorefrontError::Forbidden(_))));
        assert!(matches!(store.authenticate(&session.token).await, Err(StorefrontError::Forbidden(_))));
        assert!(!store.toggle_block(&admin, &session.user.id).await.unwrap().is_blocked);
        store.login("priya@tribal.com", "secret1", None).await.unwrap();
    }
    #[tokio::test]
    async fn test_user_admin_requires_admin() {
        let store = storefront();
        store.register(Registration { name: Some("Priya Sharma".into()), ..registration("priya@tribal.com", Role::Customer) }).await.unwrap();
        store.register(registration("ramesh@tribal.com", Role::Artisan)).await.unwrap();
        let admin = actor("admin-1", Role::Admin);
        assert_eq!(store.list_users(&admin, Some("SHARMA")).await.unwrap().len(), 1);
        assert_eq!(store.list_users(&admin, Some("tribal.com")).await.unwrap().len(), 2);
        assert_eq!(store.list_users(&admin, None).await.unwrap().len(), 2);
        let customer = actor("c1", Role::Customer);
        assert!(matches!(store.list_users(&customer, None).await, Err(StorefrontError::Forbidden(_))));
        assert!(matches!(store.toggle_block(&admin, "ghost").await, Err(StorefrontError::NotFound(_))));
    }
}
