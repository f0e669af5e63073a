//! Centralised session store.
//!
//! Single source of truth for credentials. Every read goes through
//! [`SessionStore::snapshot`] or [`SessionStore::bearer`]; every write goes
//! through login, refresh, or logout, so refresh and logout are atomic from
//! the perspective of any concurrent reader.
//!
//! Refresh is single-flight: the store tracks a token generation, callers
//! report the generation their rejected request used, and only the first
//! caller per generation performs the network refresh. Latecomers receive
//! the already-renewed token without another round trip.

use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::domain::auth::{AccessToken, Role, Session, TokenPair, UserProfile};
use crate::domain::error::{ClientResult, Error};
use crate::domain::ports::{
    AuthApi, Navigator, PersistedSession, RedirectTarget, SessionPersistence,
};

#[derive(Default)]
struct StoreState {
    session: Option<Session>,
    generation: u64,
    /// Set once the logout redirect has fired; reset by the next login.
    redirected: bool,
}

/// Process-wide credential store with an explicit lifecycle.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    persistence: Arc<dyn SessionPersistence>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<StoreState>,
    refresh_gate: AsyncMutex<()>,
}

impl SessionStore {
    /// Build a store over the auth endpoints, persistence, and navigation.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthApi>,
        persistence: Arc<dyn SessionPersistence>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            persistence,
            navigator,
            state: Mutex::new(StoreState::default()),
            refresh_gate: AsyncMutex::new(()),
        }
    }

    /// Rebuild the in-memory session from persisted credentials.
    ///
    /// Invalid persisted state is cleared rather than surfaced; the user
    /// simply has to log in again.
    pub async fn initialise(&self) -> ClientResult<Option<UserProfile>> {
        let stored = self
            .persistence
            .load()
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        let Some(stored) = stored else {
            return Ok(None);
        };

        match TokenPair::from_raw(stored.access_token, stored.refresh_token) {
            Ok(tokens) => {
                let session = Session::new(tokens, stored.user);
                let profile = session.user().clone();
                let mut state = self.lock_state()?;
                state.session = Some(session);
                state.redirected = false;
                Ok(Some(profile))
            }
            Err(error) => {
                warn!(error = %error, "persisted credentials are unusable; clearing");
                if let Err(clear_error) = self.persistence.clear().await {
                    warn!(error = %clear_error, "failed to clear persisted credentials");
                }
                Ok(None)
            }
        }
    }

    /// Immutable copy of the current session, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.session.clone())
    }

    /// Current access token and its generation, for authenticated calls.
    #[must_use]
    pub fn bearer(&self) -> Option<(AccessToken, u64)> {
        self.state.lock().ok().and_then(|state| {
            state
                .session
                .as_ref()
                .map(|session| (session.tokens().access.clone(), state.generation))
        })
    }

    /// Install a freshly authenticated session.
    pub async fn login(&self, tokens: TokenPair, user: UserProfile) -> ClientResult<()> {
        let session = Session::new(tokens, user);
        let snapshot = persisted_snapshot(&session);
        {
            let mut state = self.lock_state()?;
            state.session = Some(session);
            state.generation = state.generation.saturating_add(1);
            state.redirected = false;
        }
        if let Err(error) = self.persistence.store(&snapshot).await {
            warn!(error = %error, "failed to persist session after login");
        }
        info!(user_id = %snapshot.user.id(), "session established");
        Ok(())
    }

    /// Complete the Google OAuth flow and install the resulting session.
    pub async fn login_with_google(&self, code: &str) -> ClientResult<UserProfile> {
        let login = self.auth.exchange_google_code(code).await?;
        let user = login.user.clone();
        self.login(login.tokens, login.user).await?;
        Ok(user)
    }

    /// Record the role a new OAuth user picked.
    ///
    /// # Errors
    ///
    /// Rejected unless the current role is `pending`; an assigned role only
    /// changes through a fresh login.
    pub async fn apply_role_selection(&self, role: Role) -> ClientResult<UserProfile> {
        let (profile, snapshot) = {
            let mut state = self.lock_state()?;
            let Some(session) = state.session.as_ref() else {
                return Err(Error::auth_missing("no session for role selection"));
            };
            if session.user().role() != Role::Pending {
                return Err(Error::forbidden("role is already assigned"));
            }
            let updated = session.with_user(session.user().with_role(role));
            let profile = updated.user().clone();
            let snapshot = persisted_snapshot(&updated);
            state.session = Some(updated);
            (profile, snapshot)
        };
        if let Err(error) = self.persistence.store(&snapshot).await {
            warn!(error = %error, "failed to persist role selection");
        }
        Ok(profile)
    }

    /// Renew the access token after a request came back `401`.
    ///
    /// `observed_generation` is the generation reported by
    /// [`Self::bearer`] when the rejected request was sent. When another
    /// caller has refreshed in the meantime the current token is returned
    /// without a network call.
    ///
    /// # Errors
    ///
    /// Any refresh failure ends the session: credentials are cleared, the
    /// login redirect fires once, and [`crate::ErrorCode::AuthExpired`] is
    /// returned.
    pub async fn refresh_after_unauthorized(
        &self,
        observed_generation: u64,
    ) -> ClientResult<AccessToken> {
        let _gate = self.refresh_gate.lock().await;

        let refresh_token = {
            let state = self.lock_state()?;
            let Some(session) = state.session.as_ref() else {
                return Err(Error::auth_missing("no session to refresh"));
            };
            if state.generation > observed_generation {
                return Ok(session.tokens().access.clone());
            }
            session.tokens().refresh.as_str().to_owned()
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(pair) => {
                let (access, snapshot) = {
                    let mut state = self.lock_state()?;
                    let Some(session) = state.session.as_ref() else {
                        return Err(Error::auth_missing("session ended during refresh"));
                    };
                    let renewed = session.with_tokens(pair);
                    let access = renewed.tokens().access.clone();
                    let snapshot = persisted_snapshot(&renewed);
                    state.session = Some(renewed);
                    state.generation = state.generation.saturating_add(1);
                    (access, snapshot)
                };
                if let Err(error) = self.persistence.store(&snapshot).await {
                    warn!(error = %error, "failed to persist refreshed tokens");
                }
                info!("access token refreshed");
                Ok(access)
            }
            Err(error) => {
                warn!(error = %error, "token refresh failed; ending session");
                self.force_logout("refresh failed").await;
                Err(Error::auth_expired(format!(
                    "token refresh failed: {error}"
                )))
            }
        }
    }

    /// Proactively renew the token before it expires.
    pub async fn refresh_now(&self) -> ClientResult<()> {
        let Some((_, generation)) = self.bearer() else {
            return Err(Error::auth_missing("no session to refresh"));
        };
        self.refresh_after_unauthorized(generation).await.map(|_| ())
    }

    /// End the session: clear credentials and navigate to login once.
    pub async fn force_logout(&self, reason: &str) {
        let first = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            state.session = None;
            let first = !state.redirected;
            state.redirected = true;
            first
        };
        if !first {
            return;
        }

        info!(reason = %reason, "session ended");
        if let Err(error) = self.persistence.clear().await {
            warn!(error = %error, "failed to clear persisted credentials");
        }
        self.navigator.redirect(RedirectTarget::Login);
    }

    /// End the session at the user's request.
    pub async fn logout(&self) {
        self.force_logout("user logout").await;
    }

    fn lock_state(&self) -> ClientResult<std::sync::MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| Error::internal("session state poisoned"))
    }
}

fn persisted_snapshot(session: &Session) -> PersistedSession {
    PersistedSession {
        access_token: session.tokens().access.as_str().to_owned(),
        refresh_token: session.tokens().refresh.as_str().to_owned(),
        user: session.user().clone(),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use rstest::rstest;

    use crate::domain::ErrorCode;
    use crate::domain::ports::{InMemoryStateStore, RedirectTarget};
    use crate::test_support::api::ScriptedAuthApi;
    use crate::test_support::auth::{sample_profile, token_pair_expiring_in_secs};
    use crate::test_support::nav::RecordingNavigator;

    use super::*;

    struct Fixture {
        store: Arc<SessionStore>,
        auth: Arc<ScriptedAuthApi>,
        persistence: Arc<InMemoryStateStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(auth: ScriptedAuthApi) -> Fixture {
        let auth = Arc::new(auth);
        let persistence = Arc::new(InMemoryStateStore::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let store = Arc::new(SessionStore::new(
            auth.clone(),
            persistence.clone(),
            navigator.clone(),
        ));
        Fixture {
            store,
            auth,
            persistence,
            navigator,
        }
    }

    async fn logged_in_fixture(auth: ScriptedAuthApi) -> Fixture {
        let fixture = fixture(auth);
        fixture
            .store
            .login(token_pair_expiring_in_secs(3_600), sample_profile(Role::Buyer))
            .await
            .expect("login succeeds");
        fixture
    }

    #[tokio::test]
    async fn refresh_failure_clears_everything_and_redirects_once() {
        let fixture = logged_in_fixture(ScriptedAuthApi::failing_refresh()).await;
        let (_, generation) = fixture.store.bearer().expect("bearer present");

        let error = fixture
            .store
            .refresh_after_unauthorized(generation)
            .await
            .expect_err("refresh must fail");

        assert_eq!(error.code(), ErrorCode::AuthExpired);
        assert!(fixture.store.snapshot().is_none());
        assert_eq!(fixture.persistence.snapshot(), None);
        assert_eq!(fixture.navigator.redirects(), vec![RedirectTarget::Login]);

        // A later logout must not navigate again.
        fixture.store.logout().await;
        assert_eq!(fixture.navigator.redirects(), vec![RedirectTarget::Login]);
    }

    #[tokio::test]
    async fn concurrent_unauthorized_callers_share_one_refresh() {
        let fixture = logged_in_fixture(ScriptedAuthApi::with_refreshes(vec![Ok(
            token_pair_expiring_in_secs(7_200),
        )]))
        .await;
        let (_, generation) = fixture.store.bearer().expect("bearer present");

        let (first, second) = tokio::join!(
            fixture.store.refresh_after_unauthorized(generation),
            fixture.store.refresh_after_unauthorized(generation),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(fixture.auth.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn successful_refresh_bumps_generation_and_persists() {
        let fixture = logged_in_fixture(ScriptedAuthApi::with_refreshes(vec![Ok(
            token_pair_expiring_in_secs(7_200),
        )]))
        .await;
        let (old_token, generation) = fixture.store.bearer().expect("bearer present");

        let fresh = fixture
            .store
            .refresh_after_unauthorized(generation)
            .await
            .expect("refresh succeeds");

        assert_ne!(fresh.as_str(), old_token.as_str());
        let (_, new_generation) = fixture.store.bearer().expect("bearer present");
        assert_eq!(new_generation, generation + 1);
        let persisted = fixture.persistence.snapshot().expect("snapshot persisted");
        assert_eq!(persisted.access_token, fresh.as_str());
    }

    #[tokio::test]
    async fn initialise_restores_a_persisted_session() {
        let seeded = logged_in_fixture(ScriptedAuthApi::default()).await;
        let persisted = seeded.persistence.snapshot().expect("persisted");

        let restored = fixture(ScriptedAuthApi::default());
        restored
            .persistence
            .store(&persisted)
            .await
            .expect("seed persistence");
        let profile = restored
            .store
            .initialise()
            .await
            .expect("initialise succeeds")
            .expect("profile restored");
        assert_eq!(profile, sample_profile(Role::Buyer));
    }

    #[rstest]
    #[case(Role::Buyer)]
    #[case(Role::Seller)]
    #[tokio::test]
    async fn pending_accounts_may_pick_a_role(#[case] role: Role) {
        let fixture = fixture(ScriptedAuthApi::default());
        fixture
            .store
            .login(
                token_pair_expiring_in_secs(3_600),
                sample_profile(Role::Pending),
            )
            .await
            .expect("login succeeds");

        let profile = fixture
            .store
            .apply_role_selection(role)
            .await
            .expect("selection allowed");
        assert_eq!(profile.role(), role);
    }

    #[tokio::test]
    async fn assigned_roles_are_immutable() {
        let fixture = logged_in_fixture(ScriptedAuthApi::default()).await;

        let error = fixture
            .store
            .apply_role_selection(Role::Admin)
            .await
            .expect_err("must fail");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
