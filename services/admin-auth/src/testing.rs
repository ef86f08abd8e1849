//! In-memory doubles for the outbound clients, used by handler tests

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{Router, http::header::SET_COOKIE, response::Response};
use axum_extra::extract::cookie::Cookie;
use uuid::Uuid;

use crate::{
    config::{AppConfig, test_config},
    cookies::JarCookies,
    error::{ChannelError, IdentityError, ProfileStoreError},
    identity::IdentityProvider,
    models::{AppMetadata, ChannelInfo, Profile, Session, User},
    repositories::ProfileStore,
    routes::create_router,
    session::SessionManager,
    state::AppState,
    youtube::ChannelDirectory,
};

pub(crate) const TEST_STORAGE_KEY: &str = "sb-test-auth-token";

fn rejected(status: u16, message: &str) -> IdentityError {
    IdentityError::Rejected {
        status,
        message: message.to_string(),
    }
}

pub(crate) struct FakeIdentity {
    session: Mutex<Session>,
    fail_exchange: AtomicBool,
    fail_user: AtomicBool,
    exchange_calls: AtomicUsize,
    user_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    last_exchange: Mutex<Option<(String, String)>>,
}

impl FakeIdentity {
    fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            fail_exchange: AtomicBool::new(false),
            fail_user: AtomicBool::new(false),
            exchange_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            last_exchange: Mutex::new(None),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn last_exchange(&self) -> Option<(String, String)> {
        self.last_exchange.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<Session, IdentityError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock().unwrap() = Some((code.to_string(), code_verifier.to_string()));
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(rejected(400, "invalid flow state"));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        let session = self.session.lock().unwrap().clone();
        if self.fail_user.load(Ordering::SeqCst) || access_token != session.access_token {
            return Err(rejected(401, "invalid JWT"));
        }
        Ok(session.user)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FakeChannels {
    fail: AtomicBool,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl FakeChannels {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelDirectory for FakeChannels {
    async fn fetch_own_channel(&self, provider_token: &str) -> Result<ChannelInfo, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(provider_token.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::Rejected {
                status: 403,
                message: "insufficient scope".to_string(),
            });
        }
        Ok(ChannelInfo {
            channel_id: "UC1234567890".to_string(),
            handle: Some("@creator".to_string()),
        })
    }
}

/// Records every upsert, optionally failing after recording
pub(crate) struct RecordingProfiles {
    fail: AtomicBool,
    upserts: Mutex<Vec<(Profile, String)>>,
}

impl RecordingProfiles {
    pub fn upserts(&self) -> Vec<(Profile, String)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileStore for RecordingProfiles {
    async fn upsert(&self, profile: &Profile, access_token: &str) -> Result<(), ProfileStoreError> {
        self.upserts
            .lock()
            .unwrap()
            .push((profile.clone(), access_token.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProfileStoreError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Router wired to fakes, with knobs for each failure mode
pub(crate) struct Harness {
    config: AppConfig,
    pub identity: Arc<FakeIdentity>,
    pub channels: Arc<FakeChannels>,
    pub profiles: Arc<RecordingProfiles>,
}

impl Harness {
    pub fn new() -> Self {
        Self::from_config(test_config())
    }

    pub fn with_site_url(site_url: &str) -> Self {
        let mut config = test_config();
        config.site_url = Some(site_url.to_string());
        Self::from_config(config)
    }

    fn from_config(config: AppConfig) -> Self {
        let session = Session {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            refresh_token: "refresh".to_string(),
            user: User {
                id: Uuid::new_v4(),
                email: Some("creator@example.com".to_string()),
                app_metadata: AppMetadata {
                    provider: Some("google".to_string()),
                },
            },
            provider_token: Some("ya29.provider".to_string()),
            provider_refresh_token: None,
        };

        Self {
            config,
            identity: Arc::new(FakeIdentity::new(session)),
            channels: Arc::new(FakeChannels {
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
                last_token: Mutex::new(None),
            }),
            profiles: Arc::new(RecordingProfiles {
                fail: AtomicBool::new(false),
                upserts: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_provider_token(self, token: Option<&str>) -> Self {
        self.identity.session.lock().unwrap().provider_token = token.map(str::to_string);
        self
    }

    pub fn with_signup_provider(self, provider: &str) -> Self {
        self.identity.session.lock().unwrap().user.app_metadata.provider =
            Some(provider.to_string());
        self
    }

    pub fn failing_exchange(self) -> Self {
        self.identity.fail_exchange.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_user_lookup(self) -> Self {
        self.identity.fail_user.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_channel_lookup(self) -> Self {
        self.channels.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_profile_store(self) -> Self {
        self.profiles.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn session(&self) -> Session {
        self.identity.session.lock().unwrap().clone()
    }

    pub fn user_id(&self) -> Uuid {
        self.session().user.id
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.config.clone(),
            self.identity.clone(),
            self.channels.clone(),
            self.profiles.clone(),
        )
        .unwrap();
        create_router(state)
    }
}

/// `Cookie` request header carrying a stored session
pub(crate) fn session_cookie_header(session: &Session) -> String {
    let manager = SessionManager::new(TEST_STORAGE_KEY);
    let mut cookies = JarCookies::default();
    manager.store_session(&mut cookies, session).unwrap();

    cookies
        .into_jar()
        .iter()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// All cookies set by a response
pub(crate) fn set_cookies(response: &Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
        .collect()
}
