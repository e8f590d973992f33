// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test doubles and application wiring.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use headvantage_contact::{
    build_router,
    clock::Clock,
    config::{Config, NotifierConfig},
    error::NotifyError,
    notifier::{MailTransport, OutboundEmail, TransportFuture},
    AppState, InMemoryStore, Notifier, RateLimiter,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower::ServiceExt;

/// Clock advanced by the test.
#[derive(Debug, Clone)]
pub struct SimClock {
    now: Arc<Mutex<Instant>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

/// How the recording transport responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Succeed,
    Fail,
    Hang,
}

/// Transport that records every email it is asked to send.
#[derive(Debug)]
pub struct RecordingTransport {
    mode: TransportMode,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingTransport {
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailTransport for RecordingTransport {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> TransportFuture<'a> {
        self.sent.lock().unwrap().push(email.clone());
        let mode = self.mode;
        Box::pin(async move {
            match mode {
                TransportMode::Succeed => Ok(()),
                TransportMode::Fail => Err(NotifyError::Transport("connection refused".into())),
                TransportMode::Hang => std::future::pending::<Result<(), NotifyError>>().await,
            }
        })
    }
}

/// A wired application with handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub transport: Arc<RecordingTransport>,
    pub clock: SimClock,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(Config::default(), TransportMode::Succeed)
    }

    pub fn with(config: Config, mode: TransportMode) -> Self {
        let clock = SimClock::new();
        let store = InMemoryStore::with_clock(Arc::new(clock.clone()));
        let limiter = RateLimiter::with_store(config.rate_limit.clone(), Arc::new(store));
        let transport = Arc::new(RecordingTransport::new(mode));
        let notifier = Notifier::with_transport(&config.notifier, transport.clone());
        let state = Arc::new(AppState::new(config, limiter, notifier).unwrap());

        Self {
            router: build_router(state.clone()),
            state,
            transport,
            clock,
        }
    }

    pub fn without_mail() -> Self {
        let config = Config::default();
        let clock = SimClock::new();
        let store = InMemoryStore::with_clock(Arc::new(clock.clone()));
        let limiter = RateLimiter::with_store(config.rate_limit.clone(), Arc::new(store));
        let notifier = Notifier::from_config(&NotifierConfig::default()).unwrap();
        let state = Arc::new(AppState::new(config, limiter, notifier).unwrap());

        Self {
            router: build_router(state.clone()),
            state,
            transport: Arc::new(RecordingTransport::new(TransportMode::Succeed)),
            clock,
        }
    }

    /// POST a JSON body to `/contact` from `client`.
    pub async fn submit(&self, client: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(ip) = client {
            request = request.header("x-forwarded-for", ip);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send an arbitrary request and decode a JSON body (Null when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
