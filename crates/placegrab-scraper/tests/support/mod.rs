//! Shared fixtures for the integration tests: a config pointed at a wiremock
//! server and a scriptable fake browser.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use placegrab_core::{AppConfig, ExtractionRules};
use placegrab_scraper::{BrowserLauncher, BrowserSession, Extractor, StrategyError, UpstreamCooldown};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const PLACE_ID: &str = "1826027582";
pub const MOBILE_URL: &str = "https://m.place.naver.com/restaurant/1826027582/home";
pub const PAGE_PATH: &str = "/restaurant/1826027582/home";

/// Config whose query endpoint and canonical pages live on `server`.
/// Short links are served from `localhost` on the same port so they are
/// distinguishable from canonical URLs on `127.0.0.1`.
pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        http_timeout_secs: 2,
        browser_timeout_secs: 5,
        settle_delay_ms: 0,
        user_agent: "placegrab-test/0.1".to_owned(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        query_endpoint: format!("{}/graphql", server.uri()),
        mobile_base_url: server.uri(),
        short_link_hosts: vec!["localhost".to_owned()],
        ..AppConfig::defaults()
    }
}

/// The short-link form of a path on `server`.
pub fn short_link(server: &MockServer, code: &str) -> String {
    format!("http://localhost:{}/{code}", server.address().port())
}

pub fn extractor(server: &MockServer, browser: &Arc<FakeBrowser>) -> Extractor {
    extractor_with_cooldown(server, browser, Arc::new(UpstreamCooldown::new()))
}

pub fn extractor_with_cooldown(
    server: &MockServer,
    browser: &Arc<FakeBrowser>,
    cooldown: Arc<UpstreamCooldown>,
) -> Extractor {
    let launcher: Arc<dyn BrowserLauncher> = Arc::clone(browser) as Arc<dyn BrowserLauncher>;
    Extractor::with_parts(
        &test_config(server),
        ExtractionRules::default(),
        launcher,
        cooldown,
    )
    .expect("extractor builds")
}

/// A listing photo URL on an allow-listed CDN host.
pub fn cdn_photo(n: usize) -> String {
    format!("https://ldb-phinf.pstatic.net/20240101_{n:03}/1704067200000_dining_room.jpg?type=f")
}

/// Batched query response with base info and the given menu.
pub fn query_response(name: &str, category: Option<&str>, description: Option<&str>) -> Value {
    json!([
        {"data": {"restaurant": {"base": {
            "id": PLACE_ID,
            "name": name,
            "category": category,
            "description": description
        }}}},
        {"data": {"restaurant": {"menus": [
            {"name": "비빔밥", "price": "12,000", "description": "대표 메뉴"}
        ]}}},
        {"data": {"visitorReviewStats": {"analysis": {"votedKeyword": {"details": [
            {"displayName": "음식이 맛있어요", "count": 10}
        ]}}}}}
    ])
}

/// Batched response in which every operation is a typed not-found.
pub fn query_not_found() -> Value {
    let not_found = json!({
        "data": null,
        "errors": [{"message": "Not found", "extensions": {"code": "NOT_FOUND"}}]
    });
    json!([not_found.clone(), not_found.clone(), not_found])
}

/// A mobile page embedding `state` the way the directory does.
pub fn page_with_state(state: &Value) -> String {
    format!(
        "<!doctype html><html><head><title>place</title></head><body><div id=\"app\"></div>\
         <script>window.__APOLLO_STATE__ = {state};</script>\
         <script src=\"/bundle.js\"></script></body></html>"
    )
}

/// Scriptable browser. Counters are shared with the sessions it creates.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    pub images: Vec<String>,
    pub fail_launch: bool,
    pub hang: bool,
    pub hang_close: bool,
    pub launches: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub visited: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn with_images(images: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            images,
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_launch: true,
            ..Self::default()
        })
    }

    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            hang: true,
            ..Self::default()
        })
    }

    /// Sessions whose `close` never completes.
    pub fn stuck_on_close(images: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            images,
            hang_close: true,
            ..Self::default()
        })
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("lock").clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, StrategyError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(StrategyError::Browser("no browser in test".to_owned()));
        }
        Ok(Box::new(FakeSession {
            images: self.images.clone(),
            hang: self.hang,
            hang_close: self.hang_close,
            closes: Arc::clone(&self.closes),
            visited: Arc::clone(&self.visited),
        }))
    }
}

struct FakeSession {
    images: Vec<String>,
    hang: bool,
    hang_close: bool,
    closes: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> Result<(), StrategyError> {
        self.visited.lock().expect("lock").push(url.to_owned());
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), StrategyError> {
        Ok(())
    }

    async fn image_sources(&mut self) -> Result<Vec<String>, StrategyError> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(self.images.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), StrategyError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.hang_close {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}
