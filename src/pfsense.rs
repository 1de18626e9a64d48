// pfSense web UI client: form login with CSRF tokens, then the JSON interface-statistics endpoint.
// Appliances ship self-signed certificates, so TLS verification is off.

use crate::config::TargetConfig;
use crate::error::PollError;
use crate::models::{Cookies, CounterSnapshot};
use crate::source::{CounterRequest, TargetSource};
use crate::version;
use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const CSRF_MARKER: &str = "sid:";
const LOGIN_OK_MARKER: &str = "Dashboard";
const BODY_EXCERPT: usize = 200;

/// Extract the CSRF token from a page (`sid:<token>` up to the closing quote).
pub fn csrf_token(body: &str) -> Option<&str> {
    let start = body.find(CSRF_MARKER)? + CSRF_MARKER.len();
    let rest = &body[start..];
    let token = rest.split('"').next().unwrap_or(rest);
    (!token.is_empty()).then_some(token)
}

/// Split a `Cookie` header value into name -> value pairs.
pub fn parse_cookie_header(header: &str) -> Cookies {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

/// An authenticated (or resumed) connection to one appliance.
#[derive(Debug)]
pub struct PfSenseSession {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    root: String,
}

impl PfSenseSession {
    fn open(target: &TargetConfig) -> Result<Self, PollError> {
        let transport = |message: String| PollError::Transport {
            target: target.name.clone(),
            message,
        };
        let base = Url::parse(&target.url).map_err(|e| transport(format!("invalid url {}: {e}", target.url)))?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(target.timeout_secs))
            .user_agent(version::user_agent())
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| transport(e.to_string()))?;
        Ok(Self {
            http,
            jar,
            base,
            root: target.url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, page: &str) -> String {
        format!("{}/{}", self.root, page)
    }

    /// Cookies currently held for the appliance.
    pub fn cookies(&self) -> Cookies {
        self.jar
            .cookies(&self.base)
            .and_then(|h| h.to_str().ok().map(parse_cookie_header))
            .unwrap_or_default()
    }

    fn load_cookies(&self, cookies: &Cookies) {
        for (name, value) in cookies {
            self.jar.add_cookie_str(&format!("{name}={value}"), &self.base);
        }
    }

    async fn get_text(&self, target: &str, url: &str) -> Result<String, PollError> {
        let resp = self.http.get(url).send().await.map_err(|e| PollError::Transport {
            target: target.to_string(),
            message: e.to_string(),
        })?;
        read_ok_body(target, resp).await
    }

    async fn csrf(&self, target: &str, url: &str) -> Result<String, PollError> {
        let body = self.get_text(target, url).await?;
        csrf_token(&body).map(str::to_string).ok_or_else(|| PollError::Auth {
            target: target.to_string(),
            message: format!("no CSRF token on {url}"),
        })
    }
}

async fn read_ok_body(target: &str, resp: reqwest::Response) -> Result<String, PollError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| PollError::Transport {
        target: target.to_string(),
        message: e.to_string(),
    })?;
    if status != StatusCode::OK {
        return Err(PollError::Transport {
            target: target.to_string(),
            message: format!("HTTP {status}: {}", excerpt(&body)),
        });
    }
    Ok(body)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PfSenseClient;

impl PfSenseClient {
    pub fn new() -> Self {
        Self
    }
}

// Interface names and gateway status come from an external markup scraper; both keep the
// trait defaults here.
impl TargetSource for PfSenseClient {
    type Session = PfSenseSession;

    async fn resume(&self, target: &TargetConfig, cookies: &Cookies) -> Result<PfSenseSession, PollError> {
        let session = PfSenseSession::open(target)?;
        session.load_cookies(cookies);
        debug!(firewall = %target.name, cookies = cookies.len(), "resumed session from cache");
        Ok(session)
    }

    #[instrument(skip_all, fields(firewall = %target.name, operation = "login"))]
    async fn login(&self, target: &TargetConfig) -> Result<(PfSenseSession, Cookies), PollError> {
        let session = PfSenseSession::open(target)?;
        let token = session.csrf(&target.name, &session.root).await?;
        let form = [
            ("__csrf_magic", format!("{CSRF_MARKER}{token}")),
            ("usernamefld", target.username.clone()),
            ("passwordfld", target.password.clone()),
            ("login", "Sign In".to_string()),
        ];
        let resp = session
            .http
            .post(&session.root)
            .form(&form)
            .send()
            .await
            .map_err(|e| PollError::Transport {
                target: target.name.clone(),
                message: e.to_string(),
            })?;
        let body = read_ok_body(&target.name, resp).await?;
        if !body.contains(LOGIN_OK_MARKER) {
            return Err(PollError::Auth {
                target: target.name.clone(),
                message: "login did not reach the dashboard".to_string(),
            });
        }
        let cookies = session.cookies();
        debug!(cookies = cookies.len(), "logged in");
        Ok((session, cookies))
    }

    #[instrument(skip_all, fields(firewall = %target.name, operation = "counters"))]
    async fn counters(
        &self,
        session: &PfSenseSession,
        target: &TargetConfig,
        request: &CounterRequest,
    ) -> Result<CounterSnapshot, PollError> {
        let token = session.csrf(&target.name, &session.endpoint("index.php")).await?;
        let form = [
            ("__csrf_magic", format!("{CSRF_MARKER}{token}")),
            ("if", request.interfaces.join("|")),
            ("realif", request.real_interfaces.join("|")),
        ];
        let resp = session
            .http
            .post(session.endpoint("ifstats.php"))
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await
            .map_err(|e| PollError::Transport {
                target: target.name.clone(),
                message: e.to_string(),
            })?;
        let body = read_ok_body(&target.name, resp).await?;
        let snapshot: CounterSnapshot = serde_json::from_str(&body).map_err(|e| PollError::Parse {
            target: target.name.clone(),
            message: format!("{e}: {}", excerpt(&body)),
        })?;
        debug!(interfaces = snapshot.len(), "fetched counters");
        Ok(snapshot)
    }
}
