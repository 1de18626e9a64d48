// Shared test helpers
#![allow(dead_code)]

use pfmon::config::{AppConfig, TargetConfig};
use pfmon::error::PollError;
use pfmon::interfaces::InterfaceNameMap;
use pfmon::models::*;
use pfmon::source::{CounterRequest, TargetSource};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Both directions of one interface at `ts`.
pub fn samples(ts: i64, in_bytes: u64, out_bytes: u64) -> Vec<DirectionSample> {
    vec![
        DirectionSample::new(ts, Some(in_bytes)),
        DirectionSample::new(ts, Some(out_bytes)),
    ]
}

/// `(id, ts, in_bytes, out_bytes)` rows to a snapshot.
pub fn snapshot(rows: &[(&str, i64, u64, u64)]) -> CounterSnapshot {
    rows.iter()
        .map(|&(id, ts, i, o)| (id.to_string(), samples(ts, i, o)))
        .collect()
}

/// Config with two targets and every file under `dir`.
pub fn config_in(dir: &Path) -> AppConfig {
    let toml = format!(
        r#"
[general]
poll_interval_secs = 10
data_dir = "{data}"
status_output = "{status}"

[session]
auth_file = "{auth}"
expiry_hours = 1

[bandwidth]
interfaces = ["wan", "lan"]
manual_ceilings = {{ lan = 100.0 }}

[bandwidth.interface_names]
wan = "WAN"
lan = "LAN"

[[targets]]
name = "fw1"
url = "https://fw1.example"
username = "admin"
password = "pw"

[[targets]]
name = "fw2"
url = "https://fw2.example"
username = "admin"
password = "pw"
"#,
        data = dir.join("data").display(),
        status = dir.join("status.json").display(),
        auth = dir.join("auth.json").display(),
    );
    AppConfig::load_from_str(&toml).expect("test config")
}

/// One scripted answer to a counter request.
pub enum Step {
    Counters(CounterSnapshot),
    Transport,
    Parse,
}

/// In-memory `TargetSource`: replays scripted counter answers per target and records calls.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<HashMap<String, VecDeque<Step>>>,
    reject_login: HashSet<String>,
    names: Option<InterfaceNameMap>,
    gateways: Vec<GatewayReading>,
    delay: Option<Duration>,
    pub counter_calls: Mutex<Vec<(String, Instant)>>,
    pub logins: Mutex<Vec<String>>,
    pub resumes: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<CounterRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(self, target: &str, step: Step) -> Self {
        self.steps
            .lock()
            .unwrap()
            .entry(target.to_string())
            .or_default()
            .push_back(step);
        self
    }

    pub fn reject_login(mut self, target: &str) -> Self {
        self.reject_login.insert(target.to_string());
        self
    }

    pub fn with_names(mut self, names: InterfaceNameMap) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_gateways(mut self, gateways: Vec<GatewayReading>) -> Self {
        self.gateways = gateways;
        self
    }

    /// Every counter request takes `delay` to answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn login_count(&self) -> usize {
        self.logins.lock().unwrap().len()
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.lock().unwrap().len()
    }
}

impl TargetSource for ScriptedSource {
    type Session = String;

    async fn resume(&self, target: &TargetConfig, _cookies: &Cookies) -> Result<String, PollError> {
        self.resumes.lock().unwrap().push(target.name.clone());
        Ok(target.name.clone())
    }

    async fn login(&self, target: &TargetConfig) -> Result<(String, Cookies), PollError> {
        if self.reject_login.contains(&target.name) {
            return Err(PollError::Auth {
                target: target.name.clone(),
                message: "bad password".into(),
            });
        }
        self.logins.lock().unwrap().push(target.name.clone());
        let cookies = BTreeMap::from([("PHPSESSID".to_string(), format!("{}-session", target.name))]);
        Ok((target.name.clone(), cookies))
    }

    async fn counters(
        &self,
        _session: &String,
        target: &TargetConfig,
        request: &CounterRequest,
    ) -> Result<CounterSnapshot, PollError> {
        self.requests.lock().unwrap().push(request.clone());
        self.counter_calls
            .lock()
            .unwrap()
            .push((target.name.clone(), Instant::now()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let step = self
            .steps
            .lock()
            .unwrap()
            .get_mut(&target.name)
            .and_then(VecDeque::pop_front);
        match step {
            Some(Step::Counters(s)) => Ok(s),
            Some(Step::Parse) => Err(PollError::Parse {
                target: target.name.clone(),
                message: "not json".into(),
            }),
            Some(Step::Transport) | None => Err(PollError::Transport {
                target: target.name.clone(),
                message: "connection refused".into(),
            }),
        }
    }

    async fn interface_names(
        &self,
        _session: &String,
        _target: &TargetConfig,
    ) -> Result<Option<InterfaceNameMap>, PollError> {
        Ok(self.names.clone())
    }

    async fn gateways(&self, _session: &String, _target: &TargetConfig) -> Result<Vec<GatewayReading>, PollError> {
        Ok(self.gateways.clone())
    }
}
