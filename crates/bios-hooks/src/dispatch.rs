use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bios_core::BiosError;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::event::{HookEvent, HOOK_KEYS};

/// Delivery of lifecycle notifications.
#[async_trait]
pub trait HookDispatcher: Send + Sync {
    async fn dispatch(&self, event: &HookEvent) -> Result<(), BiosError>;
}

/// Per-hook settings from the local config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// POST the payload here.
    #[serde(default)]
    pub url: String,
    /// Run this through `sh -c` with the payload on stdin.
    #[serde(default)]
    pub exec: String,
    /// Wait for `exec` to finish and fail the launch on a non-zero exit.
    #[serde(default)]
    pub wait: bool,
}

/// Hooks delivered as configured: HTTP POST and/or a local command.
pub struct ConfiguredHooks {
    hooks: HashMap<String, HookConfig>,
    client: reqwest::Client,
}

impl ConfiguredHooks {
    pub fn new(hooks: HashMap<String, HookConfig>) -> Self {
        Self {
            hooks,
            client: reqwest::Client::new(),
        }
    }

    /// Log how each known hook will be delivered.
    pub fn log_summary(&self) {
        for key in HOOK_KEYS {
            match self.hooks.get(key) {
                None => info!(hook = key, "hook not configured"),
                Some(hook) => {
                    if !hook.exec.is_empty() {
                        info!(hook = key, wait = hook.wait, "hook configured to EXEC");
                    }
                    if !hook.url.is_empty() {
                        info!(hook = key, url = %hook.url, "hook configured to POST via HTTP");
                    }
                }
            }
        }
    }

    async fn post(&self, key: &str, url: &str, payload: &serde_json::Value) -> Result<(), BiosError> {
        let resp = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| hook_error(key, format!("POST {url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(hook_error(key, format!("POST {url}: HTTP {}", resp.status())));
        }
        debug!(hook = key, url, "hook POST delivered");
        Ok(())
    }

    async fn exec(&self, key: &str, hook: &HookConfig, payload: &serde_json::Value) -> Result<(), BiosError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&hook.exec)
            .env("BIOS_HOOK", key)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| hook_error(key, format!("spawning {:?}: {e}", hook.exec)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let body = serde_json::to_vec(payload)?;
            match stdin.write_all(&body).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!(hook = key, "hook command did not read its payload");
                }
                Err(e) => return Err(hook_error(key, format!("writing payload: {e}"))),
            }
        }

        if !hook.wait {
            debug!(hook = key, "hook command started in background");
            return Ok(());
        }

        let status = child
            .wait()
            .await
            .map_err(|e| hook_error(key, format!("waiting for command: {e}")))?;
        if !status.success() {
            return Err(hook_error(key, format!("command exited with {status}")));
        }
        debug!(hook = key, "hook command finished");
        Ok(())
    }
}

fn hook_error(key: &str, reason: String) -> BiosError {
    BiosError::Hook {
        hook: key.to_string(),
        reason,
    }
}

#[async_trait]
impl HookDispatcher for ConfiguredHooks {
    async fn dispatch(&self, event: &HookEvent) -> Result<(), BiosError> {
        let key = event.key();
        let Some(hook) = self.hooks.get(key) else {
            debug!(hook = key, "hook not configured, skipping");
            return Ok(());
        };
        let payload = event.payload();

        if !hook.exec.is_empty() {
            self.exec(key, hook, &payload).await?;
        }
        if !hook.url.is_empty() {
            self.post(key, &hook.url, &payload).await?;
        }
        Ok(())
    }
}

/// Records events instead of delivering them. Used for dry runs and tests.
#[derive(Clone, Default)]
pub struct MemoryHooks {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl MemoryHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hook keys in dispatch order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.events().iter().map(HookEvent::key).collect()
    }
}

#[async_trait]
impl HookDispatcher for MemoryHooks {
    async fn dispatch(&self, event: &HookEvent) -> Result<(), BiosError> {
        info!(hook = event.key(), "hook recorded (not delivered)");
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
