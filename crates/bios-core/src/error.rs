use thiserror::Error;

pub type Result<T, E = BiosError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BiosError {
    // ── Setup errors ─────────────────────────────────────────────────────────
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    // ── Schedule errors ──────────────────────────────────────────────────────
    #[error("schedule too small: {needed} clones needed, at most {max} available")]
    ScheduleTooSmall { needed: usize, max: usize },

    #[error(
        "no local producer found for account {0:?} (make sure producer.my_account \
         in your config matches an entry in the launch file)"
    )]
    UnknownProducer(String),

    // ── Kickstart handoff errors ─────────────────────────────────────────────
    #[error("malformed kickstart data: {0}")]
    MalformedHandoff(String),

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    // ── Chain errors ─────────────────────────────────────────────────────────
    #[error("submitting actions for step {step:?}, batch {batch}: {reason}")]
    ChainSubmission {
        step: String,
        batch: usize,
        reason: String,
    },

    #[error("chain client: {0}")]
    Chain(String),

    #[error("unknown boot sequence operation: {0}")]
    UnknownOperation(String),

    #[error("building actions for step {step:?}: {reason}")]
    ActionBuild { step: String, reason: String },

    // ── Hooks ────────────────────────────────────────────────────────────────
    #[error("hook {hook:?} failed: {reason}")]
    Hook { hook: String, reason: String },

    // ── Serialization / IO ───────────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // ── Orchestration ────────────────────────────────────────────────────────
    #[error("{stage}: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<BiosError>,
    },
}

impl BiosError {
    /// Wrap this error with the name of the launch stage it aborted.
    pub fn in_stage(self, stage: &'static str) -> Self {
        BiosError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        BiosError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The innermost error, with stage wrappers removed.
    pub fn root(&self) -> &BiosError {
        match self {
            BiosError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for BiosError {
    fn from(e: serde_json::Error) -> Self {
        BiosError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wrapper_names_stage_and_keeps_root() {
        let err = BiosError::ChainSubmission {
            step: "create producers".into(),
            batch: 1,
            reason: "tx rejected".into(),
        }
        .in_stage("boot node stage");

        let msg = err.to_string();
        assert!(msg.starts_with("boot node stage: "), "got {msg}");
        assert!(msg.contains("batch 1"));
        assert!(matches!(
            err.root(),
            BiosError::ChainSubmission { batch: 1, .. }
        ));
    }
}
