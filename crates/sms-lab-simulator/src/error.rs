use sms_lab_abstract::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot build latency distribution: {0}")]
    Latency(#[from] rand_distr::NormalError),
    #[error("{task} task terminated abnormally: {source}")]
    TaskFailed {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
