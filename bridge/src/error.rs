use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("HeadDropped({0})")]
    HeadDropped(String),
    #[error("ConnectError({0:?})")]
    ConnectError(anyhow::Error),
}
