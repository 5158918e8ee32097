use thiserror::Error;

/// Failures reported by the chat platform collaborators.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Channel {0} no longer exists")]
    ChannelMissing(u64),

    #[error(transparent)]
    Discord(#[from] Box<serenity::Error>),

    #[error("{0}")]
    Other(String),
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        PlatformError::Discord(Box::new(err))
    }
}
