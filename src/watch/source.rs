//! Subscription seam between the synchronizer and the cluster.

use std::error::Error as StdError;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::watch::event::{RecordEvent, TargetRef};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Ordered events for one object. Ends when the server closes the watch.
pub type EventStream = BoxStream<'static, Result<RecordEvent, SourceError>>;

/// Errors raised by a [`ConfigSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The watch request itself was refused or could not be sent.
    #[error("failed to establish watch: {0}")]
    Subscribe(#[source] BoxError),

    /// An established watch broke mid-stream.
    #[error("watch stream failed: {0}")]
    Stream(#[source] BoxError),
}

impl SourceError {
    pub fn subscribe(err: impl Into<BoxError>) -> Self {
        SourceError::Subscribe(err.into())
    }

    pub fn stream(err: impl Into<BoxError>) -> Self {
        SourceError::Stream(err.into())
    }
}

/// Something that can watch a single named configuration object.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// The object this source watches.
    fn target(&self) -> &TargetRef;

    /// Open a new watch. A missing object is not an error: the stream simply
    /// yields nothing until it is created.
    async fn subscribe(&self) -> Result<EventStream, SourceError>;
}
