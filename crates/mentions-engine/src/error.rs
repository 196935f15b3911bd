use snafu::Snafu;

/// Error type the platform collaborator traits surface transport
/// failures as; the engine never inspects it beyond logging.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResolveError {
    /// An existence or membership lookup failed; the whole resolution
    /// for the post is abandoned (fail closed, no partial output).
    #[snafu(display("Platform lookup failed"))]
    Transport { source: BoxedError },
}
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RewriteError {
    #[snafu(transparent)]
    Resolve { source: ResolveError },
}
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum NotifyError {
    #[snafu(transparent)]
    Resolve { source: ResolveError },
    #[snafu(display("Platform lookup failed"))]
    Lookup { source: BoxedError },
    #[snafu(display("Notification delivery failed"))]
    Deliver { source: BoxedError },
}
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
