//! A shell runtime for a deterministic, side-effect-free form core.
//!
//! The core is a black-box state machine reached only through serialized
//! messages: events in, effect requests out, responses correlated back by
//! request id. This crate is everything around it. The [`ShellBridge`]
//! decodes effect batches, publishes view snapshots, runs HTTP and
//! streaming effects on a transport adapter, and routes their results back
//! into the core, while enforcing the correlation discipline (one
//! resolution per single-shot id, cancellation drops resolutions, protocol
//! violations are surfaced, never papered over).

pub mod codec;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod outstanding;
pub mod protocol;
pub mod transport;
pub mod view;

pub use config::{HttpTransportConfig, ShellConfig, UnknownEffectPolicy};
pub use self::core::{CoreEngine, CoreHandle};
pub use dispatcher::ShellBridge;
pub use error::{DecodeError, ProtocolViolation, ShellError};
pub use transport::{HttpTransport, Transport};
