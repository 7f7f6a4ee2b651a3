//! View projection: pulling and publishing immutable snapshots.
//!
//! Repainting is effect-triggered: the projection runs only when the core
//! emits a render effect. The watch channel keeps exactly the latest
//! snapshot, which is the authoritative render target at all times; a slow
//! consumer skips intermediate snapshots but never sees a torn one.

use tokio::sync::watch;

use crate::codec;
use crate::core::CoreHandle;
use crate::error::DecodeError;
use crate::protocol::ViewModel;

pub struct ViewProjection {
    core: CoreHandle,
    max_frame_bytes: usize,
    tx: watch::Sender<ViewModel>,
}

impl ViewProjection {
    /// Build the projection and pull the initial snapshot, so subscribers
    /// always start from a complete view.
    pub fn new(core: CoreHandle, max_frame_bytes: usize) -> Result<Self, DecodeError> {
        let initial = codec::decode_view(&core.view(), max_frame_bytes)?;
        let (tx, _) = watch::channel(initial);
        Ok(Self {
            core,
            max_frame_bytes,
            tx,
        })
    }

    /// Pull a fresh snapshot from the core. Idempotent and side-effect-free:
    /// two pulls with no intervening event or resolve are structurally
    /// equal. A decode failure here is a fatal protocol error.
    pub fn pull(&self) -> Result<ViewModel, DecodeError> {
        codec::decode_view(&self.core.view(), self.max_frame_bytes)
    }

    /// Pull and publish to all subscribers.
    pub fn publish(&self) -> Result<(), DecodeError> {
        let view = self.pull()?;
        self.tx.send_replace(view);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> ViewModel {
        self.tx.borrow().clone()
    }
}
