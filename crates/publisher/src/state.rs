use std::fmt;

use tracing::debug;

/// Lifecycle of one file passing through the publisher.
///
/// ```text
/// Idle -> MetadataComputed -> Uploading -> Succeeded | Failed
///                                 \-> PublicizePending -> Succeeded | Failed
/// Idle -> Succeeded   (record without contents)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadState {
    Idle,
    MetadataComputed,
    Uploading,
    PublicizePending,
    Succeeded,
    Failed,
}

impl UploadState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use UploadState::{Failed, Idle, MetadataComputed, PublicizePending, Succeeded, Uploading};
        matches!(
            (self, next),
            (Idle, MetadataComputed | Succeeded)
                | (MetadataComputed, Uploading)
                | (Uploading, PublicizePending | Succeeded | Failed)
                | (PublicizePending, Succeeded | Failed)
        )
    }

    /// `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::MetadataComputed => "metadata_computed",
            Self::Uploading => "uploading",
            Self::PublicizePending => "publicize_pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks the state of a single upload and logs each transition.
#[derive(Debug)]
pub(crate) struct UploadTracker {
    state: UploadState,
    #[cfg(test)]
    history: Vec<UploadState>,
}

impl UploadTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: UploadState::Idle,
            #[cfg(test)]
            history: vec![UploadState::Idle],
        }
    }

    pub(crate) fn state(&self) -> UploadState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[UploadState] {
        &self.history
    }

    pub(crate) fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal upload transition {} -> {next}",
            self.state
        );
        debug!(from = %self.state, to = %next, "upload state transition");
        self.state = next;
        #[cfg(test)]
        self.history.push(next);
    }
}
