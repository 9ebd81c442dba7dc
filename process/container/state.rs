/// Lifecycle of a [`super::ContainerImage`].
///
/// ```text
/// Created -> Prepared -> Ran (1..n runs) -> Finalized
///    \__________\___________\_________________\______-> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Created,
    Prepared,
    Ran,
    Finalized,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Prepare,
    Run,
    Finalize,
    Close,
}

impl Transition {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Prepare => "prepare",
            Self::Run => "run",
            Self::Finalize => "finalize",
            Self::Close => "close",
        }
    }
}

impl ImageState {
    /// The state reached by applying `transition`, `None` when the
    /// transition isn't allowed from this state.
    #[must_use]
    pub const fn next(self, transition: Transition) -> Option<Self> {
        match (self, transition) {
            (Self::Created, Transition::Prepare) => Some(Self::Prepared),
            (Self::Prepared | Self::Ran, Transition::Run) => Some(Self::Ran),
            (Self::Ran, Transition::Finalize) => Some(Self::Finalized),
            (_, Transition::Close) => Some(Self::Closed),
            _ => None,
        }
    }

    /// Mounts and environment can only change until the first run.
    #[must_use]
    pub const fn is_configurable(self) -> bool {
        matches!(self, Self::Created | Self::Prepared)
    }
}

impl std::fmt::Display for ImageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match *self {
            Self::Created => "created",
            Self::Prepared => "prepared",
            Self::Ran => "ran",
            Self::Finalized => "finalized",
            Self::Closed => "closed",
        })
    }
}
