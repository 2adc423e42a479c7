use core_types::RenderEnvironment;

use crate::error::SheetError;

/// One-way switch recording that an interleaving mode owns the accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SealState {
    #[default]
    Unsealed,
    Sealed,
}

impl SealState {
    pub fn is_sealed(self) -> bool {
        self == SealState::Sealed
    }

    /// Checked before any interleaving starts.
    pub fn guard(self, env: &RenderEnvironment) -> Result<(), SheetError> {
        if !env.supports_streaming() {
            let reason = if env.is_browser {
                "running in a browser context"
            } else {
                "not running in a server context"
            };
            return Err(SheetError::UnsupportedEnvironment { reason });
        }
        self.assert_not_sealed()
    }

    pub fn assert_not_sealed(self) -> Result<(), SheetError> {
        match self {
            SealState::Unsealed => Ok(()),
            SealState::Sealed => Err(SheetError::AlreadySealed),
        }
    }

    pub fn seal(&mut self) {
        if *self == SealState::Unsealed {
            log::debug!(target: "ssr.seal", "sheet sealed");
        }
        *self = SealState::Sealed;
    }
}
