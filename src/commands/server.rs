//! Dev server commands.

use crate::server::StopOutcome;

use super::{CommandError, Workbench};

impl Workbench {
    /// Start the dev server, replacing a running one.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Spawn` if the shell cannot be started.
    pub fn start_server(&self) -> Result<(), CommandError> {
        let snapshot = self.snapshot();
        self.server.start(&self.root, &snapshot)?;
        Ok(())
    }

    /// Stop the dev server.
    pub fn stop_server(&self) -> StopOutcome {
        self.server.stop()
    }
}
