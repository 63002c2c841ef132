//! Version, new site and production build.

use crate::hugo::parse::{
    describe_stderr, parse_new_site, parse_version, to_lines, BuildReport, LineSplitter,
};
use crate::hugo::{collect_once, listen, Delivery, HugoCommand, OutputStreams, SpawnError};
use crate::ui::{InputRequest, MessageOptions};

use super::{CommandError, Workbench};

/// Default project name when the input is left empty.
pub const DEFAULT_SITE_NAME: &str = "go-hugo-site";

impl Workbench {
    /// `hugo version`, shown as a modal.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Spawn` if the shell cannot be started.
    pub async fn version(&self) -> Result<(), CommandError> {
        let mut process = self.hugo(HugoCommand::version()).spawn()?;
        let streams = OutputStreams::attach(&mut process).ok_or(SpawnError::StreamsUnavailable)?;
        let (first, _code) = collect_once(streams).await;

        if let Some(out) = first.stdout {
            let lines = to_lines(&out, LineSplitter::Whitespace);
            self.notify(&parse_version(&lines), MessageOptions::modal());
        }
        if let Some(err) = first.stderr {
            self.notify(&describe_stderr(&err), MessageOptions::error());
        }
        Ok(())
    }

    /// Prompt for a project name and scaffold a site there.
    ///
    /// Relative names resolve against the current root; on success the root
    /// moves to the new site.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Cancelled` if the prompt is dismissed.
    pub async fn new_site(&mut self) -> Result<(), CommandError> {
        let project_name = self.prompter.input(&InputRequest {
            prompt: "Provide Project Name. Use absolute path to create Project under different directory."
                .to_string(),
            placeholder: format!("{}/{{Project Name}}", self.root.display()),
            default: DEFAULT_SITE_NAME.to_string(),
        })?;
        let resolved = self.root.join(&project_name);

        let mut process = self.hugo(HugoCommand::new_site(&resolved)).spawn()?;
        let streams = OutputStreams::attach(&mut process).ok_or(SpawnError::StreamsUnavailable)?;
        let (first, code) = collect_once(streams).await;

        if let Some(out) = first.stdout {
            let lines = to_lines(&out, LineSplitter::Newline);
            if code == Some(0) {
                tracing::info!(root = %resolved.display(), "Workspace root moved to new site");
                self.root = resolved;
            }
            self.notify(&parse_new_site(&lines, &project_name), MessageOptions::info());
        }
        if let Some(err) = first.stderr {
            self.notify(&describe_stderr(&err), MessageOptions::error());
        }
        Ok(())
    }

    /// `hugo --config <config>`; shows the page/file counts when done.
    ///
    /// Every stdout chunk contributes to the report.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Spawn` if the shell cannot be started.
    pub async fn build(&self) -> Result<(), CommandError> {
        let snapshot = self.snapshot();
        let mut process = self
            .hugo(HugoCommand::build(&snapshot.config_path))
            .spawn()?;
        let OutputStreams {
            mut stdout,
            mut stderr,
            exit,
        } = OutputStreams::attach(&mut process).ok_or(SpawnError::StreamsUnavailable)?;

        let mut report = BuildReport::default();
        let collect = listen(&mut stdout, Delivery::Every, |chunk| {
            report.extend(&to_lines(&chunk, LineSplitter::Newline));
        });
        let errors = listen(&mut stderr, Delivery::Every, |chunk| {
            self.notify(&describe_stderr(&chunk), MessageOptions::error());
        });
        tokio::join!(collect, errors);

        match exit.await.unwrap_or(None) {
            Some(0) => self.notify(&report.render(), MessageOptions::modal()),
            code => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                tracing::warn!(%code, "Build failed");
                self.notify(
                    &format!("Build failed (exit code {code})"),
                    MessageOptions::error(),
                );
            }
        }
        Ok(())
    }
}
