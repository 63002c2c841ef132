//! New content from archetypes.

use std::path::Path;

use crate::hugo::parse::{describe_stderr, parse_new_content, to_lines, LineSplitter};
use crate::hugo::{collect_once, HugoCommand, OutputStreams, SpawnError};
use crate::ui::{InputRequest, MessageOptions, PickItem};

use super::{CommandError, Workbench};

/// Label of the built-in archetype.
pub const DEFAULT_ARCHETYPE_NAME: &str = "[Default]";

/// A content template under `archetypes/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    /// File stem or directory name.
    pub name: String,
    /// File extension without the dot; empty for directories.
    pub ext: String,
    /// Directory ("bundle") archetypes are passed with `--kind`.
    pub is_dir: bool,
}

impl Archetype {
    /// Hugo's own default archetype.
    #[must_use]
    pub fn default_archetype() -> Self {
        Self {
            name: DEFAULT_ARCHETYPE_NAME.to_string(),
            ext: String::new(),
            is_dir: false,
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_ARCHETYPE_NAME
    }
}

/// Archetypes found in `dir`, sorted by name. Hidden entries are skipped.
///
/// # Errors
///
/// Returns an I/O error if the directory exists but cannot be read.
pub fn list_archetypes(dir: &Path) -> std::io::Result<Vec<Archetype>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut archetypes = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_dir() {
            archetypes.push(Archetype {
                name: file_name,
                ext: String::new(),
                is_dir: true,
            });
        } else {
            archetypes.push(Archetype {
                name: path
                    .file_stem()
                    .map_or(file_name.clone(), |s| s.to_string_lossy().into_owned()),
                ext: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir: false,
            });
        }
    }
    archetypes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(archetypes)
}

/// Path passed to `hugo new` for the user's answer.
///
/// Directory archetypes drop any extension. File archetypes get `.md` when
/// no extension was given and live under the archetype's section.
#[must_use]
pub fn content_path(input: &str, archetype: &Archetype) -> String {
    let parsed = Path::new(input);
    if archetype.is_dir {
        let stem = parsed
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match parsed.parent().map(|p| p.to_string_lossy().into_owned()) {
            Some(dir) if !dir.is_empty() => format!("{dir}/{stem}"),
            _ => stem,
        }
    } else {
        let path = if parsed.extension().is_none() {
            format!("{input}.md")
        } else {
            input.to_string()
        };
        if archetype.is_default() {
            path
        } else {
            format!("{}/{path}", archetype.name)
        }
    }
}

impl Workbench {
    /// Pick an archetype, ask for a name and run `hugo new`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Cancelled` if the name prompt is dismissed.
    pub async fn new_content(&self) -> Result<(), CommandError> {
        let mut archetypes = list_archetypes(&self.root.join("archetypes"))?;
        let mut archetype = Archetype::default_archetype();
        if !archetypes.is_empty() {
            archetypes.insert(0, Archetype::default_archetype());
            let items: Vec<PickItem> = archetypes
                .iter()
                .map(|a| PickItem {
                    label: a.name.clone(),
                    description: if a.is_dir { "[DIR]".to_string() } else { String::new() },
                })
                .collect();
            if let Some(index) = self
                .prompter
                .pick("Select Archetype", &items)
                .filter(|i| *i < archetypes.len())
            {
                archetype = archetypes.swap_remove(index);
            }
        }

        let arch = if archetype.is_default() {
            String::new()
        } else {
            format!("[Archetype: {}] ", archetype.name)
        };
        let input = self.prompter.input(&InputRequest {
            prompt: format!("{arch}:::: Enter file/folder name: "),
            placeholder: "default | default.md".to_string(),
            default: "default".to_string(),
        })?;
        let path = content_path(&input, &archetype);

        let snapshot = self.snapshot();
        let kind = archetype.is_dir.then_some(archetype.name.as_str());
        let mut process = self
            .hugo(HugoCommand::new_content(&snapshot.config_path, kind, &path))
            .spawn()?;
        let streams = OutputStreams::attach(&mut process).ok_or(SpawnError::StreamsUnavailable)?;
        let (first, _code) = collect_once(streams).await;

        if let Some(out) = first.stdout {
            let lines = to_lines(&out, LineSplitter::Newline);
            self.notify(&parse_new_content(&lines), MessageOptions::info());
        }
        if let Some(err) = first.stderr {
            self.notify(&describe_stderr(&err), MessageOptions::error());
        }
        Ok(())
    }
}
