//! Classifiers for Hugo output.
//!
//! Raw chunks are split into lines and handed to pure classifier functions.
//! All classifiers except the build report are first-match-wins: once a line
//! fires, later lines are not looked at.

use std::sync::LazyLock;

use owo_colors::OwoColorize;
use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));
static SERVER_READY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Web Server is available at").expect("valid regex"));
static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)error").expect("valid regex"));
static BUILD_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?P<key>[\w\s-]*?)[\s\t]+\|[\s\t]+(?P<value>\d+)").expect("valid regex")
});
static LEVEL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(warn|error|info)\b").expect("valid regex"));
static NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(command not found|: not found|is not recognized as an internal or external command)")
        .expect("valid regex")
});

/// Message shown when the shell cannot find the Hugo executable.
pub const NOT_FOUND_MESSAGE: &str = "Hugo executable not found. Install Hugo and add it to PATH.";

/// How a chunk is split into lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineSplitter {
    /// Any run of whitespace; used for the version banner.
    #[default]
    Whitespace,
    /// `\n` or `\r\n`.
    Newline,
}

/// Split a raw chunk into lines.
///
/// A trailing empty segment left by a terminating separator is dropped.
#[must_use]
pub fn to_lines(chunk: &str, splitter: LineSplitter) -> Vec<String> {
    let re = match splitter {
        LineSplitter::Whitespace => &*WHITESPACE,
        LineSplitter::Newline => &*NEWLINE,
    };
    let mut lines: Vec<String> = re.split(chunk).map(str::to_string).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Human name of the host platform.
#[must_use]
pub fn platform_name() -> &'static str {
    platform_name_for(std::env::consts::OS)
}

/// Map an OS identifier (`std::env::consts::OS`) to a display name.
#[must_use]
pub fn platform_name_for(os: &str) -> &'static str {
    match os {
        "macos" => "MacOS",
        "windows" => "Windows",
        "android" => "Android",
        _ => "Linux",
    }
}

/// Format the output of `hugo version`.
///
/// Line 0 is the echoed command and line 1 the version string.
#[must_use]
pub fn parse_version(lines: &[String]) -> String {
    let command = lines.first().map_or("", String::as_str);
    let version = lines.get(1).map_or("", String::as_str);
    format!(
        "Command: {command}\nVersion: {version}\nPlatform: {}",
        platform_name()
    )
}

/// Outcome of classifying dev-server output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerSignal {
    /// The server is listening; carries the message to show.
    Ready(String),
    /// An error line, verbatim.
    Failed(String),
}

/// Local URL for the configured port.
#[must_use]
pub fn local_url(port: u16) -> String {
    format!("http://localhost:{port}/")
}

/// Classify dev-server output.
///
/// The URL is built from the configured port, not the one Hugo prints.
#[must_use]
pub fn parse_server_output(lines: &[String], port: u16) -> Option<ServerSignal> {
    for line in lines {
        if SERVER_READY.is_match(line) {
            return Some(ServerSignal::Ready(format!(
                "Server Running at {}",
                local_url(port)
            )));
        } else if ERROR_LINE.is_match(line) {
            return Some(ServerSignal::Failed(line.clone()));
        }
    }
    None
}

/// Message after `hugo new site`.
#[must_use]
pub fn parse_new_site(lines: &[String], project_name: &str) -> String {
    let first = lines.first().map_or("", String::as_str);
    format!("Created: {project_name},\n\n{first}")
}

/// Message after `hugo new <content>`: the first line.
#[must_use]
pub fn parse_new_content(lines: &[String]) -> String {
    lines.first().cloned().unwrap_or_default()
}

/// One `key | value` row of the build summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRow {
    pub key: String,
    pub value: String,
}

/// Summary rows collected from a production build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    rows: Vec<BuildRow>,
}

impl BuildReport {
    /// Collect every matching row; non-matching lines are dropped.
    #[must_use]
    pub fn from_lines(lines: &[String]) -> Self {
        let mut report = Self::default();
        report.extend(lines);
        report
    }

    /// Append rows from another chunk's lines.
    pub fn extend(&mut self, lines: &[String]) {
        for line in lines {
            if let Some(caps) = BUILD_ROW.captures(line) {
                self.rows.push(BuildRow {
                    key: caps["key"].to_string(),
                    value: caps["value"].to_string(),
                });
            }
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[BuildRow] {
        &self.rows
    }

    /// Value for `key`, if a row with that key was seen.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.value.as_str())
    }

    /// Render as the success message shown after a build.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec!["Build Success:\n".to_string()];
        lines.extend(
            self.rows
                .iter()
                .map(|r| format!("{:<18}: {}", r.key, r.value)),
        );
        lines.join("\n")
    }
}

/// Colorize severity tokens for the terminal surface.
#[must_use]
pub fn colorize_levels(line: &str) -> String {
    LEVEL_TOKEN
        .replace_all(line, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            match token.to_ascii_lowercase().as_str() {
                "warn" => token.yellow().to_string(),
                "error" => token.red().to_string(),
                _ => token.cyan().to_string(),
            }
        })
        .into_owned()
}

/// Whether a stderr chunk is the shell reporting a missing executable.
#[must_use]
pub fn is_not_found(chunk: &str) -> bool {
    NOT_FOUND.is_match(chunk)
}

/// User-facing text for a stderr chunk.
#[must_use]
pub fn describe_stderr(chunk: &str) -> String {
    if is_not_found(chunk) {
        NOT_FOUND_MESSAGE.to_string()
    } else {
        chunk.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn whitespace_split_of_version_banner() {
        let out = to_lines("hugo v0.120.0-abc linux/amd64\n", LineSplitter::Whitespace);
        assert_eq!(out, vec!["hugo", "v0.120.0-abc", "linux/amd64"]);
    }

    #[test]
    fn newline_split_handles_crlf() {
        let out = to_lines("one\r\ntwo\nthree", LineSplitter::Newline);
        assert_eq!(out, vec!["one", "two", "three"]);
    }

    #[test]
    fn platform_names() {
        assert_eq!(platform_name_for("macos"), "MacOS");
        assert_eq!(platform_name_for("windows"), "Windows");
        assert_eq!(platform_name_for("android"), "Android");
        assert_eq!(platform_name_for("freebsd"), "Linux");
        assert_eq!(platform_name_for("linux"), "Linux");
    }

    #[test]
    fn version_message_has_all_parts() {
        let msg = parse_version(&lines(&["hugo", "v0.120.0"]));
        assert!(msg.starts_with("Command: hugo\nVersion: v0.120.0\nPlatform: "));
    }

    #[test]
    fn server_ready_uses_configured_port() {
        let out = lines(&["Starting...", "Web Server is available at //localhost:1313/"]);
        match parse_server_output(&out, 3000) {
            Some(ServerSignal::Ready(msg)) => {
                assert!(msg.contains("http://localhost:3000/"));
                assert!(!msg.contains("1313"));
            }
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn server_error_before_ready_wins() {
        let out = lines(&[
            "Error: module \"x\" not found",
            "Web Server is available at //localhost:1313/",
        ]);
        assert_eq!(
            parse_server_output(&out, 3000),
            Some(ServerSignal::Failed("Error: module \"x\" not found".to_string()))
        );
    }

    #[test]
    fn server_ready_match_is_case_insensitive() {
        let out = lines(&["WEB SERVER IS AVAILABLE AT //localhost:1313/"]);
        assert!(matches!(
            parse_server_output(&out, 1313),
            Some(ServerSignal::Ready(_))
        ));
    }

    #[test]
    fn server_no_match_is_none() {
        assert_eq!(parse_server_output(&lines(&["Building sites …"]), 3000), None);
    }

    #[test]
    fn build_row_extracted() {
        let report = BuildReport::from_lines(&lines(&["Pages            |  42"]));
        assert_eq!(report.get("Pages"), Some("42"));
    }

    #[test]
    fn build_report_drops_non_rows() {
        let report = BuildReport::from_lines(&lines(&[
            "Start building sites …",
            "                   | EN",
            "-------------------+-----",
            "  Pages            | 10",
            "  Static files     |  3",
            "  Processed images |  0",
            "Total in 52 ms",
        ]));
        assert_eq!(report.rows().len(), 3);
        assert_eq!(report.get("Pages"), Some("10"));
        assert_eq!(report.get("Static files"), Some("3"));
        assert_eq!(report.get("Processed images"), Some("0"));
    }

    #[test]
    fn build_report_render() {
        let report = BuildReport::from_lines(&lines(&["Pages | 4"]));
        assert_eq!(report.render(), "Build Success:\n\nPages             : 4");
    }

    #[test]
    fn colorize_wraps_tokens() {
        let out = colorize_levels("WARN something; error here; info");
        assert!(out.contains(&"WARN".yellow().to_string()));
        assert!(out.contains(&"error".red().to_string()));
        assert!(out.contains(&"info".cyan().to_string()));
    }

    #[test]
    fn colorize_leaves_plain_lines_alone() {
        assert_eq!(colorize_levels("Built in 5 ms"), "Built in 5 ms");
    }

    #[test]
    fn not_found_detection() {
        assert!(is_not_found("sh: 1: exec: hugo: not found\n"));
        assert!(is_not_found("bash: hugo: command not found"));
        assert!(is_not_found(
            "'hugo' is not recognized as an internal or external command,"
        ));
        assert!(!is_not_found("Error: config file not readable"));
        assert_eq!(describe_stderr("zsh: command not found: hugo"), NOT_FOUND_MESSAGE);
        assert_eq!(describe_stderr("boom\n"), "boom");
    }
}
