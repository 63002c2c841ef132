//! Start/stop behaviour against a fake Hugo dev server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gohugo::config::Settings;
use gohugo::hugo::parse::NOT_FOUND_MESSAGE;
use gohugo::server::{ServerController, ServerState, StopOutcome, ETX, SURFACE_TITLE};
use gohugo::ui::memory::{MemoryNotifier, MemorySurfaceFactory};
use gohugo::ui::{DisplaySurface, MessageStatus};
use owo_colors::OwoColorize;

use crate::common::{eventually, fake_hugo};

const SERVING: &str = r#"echo "Start building sites"
echo "WARN deprecated option used"
echo "Web Server is available at //localhost:1313/ (bind address 127.0.0.1)"
exec sleep 30"#;

struct Fixture {
    dir: tempfile::TempDir,
    notifier: Arc<MemoryNotifier>,
    surfaces: Arc<MemorySurfaceFactory>,
    controller: ServerController,
    settings: Settings,
}

impl Fixture {
    fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_hugo(dir.path(), script);
        Self::with_binary(dir, &binary.to_string_lossy())
    }

    fn with_binary(dir: tempfile::TempDir, binary: &str) -> Self {
        let notifier = Arc::new(MemoryNotifier::new());
        let surfaces = Arc::new(MemorySurfaceFactory::new());
        let controller = ServerController::new(notifier.clone(), surfaces.clone())
            .with_binary(binary);
        let settings = Settings {
            port: 4321,
            ..Default::default()
        };
        Self {
            dir,
            notifier,
            surfaces,
            controller,
            settings,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn start(&self) {
        let snapshot = self.settings.snapshot(self.root());
        self.controller.start(self.root(), &snapshot).unwrap();
    }
}

#[tokio::test]
async fn start_reports_configured_url_and_mirrors_output() {
    let fx = Fixture::new(SERVING);
    fx.start();

    assert_eq!(fx.controller.state(), ServerState::Running);
    assert!(fx.controller.pid().is_some());
    assert!(
        eventually(|| fx
            .notifier
            .contains("Server Running at http://localhost:4321/"))
        .await
    );
    assert!(!fx.notifier.contains("1313/"));

    let surface = &fx.surfaces.opened()[0];
    assert_eq!(surface.title(), SURFACE_TITLE);
    assert!(surface.is_shown());
    assert!(eventually(|| surface.output().contains("Start building sites\r\n")).await);
    assert!(surface.output().contains(&"WARN".yellow().to_string()));

    assert_eq!(fx.controller.stop(), StopOutcome::Stopped);
}

#[tokio::test]
async fn restart_keeps_only_the_newer_process() {
    let fx = Fixture::new(SERVING);
    fx.start();
    let first = fx.controller.pid();

    fx.start();
    let second = fx.controller.pid();

    assert_ne!(first, second);
    assert_eq!(fx.controller.generation(), 2);
    assert!(fx
        .notifier
        .contains("Stopped already running server at http://localhost:4321/"));

    let opened = fx.surfaces.opened();
    assert_eq!(opened.len(), 2);
    assert!(opened[0].is_disposed());
    assert!(!opened[1].is_disposed());

    // The first process dying must not clear the new session.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(fx.controller.state(), ServerState::Running);
    assert_eq!(fx.controller.pid(), second);

    fx.controller.stop();
}

#[tokio::test]
async fn stop_disposes_surface_and_reports_success() {
    let fx = Fixture::new(SERVING);
    fx.start();

    assert_eq!(fx.controller.stop(), StopOutcome::Stopped);
    assert_eq!(fx.controller.state(), ServerState::Stopped);
    assert!(fx.surfaces.opened()[0].is_disposed());

    let (message, options) = fx.notifier.messages().last().cloned().unwrap();
    assert_eq!(message, "Server Stopped: Success");
    assert_eq!(options.status, MessageStatus::Info);

    assert_eq!(fx.controller.stop(), StopOutcome::NotRunning);
    assert!(fx.notifier.contains("No Server Running"));
}

#[tokio::test]
async fn ctrl_c_on_surface_stops_server() {
    let fx = Fixture::new(SERVING);
    fx.start();

    fx.controller.handle_input(b"x");
    assert_eq!(fx.controller.state(), ServerState::Running);

    fx.controller.handle_input(&[ETX]);
    assert_eq!(fx.controller.state(), ServerState::Stopped);
    assert!(fx.surfaces.opened()[0].is_disposed());
    assert!(fx.notifier.contains("Server Stopped: Success"));
}

#[tokio::test]
async fn closing_surface_stops_server() {
    let fx = Fixture::new(SERVING);
    fx.start();

    fx.controller.surface_closed();
    assert_eq!(fx.controller.state(), ServerState::Stopped);
}

#[tokio::test]
async fn hidden_surface_when_show_terminal_disabled() {
    let mut fx = Fixture::new(SERVING);
    fx.settings.show_terminal = false;
    fx.start();

    assert!(!fx.surfaces.opened()[0].is_shown());
    fx.controller.stop();
}

#[tokio::test]
async fn failing_server_clears_session() {
    let fx = Fixture::new("echo \"Error: failed to load config\"\nexit 3");
    fx.start();

    assert!(eventually(|| fx.controller.state() == ServerState::Stopped).await);
    assert!(eventually(|| fx.notifier.contains("Server exited with code 3")).await);
    assert!(eventually(|| fx.notifier.contains("Error: failed to load config")).await);
    assert!(!fx.notifier.contains("Server Running"));
}

#[tokio::test]
async fn missing_binary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let fx = Fixture::with_binary(dir, "gohugo-test-missing-binary");
    fx.start();

    // Spawning succeeds; the failure arrives through stderr and the exit code.
    assert!(eventually(|| fx.notifier.contains(NOT_FOUND_MESSAGE)).await);
    assert!(eventually(|| fx.controller.state() == ServerState::Stopped).await);
    assert!(eventually(|| fx.notifier.contains("Server exited with code")).await);

    let errors: Vec<String> = fx
        .notifier
        .messages()
        .into_iter()
        .filter(|(_, options)| options.status == MessageStatus::Error)
        .map(|(message, _)| message)
        .collect();
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.iter().any(|m| m == NOT_FOUND_MESSAGE), "{errors:?}");
}
