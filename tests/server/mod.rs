//! Server lifecycle tests.

#[cfg(unix)]
mod lifecycle_test;

/// Verify the public server types are exported from the library.
#[test]
fn test_server_types_exported() {
    use std::sync::Arc;

    use gohugo::server::{ServerController, ServerSession, ServerState, StopOutcome, ETX};
    use gohugo::ui::memory::{MemoryNotifier, MemorySurfaceFactory};

    let controller = ServerController::new(
        Arc::new(MemoryNotifier::new()),
        Arc::new(MemorySurfaceFactory::new()),
    );
    assert_eq!(controller.state(), ServerState::Stopped);
    assert_eq!(ServerSession::default().state(), ServerState::Stopped);
    assert_eq!(ETX, 3);
    let _ = StopOutcome::NotRunning;
}

#[test]
fn test_stop_while_stopped_is_informational() {
    use std::sync::Arc;

    use gohugo::server::{ServerController, ServerState, StopOutcome};
    use gohugo::ui::memory::{MemoryNotifier, MemorySurfaceFactory};
    use gohugo::ui::MessageStatus;

    let notifier = Arc::new(MemoryNotifier::new());
    let surfaces = Arc::new(MemorySurfaceFactory::new());
    let controller = ServerController::new(notifier.clone(), surfaces.clone());

    assert_eq!(controller.stop(), StopOutcome::NotRunning);
    assert_eq!(controller.state(), ServerState::Stopped);
    assert_eq!(controller.generation(), 0);
    assert!(surfaces.opened().is_empty());

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "No Server Running");
    assert_eq!(messages[0].1.status, MessageStatus::Warning);
    assert!(!notifier.contains("Server Stopped: Success"));
}

#[test]
fn test_surface_close_without_server_is_silent() {
    use std::sync::Arc;

    use gohugo::server::{ServerController, ETX};
    use gohugo::ui::memory::{MemoryNotifier, MemorySurfaceFactory};

    let notifier = Arc::new(MemoryNotifier::new());
    let controller =
        ServerController::new(notifier.clone(), Arc::new(MemorySurfaceFactory::new()));

    controller.surface_closed();
    controller.handle_input(&[ETX]);
    assert!(notifier.messages().is_empty());
}
