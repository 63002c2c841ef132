//! Theme catalog and installer tests against a local HTTP server.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use gohugo::config::Settings;
use gohugo::theme::{
    build_http_client, InstallOutcome, ThemeCatalog, ThemeError, ThemeInstaller,
    ARCHIVE_FILE_NAME, FALLBACK_THEME_NAME,
};
use gohugo::ui::memory::MemoryNotifier;

use common::{hugo_project, serve, zip_bytes};

const LISTING: &str = r#"[
  {"name": "README.md", "html_url": "https://github.com/gohugoio/hugoThemes/blob/master/README.md", "size": 812, "type": "file"},
  {"name": "ananke", "html_url": "https://github.com/theNewDynamic/gohugo-theme-ananke/tree/1a2b3c4d5e", "size": 0, "type": "file"},
  {"name": "hugo-book", "html_url": "https://github.com/alex-shpak/hugo-book/tree/deadbeef", "size": 0, "type": "file"},
  {"name": "broken", "html_url": "", "size": 0, "type": "file"},
  {"name": "docs", "html_url": "https://github.com/gohugoio/hugoThemes/tree/master/docs", "size": 0, "type": "dir"}
]"#;

async fn listing_server(hits: Arc<AtomicUsize>) -> String {
    let router = Router::new().route(
        "/contents",
        get(move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                ([(header::CONTENT_TYPE, "application/json")], LISTING)
            }
        }),
    );
    format!("http://{}/contents", serve(router).await)
}

/// Serves a theme archive at `/acme/paper/archive/master.zip`.
async fn archive_server(disposition: Option<&'static str>, hits: Arc<AtomicUsize>) -> String {
    let body = zip_bytes(&[
        ("paper-master/", ""),
        ("paper-master/theme.toml", "name = \"Paper\"\n"),
        ("paper-master/layouts/", ""),
        ("paper-master/layouts/index.html", "<h1>{{ .Title }}</h1>\n"),
    ]);
    let router = Router::new().route(
        "/acme/paper/archive/master.zip",
        get(move || {
            let hits = Arc::clone(&hits);
            let body = body.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                let mut response = body.into_response();
                if let Some(value) = disposition {
                    response
                        .headers_mut()
                        .insert(header::CONTENT_DISPOSITION, value.parse().unwrap());
                }
                response
            }
        }),
    );
    format!("http://{}/acme/paper", serve(router).await)
}

struct Site {
    project: tempfile::TempDir,
    downloads: tempfile::TempDir,
}

impl Site {
    fn new(config: &str) -> Self {
        Self {
            project: hugo_project(config),
            downloads: tempfile::tempdir().unwrap(),
        }
    }

    fn installer(&self) -> ThemeInstaller {
        let snapshot = Settings::default().snapshot(self.project.path());
        ThemeInstaller::new(
            build_http_client().unwrap(),
            self.project.path(),
            &snapshot,
            self.downloads.path().to_path_buf(),
        )
    }

    fn config(&self) -> String {
        std::fs::read_to_string(self.project.path().join("config.toml")).unwrap()
    }
}

#[tokio::test]
async fn catalog_is_fetched_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = listing_server(Arc::clone(&hits)).await;
    let catalog = ThemeCatalog::new(build_http_client().unwrap(), url);
    assert!(!catalog.is_cached());

    let themes = catalog.themes().await.unwrap();
    let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ananke", "hugo-book"]);
    assert_eq!(
        themes[0].url,
        "https://github.com/theNewDynamic/gohugo-theme-ananke/"
    );
    assert_eq!(themes[1].url, "https://github.com/alex-shpak/hugo-book/");

    catalog.themes().await.unwrap();
    assert!(catalog.is_cached());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_catalog_fetch_is_retried() {
    let router = Router::new().route("/contents", get(|| async { StatusCode::FORBIDDEN }));
    let url = format!("http://{}/contents", serve(router).await);
    let catalog = ThemeCatalog::new(build_http_client().unwrap(), url);

    let err = catalog.themes().await.unwrap_err();
    assert!(matches!(err, ThemeError::Catalog(_)));
    assert!(!catalog.is_cached());
}

#[tokio::test]
async fn install_downloads_extracts_and_activates() {
    let hits = Arc::new(AtomicUsize::new(0));
    let repo = archive_server(
        Some("attachment; filename=paper-master.zip"),
        Arc::clone(&hits),
    )
    .await;
    let site = Site::new("baseURL = \"https://example.org/\"\ntheme = \"old\"\n");
    let notifier = MemoryNotifier::new();

    let outcome = site.installer().install(&repo, &notifier).await.unwrap();

    assert_eq!(
        outcome,
        InstallOutcome::Installed {
            name: FALLBACK_THEME_NAME.to_string()
        }
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let theme_dir = site.project.path().join("themes").join(FALLBACK_THEME_NAME);
    assert!(theme_dir.join("theme.toml").is_file());
    assert!(theme_dir.join("layouts/index.html").is_file());
    assert!(!site.project.path().join("themes/paper-master").exists());
    assert!(!site.downloads.path().join(ARCHIVE_FILE_NAME).exists());

    assert_eq!(
        site.config(),
        "baseURL = \"https://example.org/\"\ntheme = \"active-theme\"\n"
    );

    let steps: Vec<u8> = notifier.progress_steps().iter().map(|(i, _)| *i).collect();
    assert_eq!(steps, vec![0, 75, 95, 100]);
    assert_eq!(
        notifier.progress_steps()[3].1,
        format!("Applied Theme: {FALLBACK_THEME_NAME}")
    );
}

#[tokio::test]
async fn install_without_disposition_uses_archive_root() {
    let hits = Arc::new(AtomicUsize::new(0));
    let repo = archive_server(None, hits).await;
    let site = Site::new("title = \"Blog\"");
    let notifier = MemoryNotifier::new();

    site.installer().install(&repo, &notifier).await.unwrap();

    let theme_dir = site.project.path().join("themes").join(FALLBACK_THEME_NAME);
    assert!(theme_dir.join("theme.toml").is_file());
    assert_eq!(site.config(), "title = \"Blog\"\ntheme = \"active-theme\"");
}

#[tokio::test]
async fn existing_theme_skips_download() {
    let hits = Arc::new(AtomicUsize::new(0));
    let repo = archive_server(None, Arc::clone(&hits)).await;
    let site = Site::new("");
    let existing = site.project.path().join("themes").join(FALLBACK_THEME_NAME);
    std::fs::create_dir_all(&existing).unwrap();
    std::fs::write(existing.join("marker"), "keep").unwrap();
    let notifier = MemoryNotifier::new();

    let outcome = site.installer().install(&repo, &notifier).await.unwrap();

    assert!(matches!(outcome, InstallOutcome::AlreadyPresent { .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(existing.join("marker").is_file());
    assert_eq!(site.config(), "theme = \"active-theme\"");
}

#[tokio::test]
async fn install_outside_project_is_rejected() {
    let hits = Arc::new(AtomicUsize::new(0));
    let repo = archive_server(None, Arc::clone(&hits)).await;
    let site = Site::new("");
    std::fs::remove_file(site.project.path().join("config.toml")).unwrap();
    let notifier = MemoryNotifier::new();

    let err = site.installer().install(&repo, &notifier).await.unwrap_err();

    assert!(matches!(err, ThemeError::NotAProject { .. }));
    assert_eq!(err.to_string(), "Current Workspace is not a HUGO Project");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(notifier.progress_steps().is_empty());
}

#[tokio::test]
async fn missing_archive_leaves_config_untouched() {
    let router = Router::new();
    let repo = format!("http://{}/acme/gone", serve(router).await);
    let site = Site::new("theme = \"old\"\n");
    let notifier = MemoryNotifier::new();

    let err = site.installer().install(&repo, &notifier).await.unwrap_err();

    assert!(matches!(err, ThemeError::Download { .. }));
    assert_eq!(
        err.to_string(),
        format!("Unable to download theme from: {repo}/archive/master.zip")
    );
    assert_eq!(site.config(), "theme = \"old\"\n");
    assert!(!site.project.path().join("themes").exists());
}
