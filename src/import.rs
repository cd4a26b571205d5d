// src/import.rs
// =============================================================================
// The import pipeline, start to finish.
//
// fetch README
//   -> pull Markdown out of HTML blocks        (normalize::interleave)
//   -> relative image URLs to raw URLs          (assets::rewrite)
//   -> <br>, <div>, empty tags                  (normalize::tidy)
//   -> download images, if asset_mode says so   (assets::materialize)
//   -> insert at the cursor
//
// Errors from any stage are caught here and nowhere else. The user gets one
// generic message, the log gets the details, and the document is only
// touched when everything before the insert succeeded.
// =============================================================================

use crate::assets::{find_image_urls, AssetMaterializer, AssetReference, AssetStore, ImageRewriter, MaterializeSummary};
use crate::config::{AssetMode, ImporterConfig};
use crate::editor::{InsertionTarget, Notifier, FAILURE_MESSAGE, SUCCESS_MESSAGE};
use crate::error::ImportError;
use crate::github::{parse_repository_reference, GitHubClient, RepositoryReference};
use crate::normalize::Normalizer;
use serde::Serialize;

/// "Import this repository", as handed over by the prompt or the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub repository_url: String,
}

impl ImportRequest {
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
        }
    }
}

/// Summary of a finished import, printed with --json
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub repository: RepositoryReference,
    pub asset_mode: AssetMode,
    /// Image references in the final text
    pub images: usize,
    /// Relative image URLs that were made absolute
    pub rewritten: Vec<AssetReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materialized: Option<MaterializeSummary>,
    pub bytes_inserted: usize,
}

pub struct Importer {
    client: GitHubClient,
    normalizer: Normalizer,
    config: ImporterConfig,
}

impl Importer {
    pub fn new(config: ImporterConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: GitHubClient::new(&config)?,
            normalizer: Normalizer::from_config(&config),
            config,
        })
    }

    // Runs one import and reports the outcome through `notifier`
    //
    // Returns: the report on success, None on failure (the failure has
    // already been shown and logged).
    pub async fn import_readme(
        &self,
        request: &ImportRequest,
        target: &mut dyn InsertionTarget,
        notifier: &dyn Notifier,
    ) -> Option<ImportReport> {
        let result = self.run(request, target).await;

        match result {
            Ok(report) => {
                tracing::info!(
                    repository = %report.repository,
                    bytes = report.bytes_inserted,
                    "README imported"
                );
                notifier.notify(SUCCESS_MESSAGE);
                Some(report)
            }
            Err(e) => {
                tracing::error!(
                    url = %request.repository_url,
                    stage = e.stage(),
                    error = %e,
                    "README import failed"
                );
                notifier.notify(FAILURE_MESSAGE);
                None
            }
        }
    }

    async fn run(
        &self,
        request: &ImportRequest,
        target: &mut dyn InsertionTarget,
    ) -> Result<ImportReport, ImportError> {
        let reference = parse_repository_reference(&request.repository_url);
        let raw = self.client.fetch_readme(&reference).await?;
        tracing::debug!(repository = %reference, bytes = raw.len(), "fetched README");

        let (text, rewritten) = self.transform(&raw, &reference);

        let (text, materialized) = match self.config.asset_mode {
            AssetMode::Rewrite => (text, None),
            AssetMode::Materialize => {
                let store = AssetStore::new(&self.config.storage_root, self.config.assets_dir.clone());
                let materializer = AssetMaterializer::new(
                    self.client.clone(),
                    store,
                    self.config.max_concurrent_downloads,
                );
                let (text, summary) = materializer.materialize(&text).await;
                (text, Some(summary))
            }
        };

        target.replace_selection(&text).map_err(ImportError::Insert)?;

        Ok(ImportReport {
            repository: reference,
            asset_mode: self.config.asset_mode,
            images: find_image_urls(&text).len(),
            rewritten,
            materialized,
            bytes_inserted: text.len(),
        })
    }

    // The offline part of the pipeline: everything between fetch and
    // materialize. Also used by the `normalize` command.
    pub fn transform(
        &self,
        raw: &str,
        reference: &RepositoryReference,
    ) -> (String, Vec<AssetReference>) {
        let text = self.normalizer.interleave(raw);

        let rewriter = ImageRewriter::new(reference, &self.config.web_base, &self.config.branch);
        let (text, rewritten) = rewriter.rewrite(&text);
        tracing::debug!(base = rewriter.base(), count = rewritten.len(), "rewrote relative images");

        (self.normalizer.tidy(&text), rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingTarget {
        inserted: Vec<String>,
    }

    impl InsertionTarget for RecordingTarget {
        fn replace_selection(&mut self, text: &str) -> std::io::Result<()> {
            self.inserted.push(text.to_string());
            Ok(())
        }
    }

    struct ReadOnlyTarget;

    impl InsertionTarget for ReadOnlyTarget {
        fn replace_selection(&mut self, _text: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    fn importer_for(server: &MockServer, mode: AssetMode, root: &std::path::Path) -> Importer {
        Importer::new(ImporterConfig {
            api_base: server.uri(),
            web_base: server.uri(),
            asset_mode: mode,
            storage_root: root.to_path_buf(),
            ..ImporterConfig::default()
        })
        .unwrap()
    }

    const README: &str = "<p align=\"center\">\n\
                          # Widgets\n\
                          <img src=\"docs/logo.png\">\n\
                          </p>\n\
                          \n\
                          ![shot](shot.png)<br>\n\
                          <span></span>\n";

    #[tokio::test]
    async fn test_import_rewrites_and_inserts() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_string(README))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let importer = importer_for(&mock_server, AssetMode::Rewrite, dir.path());
        let mut target = RecordingTarget::default();
        let notifier = RecordingNotifier::default();

        let report = importer
            .import_readme(
                &ImportRequest::new("https://github.com/acme/widgets"),
                &mut target,
                &notifier,
            )
            .await
            .unwrap();

        let base = format!("{}/acme/widgets/blob/main", mock_server.uri());
        let expected = format!(
            "\n\
             # Widgets\n\
             <p align=\"center\">\n\
             <img src=\"{base}/docs/logo.png?raw=true\">\n\
             </p>\n\
             \n\
             ![shot]({base}/shot.png?raw=true)\n\
             \n\
             \n"
        );

        assert_eq!(target.inserted, vec![expected]);
        assert_eq!(*notifier.messages.borrow(), vec![SUCCESS_MESSAGE.to_string()]);
        assert_eq!(report.rewritten.len(), 2);
        assert_eq!(report.images, 2);
        assert!(report.materialized.is_none());
    }

    #[tokio::test]
    async fn test_404_notifies_once_and_inserts_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/missing/readme"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let importer = importer_for(&mock_server, AssetMode::Rewrite, dir.path());
        let mut target = RecordingTarget::default();
        let notifier = RecordingNotifier::default();

        let report = importer
            .import_readme(&ImportRequest::new("acme/missing"), &mut target, &notifier)
            .await;

        assert!(report.is_none());
        assert!(target.inserted.is_empty());
        assert_eq!(*notifier.messages.borrow(), vec![FAILURE_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_insert_failure_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# hi\n"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let importer = importer_for(&mock_server, AssetMode::Rewrite, dir.path());
        let notifier = RecordingNotifier::default();

        let report = importer
            .import_readme(&ImportRequest::new("acme/widgets"), &mut ReadOnlyTarget, &notifier)
            .await;

        assert!(report.is_none());
        assert_eq!(*notifier.messages.borrow(), vec![FAILURE_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_materialize_mode_downloads_images() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# W\n![logo](img/logo.png)\n"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/acme/widgets/blob/main/img/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNG".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let importer = importer_for(&mock_server, AssetMode::Materialize, dir.path());
        let mut target = RecordingTarget::default();
        let notifier = RecordingNotifier::default();

        let report = importer
            .import_readme(&ImportRequest::new("acme/widgets"), &mut target, &notifier)
            .await
            .unwrap();

        assert_eq!(target.inserted, vec!["# W\n![logo](assets/logo.png)\n".to_string()]);
        assert_eq!(std::fs::read(dir.path().join("assets/logo.png")).unwrap(), b"PNG");
        let summary = report.materialized.unwrap();
        assert_eq!(summary.downloaded.len(), 1);
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn test_transform_pure_markdown_is_unchanged() {
        let importer = Importer::new(ImporterConfig::default()).unwrap();
        let reference = parse_repository_reference("acme/widgets");
        let input = "# Title\n\nPlain *markdown* with [a link](https://example.com).\n";
        let (out, rewritten) = importer.transform(input, &reference);
        assert_eq!(out, input);
        assert!(rewritten.is_empty());
    }
}
