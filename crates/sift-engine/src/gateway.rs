//! Analyzer gateway
//!
//! All pipeline work goes through the [`Analyzers`] seam so the task
//! runner can be exercised against stub backends. The gateway loads the
//! real backend once and replays the outcome, success or failure, to every
//! later caller.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use sift_analysis::{Classifier, ParsedReport};
use sift_report::{ContentTypeInfo, MetadataEntry};

use crate::config::EngineConfig;
use crate::error::{AnalysisError, GatewayError};

/// The analysis operations the task runner fans out over.
pub trait Analyzers: Send + Sync {
    /// Whole-artifact Shannon entropy.
    fn entropy(&self, data: &[u8]) -> Result<f64, AnalysisError>;
    /// Per-chunk Shannon entropy.
    fn entropy_chunks(&self, data: &[u8]) -> Result<Vec<f64>, AnalysisError>;
    /// Cryptographic digests as titled metadata entries.
    fn digests(&self, data: &[u8]) -> Result<Vec<MetadataEntry>, AnalysisError>;
    /// Printable-string extraction.
    fn strings(&self, data: &[u8]) -> Result<Vec<String>, AnalysisError>;
    /// IP indicators over an extracted string set.
    fn ips(&self, strings: &[String]) -> Result<Vec<String>, AnalysisError>;
    /// URL indicators over an extracted string set.
    fn urls(&self, strings: &[String]) -> Result<Vec<String>, AnalysisError>;
    /// Magic-byte content classification.
    fn classify(&self, data: &[u8]) -> Result<ContentTypeInfo, AnalysisError>;
    /// Structured-format parse for the classified mime type.
    fn parse_structured(
        &self,
        mime_type: &str,
        data: &[u8],
        secret: Option<&str>,
    ) -> Result<ParsedReport, AnalysisError>;
}

/// Production analyzer backend over the analysis primitives.
#[derive(Debug)]
pub struct Engine {
    classifier: Classifier,
    config: EngineConfig,
}

impl Engine {
    /// Initialize the backend, loading the content classifier.
    pub async fn load(config: EngineConfig) -> Result<Self, GatewayError> {
        let classifier = Classifier::load()
            .await
            .map_err(|e| GatewayError::InitFailed(e.to_string()))?;
        debug!("analyzer backend loaded");
        Ok(Self { classifier, config })
    }
}

impl Analyzers for Engine {
    fn entropy(&self, data: &[u8]) -> Result<f64, AnalysisError> {
        Ok(sift_analysis::shannon(data))
    }

    fn entropy_chunks(&self, data: &[u8]) -> Result<Vec<f64>, AnalysisError> {
        Ok(sift_analysis::by_chunks(data, self.config.chunk_size)
            .into_iter()
            .map(|chunk| chunk.entropy)
            .collect())
    }

    fn digests(&self, data: &[u8]) -> Result<Vec<MetadataEntry>, AnalysisError> {
        Ok(vec![
            MetadataEntry::new("MD5", sift_analysis::hashes::md5(data)),
            MetadataEntry::new("SHA1", sift_analysis::hashes::sha1(data)),
            MetadataEntry::new("SHA256", sift_analysis::hashes::sha256(data)),
        ])
    }

    fn strings(&self, data: &[u8]) -> Result<Vec<String>, AnalysisError> {
        Ok(sift_analysis::strings::extract(
            data,
            self.config.min_string_length,
        ))
    }

    fn ips(&self, strings: &[String]) -> Result<Vec<String>, AnalysisError> {
        Ok(sift_analysis::strings::extract_ips(strings))
    }

    fn urls(&self, strings: &[String]) -> Result<Vec<String>, AnalysisError> {
        Ok(sift_analysis::strings::extract_urls(strings))
    }

    fn classify(&self, data: &[u8]) -> Result<ContentTypeInfo, AnalysisError> {
        Ok(self.classifier.classify(data))
    }

    fn parse_structured(
        &self,
        mime_type: &str,
        data: &[u8],
        secret: Option<&str>,
    ) -> Result<ParsedReport, AnalysisError> {
        sift_analysis::parse(mime_type, data, secret).map_err(|e| AnalysisError::new(e.to_string()))
    }
}

type LoaderFn =
    dyn Fn() -> BoxFuture<'static, Result<Arc<dyn Analyzers>, GatewayError>> + Send + Sync;

/// Lazy, shared handle to the analyzer backend.
///
/// The backend loads on first use. A load failure is fatal and sticky:
/// every later call observes the same [`GatewayError`] without retrying.
#[derive(Clone)]
pub struct EngineGateway {
    cell: Arc<OnceCell<Result<Arc<dyn Analyzers>, GatewayError>>>,
    loader: Arc<LoaderFn>,
    config: EngineConfig,
}

impl EngineGateway {
    /// Gateway over the production backend.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let loader_config = config.clone();
        let loader: Arc<LoaderFn> = Arc::new(move || {
            let config = loader_config.clone();
            Box::pin(async move {
                Engine::load(config)
                    .await
                    .map(|engine| Arc::new(engine) as Arc<dyn Analyzers>)
            })
        });
        Self {
            cell: Arc::new(OnceCell::new()),
            loader,
            config,
        }
    }

    /// Gateway over a custom backend loader. Used by tests to inject stub
    /// analyzers and forced load failures.
    #[must_use]
    pub fn with_loader<F>(config: EngineConfig, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<Arc<dyn Analyzers>, GatewayError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            loader: Arc::new(loader),
            config,
        }
    }

    /// The loaded backend, loading it on first call.
    pub async fn analyzers(&self) -> Result<Arc<dyn Analyzers>, GatewayError> {
        let outcome = self.cell.get_or_init(|| (self.loader)()).await;
        if let Err(e) = outcome {
            error!(error = %e, "analyzer backend unavailable");
        }
        outcome.clone()
    }

    /// Pipeline configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_gateway(fail: bool) -> (EngineGateway, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let gateway = EngineGateway::with_loader(EngineConfig::new(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if fail {
                    Err(GatewayError::InitFailed("no backend".to_string()))
                } else {
                    Engine::load(EngineConfig::new())
                        .await
                        .map(|engine| Arc::new(engine) as Arc<dyn Analyzers>)
                }
            })
        });
        (gateway, calls)
    }

    #[tokio::test]
    async fn backend_loads_exactly_once() {
        let (gateway, calls) = counting_gateway(false);

        assert!(gateway.analyzers().await.is_ok());
        assert!(gateway.analyzers().await.is_ok());
        assert!(gateway.clone().analyzers().await.is_ok());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_failure_is_sticky() {
        let (gateway, calls) = counting_gateway(true);

        let first = gateway.analyzers().await.err().unwrap();
        let second = gateway.analyzers().await.err().unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn production_backend_answers_all_operations() {
        let gateway = EngineGateway::new(EngineConfig::new());
        let analyzers = gateway.analyzers().await.unwrap();

        let data = b"see http://sift.example and 10.0.0.1 for details";
        assert!(analyzers.entropy(data).unwrap() > 0.0);
        assert_eq!(analyzers.digests(data).unwrap().len(), 3);

        let strings = analyzers.strings(data).unwrap();
        assert_eq!(analyzers.ips(&strings).unwrap(), vec!["10.0.0.1"]);
        assert_eq!(
            analyzers.urls(&strings).unwrap(),
            vec!["http://sift.example"]
        );

        let info = analyzers.classify(data).unwrap();
        assert_eq!(info.mime_type.as_deref(), Some("text/plain"));
    }
}
