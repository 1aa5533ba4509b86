//! Session lifecycle integration tests
//!
//! Runs the session manager against stub analyzer backends to exercise
//! selection, retry-with-secret, and member re-scan flows without real
//! format parsing.

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

use sift_analysis::ParsedReport;
use sift_engine::{Analyzers, AnalysisError, EngineConfig, EngineGateway, SessionError, SessionId, SessionManager};
use sift_report::{
    AnalysisProgress, ContentTypeInfo, ItemKind, MetadataEntry, StructuredItem,
};

/// Stub backend: strings echo the artifact bytes, the structured parse
/// yields one member that stays encrypted until the right secret arrives.
struct ArchiveStub;

const STUB_SECRET: &str = "letmein";
const MEMBER_BYTES: &[u8] = b"member payload bytes";

impl Analyzers for ArchiveStub {
    fn entropy(&self, _data: &[u8]) -> Result<f64, AnalysisError> {
        Ok(1.5)
    }

    fn entropy_chunks(&self, _data: &[u8]) -> Result<Vec<f64>, AnalysisError> {
        Ok(vec![1.5])
    }

    fn digests(&self, _data: &[u8]) -> Result<Vec<MetadataEntry>, AnalysisError> {
        Ok(Vec::new())
    }

    fn strings(&self, data: &[u8]) -> Result<Vec<String>, AnalysisError> {
        Ok(vec![String::from_utf8_lossy(data).into_owned()])
    }

    fn ips(&self, _strings: &[String]) -> Result<Vec<String>, AnalysisError> {
        Ok(Vec::new())
    }

    fn urls(&self, _strings: &[String]) -> Result<Vec<String>, AnalysisError> {
        Ok(Vec::new())
    }

    fn classify(&self, _data: &[u8]) -> Result<ContentTypeInfo, AnalysisError> {
        Ok(ContentTypeInfo {
            mime_type: Some("application/zip".to_string()),
            group: Some("Archive".to_string()),
            description: Some("ZIP compressed archive".to_string()),
            extensions: vec!["zip".to_string()],
            is_text: false,
        })
    }

    fn parse_structured(
        &self,
        _mime_type: &str,
        _data: &[u8],
        secret: Option<&str>,
    ) -> Result<ParsedReport, AnalysisError> {
        let unlocked = secret == Some(STUB_SECRET);
        Ok(ParsedReport {
            items: vec![StructuredItem {
                path: "inner/member.bin".to_string(),
                kind: ItemKind::File,
                size: MEMBER_BYTES.len() as u64,
                bytes: unlocked.then(|| MEMBER_BYTES.to_vec()),
                encrypted: !unlocked,
            }],
            ..ParsedReport::default()
        })
    }
}

fn stub_gateway() -> EngineGateway {
    let analyzers: Arc<dyn Analyzers> = Arc::new(ArchiveStub);
    EngineGateway::with_loader(EngineConfig::new(), move || {
        let analyzers = analyzers.clone();
        Box::pin(async move { Ok(analyzers) })
    })
}

async fn wait_settled(manager: &SessionManager, id: SessionId) -> AnalysisProgress {
    for _ in 0..500 {
        let progress = manager.progress(id).expect("session exists");
        if progress != AnalysisProgress::Running {
            return progress;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("pipeline did not settle");
}

#[tokio::test]
async fn closing_the_selected_session_selects_its_predecessor() {
    let mut manager = SessionManager::new(stub_gateway());

    let a = manager.open("a.zip", b"aa".to_vec(), None);
    let b = manager.open("b.zip", b"bb".to_vec(), None);
    let c = manager.open("c.zip", b"cc".to_vec(), None);
    assert_eq!(manager.selected(), Some(c));
    assert_eq!(manager.len(), 3);

    manager.close(c).unwrap();
    assert_eq!(manager.selected(), Some(b));

    // Closing the selected first session clamps to the new first.
    manager.select(a).unwrap();
    manager.close(a).unwrap();
    assert_eq!(manager.selected(), Some(b));

    manager.close(b).unwrap();
    assert_eq!(manager.selected(), None);
    assert!(manager.is_empty());
}

#[tokio::test]
async fn closing_an_unselected_session_keeps_the_selection() {
    let mut manager = SessionManager::new(stub_gateway());

    let a = manager.open("a.zip", b"aa".to_vec(), None);
    let b = manager.open("b.zip", b"bb".to_vec(), None);
    let c = manager.open("c.zip", b"cc".to_vec(), None);
    assert_eq!(manager.selected(), Some(c));

    // Removal before the selection must not move it off C.
    manager.close(a).unwrap();
    assert_eq!(manager.selected(), Some(c));
    manager.close(b).unwrap();
    assert_eq!(manager.selected(), Some(c));

    // Removal after the selection leaves it untouched too.
    let d = manager.open("d.zip", b"dd".to_vec(), None);
    manager.select(c).unwrap();
    manager.close(d).unwrap();
    assert_eq!(manager.selected(), Some(c));
}

#[tokio::test]
async fn close_unknown_session_is_an_error() {
    let mut manager = SessionManager::new(stub_gateway());
    let id = manager.open("a.zip", b"aa".to_vec(), None);
    manager.close(id).unwrap();
    assert_eq!(manager.close(id), Err(SessionError::NotFound));
}

#[tokio::test]
async fn encrypted_member_needs_retry_before_scan() {
    let mut manager = SessionManager::new(stub_gateway());
    let id = manager.open("locked.zip", b"zipbytes".to_vec(), None);
    wait_settled(&manager, id).await;

    // First run: member stayed encrypted, re-scan refused.
    let err = manager.scan_member(id, "inner/member.bin").unwrap_err();
    assert_eq!(
        err,
        SessionError::MemberEncrypted("inner/member.bin".to_string())
    );

    // Retry with the secret replaces the report wholesale.
    manager.retry_with_secret(id, STUB_SECRET).unwrap();
    wait_settled(&manager, id).await;

    let report = manager.report(id).unwrap();
    let item = &report.structured.as_ref().unwrap().items[0];
    assert!(!item.encrypted);
    assert!(item.is_scannable());

    // Now the member opens as its own session over the member bytes.
    let child = manager.scan_member(id, "inner/member.bin").unwrap();
    assert_eq!(manager.selected(), Some(child));
    wait_settled(&manager, child).await;

    let child_report = manager.report(child).unwrap();
    assert_eq!(
        child_report.strings,
        vec![String::from_utf8_lossy(MEMBER_BYTES).into_owned()]
    );

    let infos = manager.sessions();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[1].name, "inner/member.bin");
    assert_eq!(infos[1].depth, 1);
}

#[tokio::test]
async fn scan_depth_is_bounded() {
    let analyzers: Arc<dyn Analyzers> = Arc::new(ArchiveStub);
    let gateway = EngineGateway::with_loader(
        EngineConfig::new().with_max_rescan_depth(1),
        move || {
            let analyzers = analyzers.clone();
            Box::pin(async move { Ok(analyzers) })
        },
    );
    let mut manager = SessionManager::new(gateway);

    let root = manager.open("root.zip", b"zipbytes".to_vec(), None);
    manager.retry_with_secret(root, STUB_SECRET).unwrap();
    wait_settled(&manager, root).await;

    let child = manager.scan_member(root, "inner/member.bin").unwrap();
    manager.retry_with_secret(child, STUB_SECRET).unwrap();
    wait_settled(&manager, child).await;

    let err = manager.scan_member(child, "inner/member.bin").unwrap_err();
    assert_eq!(err, SessionError::ScanDepthExceeded { max: 1 });
}

#[tokio::test]
async fn scan_rejects_missing_members() {
    let mut manager = SessionManager::new(stub_gateway());
    let id = manager.open("a.zip", b"zipbytes".to_vec(), None);
    wait_settled(&manager, id).await;

    let err = manager.scan_member(id, "no/such/member").unwrap_err();
    assert_eq!(err, SessionError::MemberNotFound("no/such/member".to_string()));
}

#[tokio::test]
async fn closing_mid_run_is_tolerated() {
    let mut manager = SessionManager::new(stub_gateway());
    let id = manager.open("a.zip", b"zipbytes".to_vec(), None);
    // Close before the pipeline settles; orphaned events go nowhere.
    manager.close(id).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(manager.is_empty());
}

#[tokio::test]
async fn real_backend_scans_zip_members_byte_for_byte() {
    fn sample_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("inner.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"nested text with http://sift.example inside")
            .unwrap();
        writer.finish().unwrap().into_inner()
    }

    let mut manager = SessionManager::new(EngineGateway::new(EngineConfig::new()));
    let id = manager.open("sample.zip", sample_zip(), Some("application/zip".to_string()));
    let progress = wait_settled(&manager, id).await;
    assert_eq!(progress, AnalysisProgress::Complete);

    let report = manager.report(id).unwrap();
    let info = report.content_type.as_ref().unwrap();
    assert_eq!(info.mime_type.as_deref(), Some("application/zip"));

    let items = &report.structured.as_ref().unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].path, "inner.txt");

    let child = manager.scan_member(id, "inner.txt").unwrap();
    wait_settled(&manager, child).await;

    let child_report = manager.report(child).unwrap();
    assert_eq!(
        child_report.entropy,
        Some(sift_analysis::shannon(
            b"nested text with http://sift.example inside"
        ))
    );
    assert_eq!(child_report.urls, vec!["http://sift.example".to_string()]);
    assert_eq!(
        child_report.content_type.as_ref().unwrap().mime_type.as_deref(),
        Some("text/plain")
    );
}
