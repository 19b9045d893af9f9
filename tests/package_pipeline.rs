use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use zip::write::FileOptions;
use zip::ZipWriter;

use daily_insp::error::{CmsResult, PackageResult};
use daily_insp::services::{AutoConfirm, Confirmation, DocumentConverter, HtmlFieldExtractor};
use daily_insp::{
    BatchDriver, BatchStats, CmsError, CmsSession, Config, FailurePolicy, PackageCtx,
    PackageError, PackageFlow, PackageOutcome, PackageRecord,
};

// ========== 测试替身 ==========

/// 记录调用顺序的 CMS 会话
#[derive(Default)]
struct FakeSession {
    calls: Mutex<Vec<&'static str>>,
    records: Mutex<Vec<PackageRecord>>,
    /// 第 N 次 inspiration_details 的返回值，超出部分返回 true
    saves: Mutex<Vec<CmsResult<bool>>>,
    fail_login: bool,
    quit_count: AtomicUsize,
}

impl FakeSession {
    fn with_saves(saves: Vec<CmsResult<bool>>) -> Self {
        Self {
            saves: Mutex::new(saves.into_iter().rev().collect()),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| **c == name).count()
    }

    fn quit_count(&self) -> usize {
        self.quit_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CmsSession for FakeSession {
    async fn login(&self) -> CmsResult<()> {
        self.calls.lock().unwrap().push("login");
        if self.fail_login {
            return Err(CmsError::LoginFailed("bad credentials".to_string()));
        }
        Ok(())
    }

    async fn inspiration_details(&self, record: &PackageRecord) -> CmsResult<bool> {
        self.calls.lock().unwrap().push("inspiration_details");
        self.records.lock().unwrap().push(record.clone());
        self.saves.lock().unwrap().pop().unwrap_or(Ok(true))
    }

    async fn get_url(&self) -> CmsResult<String> {
        self.calls.lock().unwrap().push("get_url");
        Ok("https://example.com/insp/42".to_string())
    }

    async fn campaign_details(&self, _record: &PackageRecord) -> CmsResult<()> {
        self.calls.lock().unwrap().push("campaign_details");
        Ok(())
    }

    async fn quit(&mut self) -> CmsResult<()> {
        self.quit_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 不调用 pandoc，直接返回固定的 HTML
struct FakeConverter {
    markup: Option<String>,
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert(&self, path: &Path) -> PackageResult<String> {
        self.markup.clone().ok_or_else(|| PackageError::Conversion {
            path: path.to_path_buf(),
            message: "unsupported document".to_string(),
        })
    }
}

type ConfirmCalls = Arc<Mutex<Vec<(String, bool)>>>;

/// 记录每次确认的提示语，以及确认时工作目录是否还在
struct RecordingConfirmation {
    work_dir: PathBuf,
    calls: ConfirmCalls,
    fail: bool,
}

#[async_trait]
impl Confirmation for RecordingConfirmation {
    async fn confirm(&self, prompt: &str) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), self.work_dir.exists()));
        if self.fail {
            anyhow::bail!("operator cancelled");
        }
        Ok(())
    }
}

// ========== 辅助函数 ==========

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn markup(insp_day: Option<&str>) -> String {
    let mut html = String::from(
        r#"<h1 id="title">Title</h1>
<p>Morning light</p>
<h1 id="description">Description</h1>
<p>A walk by the sea &amp; sky.</p>
"#,
    );
    if let Some(day) = insp_day {
        html.push_str(&format!("<h1 id=\"insp-day\">Insp Day</h1>\n<p>{}</p>\n", day));
    }
    html
}

fn write_archive(path: &Path, members: &[&str]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for name in members {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(b"content").unwrap();
    }
    zip.finish().unwrap();
}

fn flow(config: &Config, markup: Option<String>) -> PackageFlow {
    PackageFlow::with_parts(
        config,
        Box::new(FakeConverter { markup }),
        Box::new(HtmlFieldExtractor),
        Box::new(AutoConfirm),
    )
    .with_reference_date(reference_date())
}

fn recording_flow(
    config: &Config,
    markup: String,
    work_dir: &Path,
    fail: bool,
) -> (PackageFlow, ConfirmCalls) {
    let calls = ConfirmCalls::default();
    let confirmation = RecordingConfirmation {
        work_dir: work_dir.to_path_buf(),
        calls: Arc::clone(&calls),
        fail,
    };
    let flow = PackageFlow::with_parts(
        config,
        Box::new(FakeConverter {
            markup: Some(markup),
        }),
        Box::new(HtmlFieldExtractor),
        Box::new(confirmation),
    )
    .with_reference_date(reference_date());
    (flow, calls)
}

fn single_package(dir: &Path, members: &[&str]) -> (PackageCtx, PathBuf) {
    let archive = dir.join("package.zip");
    write_archive(&archive, members);
    (PackageCtx::new(1, &archive, false, false), dir.join("tmp"))
}

// ========== 单个资料包 ==========

#[tokio::test]
async fn test_published_package_is_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();

    let outcome = flow(&config, Some(markup(Some("Day 20"))))
        .run(&session, &ctx)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PackageOutcome::Published {
            live_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            url: "https://example.com/insp/42".to_string(),
        }
    );
    assert!(outcome.is_published());
    assert_eq!(
        session.calls(),
        vec!["inspiration_details", "get_url", "campaign_details"]
    );
    assert!(!work_dir.exists());

    let records = session.records.lock().unwrap();
    let record = &records[0];
    assert_eq!(record.get("title"), Some("Morning light"));
    assert_eq!(record.get("description"), Some("A walk by the sea & sky."));
    assert_eq!(record.get("live_day"), Some("20"));
    assert_eq!(record.get("live_month"), Some("1"));
    assert_eq!(record.get("live_year"), Some("2024"));
    assert!(record.get("img_path").unwrap().ends_with("cover.jpg"));
}

#[tokio::test]
async fn test_png_used_when_no_jpg() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _) = single_package(dir.path(), &["story.docx", "cover.png"]);
    let config = Config::default();
    let session = FakeSession::default();

    flow(&config, Some(markup(Some("Day 20"))))
        .run(&session, &ctx)
        .await
        .unwrap();

    let records = session.records.lock().unwrap();
    assert!(records[0].get("img_path").unwrap().ends_with("cover.png"));
}

#[tokio::test]
async fn test_unparseable_day_skips_submission() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();

    let outcome = flow(&config, Some(markup(Some("Someday soon"))))
        .run(&session, &ctx)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PackageOutcome::NoLiveDate {
            requested: "Someday soon".to_string()
        }
    );
    assert!(session.calls().is_empty());
    assert!(work_dir.join("story.docx").exists());
}

#[tokio::test]
async fn test_missing_day_field_skips_submission() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();

    let outcome = flow(&config, Some(markup(None)))
        .run(&session, &ctx)
        .await
        .unwrap();

    assert!(matches!(outcome, PackageOutcome::NoLiveDate { .. }));
    assert!(session.calls().is_empty());
    assert!(work_dir.exists());
}

#[tokio::test]
async fn test_not_saved_keeps_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::with_saves(vec![Ok(false)]);

    let outcome = flow(&config, Some(markup(Some("Day 20"))))
        .run(&session, &ctx)
        .await
        .unwrap();

    assert!(matches!(outcome, PackageOutcome::NotSaved { .. }));
    assert!(!outcome.is_published());
    assert_eq!(session.calls(), vec!["inspiration_details"]);
    assert!(work_dir.join("cover.jpg").exists());
}

#[tokio::test]
async fn test_missing_image_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "notes.txt"]);
    let config = Config::default();
    let session = FakeSession::default();

    let err = flow(&config, Some(markup(Some("Day 20"))))
        .run(&session, &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::ImageNotFound { .. })
    ));
    assert!(session.calls().is_empty());
    assert!(work_dir.exists());
}

#[tokio::test]
async fn test_conversion_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();

    let err = flow(&config, None).run(&session, &ctx).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::Conversion { .. })
    ));
    assert!(session.calls().is_empty());
    assert!(work_dir.exists());
}

#[tokio::test]
async fn test_missing_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _) = single_package(dir.path(), &["cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();

    let err = flow(&config, Some(markup(Some("Day 20"))))
        .run(&session, &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::DocumentNotFound { .. })
    ));
}

// ========== 人工确认 ==========

#[tokio::test]
async fn test_confirmation_runs_once_before_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();
    let (flow, calls) = recording_flow(&config, markup(Some("Day 20")), &work_dir, false);

    let outcome = flow.run(&session, &ctx).await.unwrap();

    assert!(outcome.is_published());
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("Finished?".to_string(), true)]
    );
    assert!(!work_dir.exists());
}

#[tokio::test]
async fn test_confirmation_skipped_when_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::with_saves(vec![Ok(false)]);
    let (flow, calls) = recording_flow(&config, markup(Some("Day 20")), &work_dir, false);

    let outcome = flow.run(&session, &ctx).await.unwrap();

    assert!(matches!(outcome, PackageOutcome::NotSaved { .. }));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_confirmation_skipped_without_live_date() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();
    let (flow, calls) = recording_flow(&config, markup(Some("Someday soon")), &work_dir, false);

    let outcome = flow.run(&session, &ctx).await.unwrap();

    assert!(matches!(outcome, PackageOutcome::NoLiveDate { .. }));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_confirmation_keeps_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, work_dir) = single_package(dir.path(), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession::default();
    let (flow, calls) = recording_flow(&config, markup(Some("Day 20")), &work_dir, true);

    let err = flow.run(&session, &ctx).await.unwrap_err();

    assert_eq!(err.to_string(), "operator cancelled");
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(
        session.calls(),
        vec!["inspiration_details", "get_url", "campaign_details"]
    );
    assert!(work_dir.join("story.docx").exists());
}

// ========== 批处理 ==========

/// 两个资料包；第一次提交返回 CMS 错误
fn failing_batch(policy: FailurePolicy) -> (tempfile::TempDir, Config, FakeSession) {
    let dir = tempfile::tempdir().unwrap();
    write_archive(&dir.path().join("a.zip"), &["story.docx", "cover.jpg"]);
    write_archive(&dir.path().join("b.zip"), &["story.docx", "cover.jpg"]);
    fs::write(dir.path().join("readme.txt"), b"not an archive").unwrap();

    let config = Config {
        failure_policy: policy,
        ..Config::default()
    };
    let session = FakeSession::with_saves(vec![Err(CmsError::ElementNotFound {
        selector: "#id_title".to_string(),
    })]);
    (dir, config, session)
}

#[tokio::test]
async fn test_abort_policy_stops_batch() {
    let (dir, config, session) = failing_batch(FailurePolicy::Abort);
    let mut driver = BatchDriver::new(
        session,
        flow(&config, Some(markup(Some("Day 20")))),
        &config,
        false,
        false,
    );

    let result = driver.run(dir.path()).await;

    assert!(result.is_err());
    assert_eq!(driver.session().count("login"), 1);
    assert_eq!(driver.session().count("inspiration_details"), 1);
    assert_eq!(driver.session().quit_count(), 1);
}

#[tokio::test]
async fn test_continue_policy_processes_remaining() {
    let (dir, config, session) = failing_batch(FailurePolicy::Continue);
    let mut driver = BatchDriver::new(
        session,
        flow(&config, Some(markup(Some("Day 20")))),
        &config,
        true,
        false,
    );

    let stats = driver.run(dir.path()).await.unwrap();

    assert_eq!(
        stats,
        BatchStats {
            total: 2,
            published: 1,
            failed: 1,
            ..Default::default()
        }
    );
    assert_eq!(driver.session().count("login"), 1);
    assert_eq!(driver.session().count("inspiration_details"), 2);
    assert_eq!(driver.session().quit_count(), 1);
}

#[tokio::test]
async fn test_login_failure_still_quits() {
    let dir = tempfile::tempdir().unwrap();
    write_archive(&dir.path().join("a.zip"), &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let session = FakeSession {
        fail_login: true,
        ..Default::default()
    };
    let mut driver = BatchDriver::new(
        session,
        flow(&config, Some(markup(Some("Day 20")))),
        &config,
        false,
        false,
    );

    let result = driver.run(dir.path()).await;

    assert!(result.is_err());
    assert_eq!(driver.session().calls(), vec!["login"]);
    assert_eq!(driver.session().quit_count(), 1);
    assert!(!dir.path().join("tmp").exists());
}

#[tokio::test]
async fn test_single_file_input() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("only.zip");
    write_archive(&archive, &["story.docx", "cover.jpg"]);
    let config = Config::default();
    let mut driver = BatchDriver::new(
        FakeSession::default(),
        flow(&config, Some(markup(Some("Day 20")))),
        &config,
        false,
        true,
    );

    let stats = driver.run(&archive).await.unwrap();

    assert_eq!(stats.total, 1);
    assert_eq!(stats.published, 1);
    assert_eq!(driver.session().quit_count(), 1);
}

#[tokio::test]
async fn test_missing_input_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let mut driver = BatchDriver::new(
        FakeSession::default(),
        flow(&config, Some(markup(Some("Day 20")))),
        &config,
        false,
        false,
    );

    let stats = driver.run(&dir.path().join("missing.zip")).await.unwrap();

    assert_eq!(stats, BatchStats::default());
    assert_eq!(driver.session().calls(), vec!["login"]);
    assert_eq!(driver.session().quit_count(), 1);
}
