mod support;

use galley_plan::analyze::analyze;
use galley_plan::classify::{LocalFile, LocalFiles};
use galley_plan::execute::{
    DeletionStatus, ExecError, ExecWarning, Executor, GalleyStatus, PagesOutcome, UploadStatus,
};
use galley_plan::plan::{Deletion, PlanMode, UploadPlan, fresh_plan, overwrite_plan};
use galley_plan::{GalleyLabel, Role};
use ojs_async::types::{WORKFLOW_STAGE_PRODUCTION, WORKFLOW_STAGE_SUBMISSION};

use support::*;

fn local(dir: &std::path::Path, entries: &[(&str, Role)]) -> LocalFiles {
    let mut files = LocalFiles::default();
    for (name, role) in entries {
        touch(dir, name);
        files.insert(LocalFile::new(dir.join(name), *role));
    }
    files
}

fn deletion(galley: GalleyLabel, filename: &str, is_main: bool) -> Deletion {
    Deletion {
        galley,
        filename: filename.into(),
        is_main,
    }
}

fn plan_with_deletions(deletions: Vec<Deletion>) -> UploadPlan {
    UploadPlan {
        mode: PlanMode::Overwrite,
        galleys_to_create: Vec::new(),
        deletions,
        uploads: Vec::new(),
        skipped: Vec::new(),
    }
}

#[tokio::test]
async fn dependent_deletions_cascade_after_main() {
    let snapshot = state(vec![(
        GalleyLabel::Html,
        7,
        vec![
            remote_file("srm_8661.html", 500, true),
            remote_file("srm_8661_Fig1.gif", 501, false),
            remote_file("srm_8661_Fig2.gif", 502, false),
        ],
    )]);
    let plan = plan_with_deletions(vec![
        deletion(GalleyLabel::Html, "srm_8661_Fig2.gif", false),
        deletion(GalleyLabel::Html, "srm_8661.html", true),
        deletion(GalleyLabel::Html, "srm_8661_Fig1.gif", false),
    ]);

    let platform = FakePlatform::new(snapshot.clone());
    let report = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    let statuses: Vec<_> = report
        .deletions
        .iter()
        .map(|(d, s)| (d.filename.as_str(), s.clone()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("srm_8661.html", DeletionStatus::Deleted { file_id: 500 }),
            ("srm_8661_Fig1.gif", DeletionStatus::AutoResolved),
            ("srm_8661_Fig2.gif", DeletionStatus::AutoResolved),
        ]
    );
    assert_eq!(report.auto_resolved_count(), 2);
    let deletes: Vec<_> = platform
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Delete(_)))
        .collect();
    assert_eq!(deletes, vec![Call::Delete(500)]);
    assert!(!report.succeeded());
}

#[tokio::test]
async fn missing_remote_file_is_reported_not_failed() {
    let snapshot = state(vec![(GalleyLabel::Pdf, 3, vec![])]);
    let plan = plan_with_deletions(vec![deletion(GalleyLabel::Pdf, "gone.pdf", true)]);
    let platform = FakePlatform::new(snapshot.clone());
    let report = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();
    assert_eq!(report.deletions[0].1, DeletionStatus::Missing);
    assert_eq!(report.failed_count(), 0);
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn overwrite_replaces_main_and_relinks_dependents() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661.html", Role::Html),
            ("srm_8661_Fig1.gif", Role::Figure),
        ],
    );
    let snapshot = state(vec![(
        GalleyLabel::Html,
        7,
        vec![
            remote_file("srm_8661.html", 500, true),
            remote_file("srm_8661_Fig1.gif", 501, false),
        ],
    )]);
    let report = analyze(&files, &snapshot);
    let plan = overwrite_plan(&files, &report, &snapshot);

    let platform = FakePlatform::new(snapshot.clone()).with_fetch_results([Err(404), Err(403)]);
    let exec = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert_eq!(exec.deleted_count(), 1);
    assert_eq!(exec.auto_resolved_count(), 1);
    assert_eq!(exec.uploaded_count(), 2);
    assert!(exec.warnings.is_empty());

    let calls = platform.calls();
    let main_id = match &exec.uploads[0].1 {
        UploadStatus::Uploaded { file_id, .. } => *file_id,
        other => panic!("unexpected {other:?}"),
    };
    let fetches: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Fetch { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        fetches,
        vec![
            WORKFLOW_STAGE_PRODUCTION,
            WORKFLOW_STAGE_PRODUCTION,
            WORKFLOW_STAGE_SUBMISSION,
        ]
    );
    assert_eq!(
        exec.uploads[1].1,
        UploadStatus::Uploaded {
            file_id: main_id + 1,
            parent_id: Some(main_id),
        }
    );
    assert!(calls.contains(&Call::RemoteState));
}

#[tokio::test]
async fn overwrite_of_figures_keeps_published_html_main() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661_Fig1.gif", Role::Figure),
            ("srm_8661_Fig2.gif", Role::Figure),
        ],
    );
    let snapshot = state(vec![(
        GalleyLabel::Html,
        7,
        vec![
            remote_file("srm_8661.html", 500, true),
            remote_file("srm_8661_Fig1.gif", 501, false),
        ],
    )]);
    let report = analyze(&files, &snapshot);
    let plan = overwrite_plan(&files, &report, &snapshot);

    let platform = FakePlatform::new(snapshot.clone());
    let exec = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert_eq!(exec.deletions[0].1, DeletionStatus::Deleted { file_id: 501 });
    assert_eq!(exec.uploaded_count(), 2);
    assert!(exec.uploads.iter().all(|(_, s)| matches!(
        s,
        UploadStatus::Uploaded {
            parent_id: Some(500),
            ..
        }
    )));
    let html = platform.snapshot().unwrap();
    let names: Vec<_> = html.galleys[0].files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["srm_8661.html", "srm_8661_Fig1.gif", "srm_8661_Fig2.gif"]);
}

#[tokio::test]
async fn unverified_main_warns_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661.html", Role::Html),
            ("style.css", Role::Css),
        ],
    );
    let snapshot = state(vec![(GalleyLabel::Html, 7, vec![])]);
    let plan = fresh_plan(&files, &snapshot);
    let platform =
        FakePlatform::new(snapshot.clone()).with_fetch_results([Err(404), Err(404), Err(404)]);

    let exec = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert_eq!(exec.uploaded_count(), 2);
    assert!(matches!(
        exec.warnings.as_slice(),
        [ExecWarning::Unverified { .. }]
    ));
}

#[tokio::test]
async fn failed_galley_creation_fails_its_uploads_without_calls() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661_OnlinePDF.pdf", Role::OnlinePdf),
            ("replication.do", Role::Replication),
        ],
    );
    let snapshot = state(vec![(GalleyLabel::Pdf, 3, vec![])]);
    let plan = fresh_plan(&files, &snapshot);
    assert_eq!(plan.galleys_to_create, vec![GalleyLabel::ReplicationFiles]);

    let platform = FakePlatform::new(snapshot.clone())
        .failing_galley(GalleyLabel::ReplicationFiles)
        .failing_upload("srm_8661_OnlinePDF.pdf");
    let exec = Executor::new(&platform, &FixedText("pp. 1-2"))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert!(matches!(exec.galleys[0].1, GalleyStatus::Failed(_)));
    assert!(exec.uploads.iter().all(|(_, s)| matches!(s, UploadStatus::Failed(_))));
    assert_eq!(platform.uploads().len(), 1);
    assert_eq!(exec.pages, PagesOutcome::NotApplicable);
    assert_eq!(exec.failed_count(), 3);
    assert!(!exec.succeeded());
}

#[tokio::test]
async fn dependents_without_parent_fail_without_calls() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661.html", Role::Html),
            ("srm_8661_Fig1.gif", Role::Figure),
        ],
    );
    let snapshot = state(vec![(GalleyLabel::Html, 7, vec![])]);
    let plan = fresh_plan(&files, &snapshot);
    let platform = FakePlatform::new(snapshot.clone()).failing_upload("srm_8661.html");

    let exec = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert_eq!(platform.uploads().len(), 1);
    assert_eq!(
        exec.warnings,
        vec![ExecWarning::NoParent {
            galley: GalleyLabel::Html
        }]
    );
    assert!(matches!(exec.uploads[1].1, UploadStatus::Failed(_)));
}

#[tokio::test]
async fn dry_run_reports_without_mutating() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(
        dir.path(),
        &[
            ("srm_8661_OnlinePDF.pdf", Role::OnlinePdf),
            ("srm_8661.html", Role::Html),
        ],
    );
    let snapshot = state(vec![(
        GalleyLabel::Pdf,
        3,
        vec![remote_file("srm_8661_OnlinePDF.pdf", 300, true)],
    )]);
    let report = analyze(&files, &snapshot);
    let plan = overwrite_plan(&files, &report, &snapshot);

    let platform = FakePlatform::new(snapshot.clone());
    let exec = Executor::new(&platform, &FixedText("Vol. 5, No. 2, pp. 100—110"))
        .with_timing(instant())
        .dry_run(true)
        .run(&plan, &snapshot)
        .await
        .unwrap();

    assert!(platform.calls().is_empty());
    assert!(exec.succeeded());
    assert_eq!(exec.deletions[0].1, DeletionStatus::Planned);
    assert_eq!(exec.galleys, vec![(GalleyLabel::Html, GalleyStatus::Planned)]);
    assert!(exec.uploads.iter().all(|(_, s)| *s == UploadStatus::Planned));
    assert_eq!(exec.pages, PagesOutcome::Preview("100-110".into()));
}

#[tokio::test]
async fn vanished_submission_stops_execution() {
    let dir = tempfile::tempdir().unwrap();
    let files = local(dir.path(), &[("srm_8661_OnlinePDF.pdf", Role::OnlinePdf)]);
    let snapshot = state(vec![]);
    let plan = fresh_plan(&files, &snapshot);

    let platform = FakePlatform::new(snapshot.clone());
    platform.vanish();
    let err = Executor::new(&platform, &FixedText(""))
        .with_timing(instant())
        .run(&plan, &snapshot)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Unavailable(SUBMISSION)));
}
