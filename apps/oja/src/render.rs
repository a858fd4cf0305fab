//! Console output: trees of local and online files, the analysis, the plan
//! and the execution report.

use colored::Colorize;
use galley_plan::analyze::{ConflictReport, NewFileStatus};
use galley_plan::execute::{DeletionStatus, GalleyStatus, PagesOutcome, UploadStatus};
use galley_plan::plan::{PlanChoice, SkipReason};
use galley_plan::{Discovery, ExecutionReport, GalleyLabel, RemoteState, UploadPlan};
use oja_config::LoadedOjaConfig;
use oja_config::loader::LoadEvent;

use crate::input::Target;

/// A labelled branch with its leaves.
pub struct Branch {
    pub label: String,
    pub leaves: Vec<String>,
}

/// Draws `root` with two levels of box-drawing connectors.
pub fn tree(root: &str, branches: &[Branch]) -> Vec<String> {
    let mut lines = vec![format!("└── {root}")];
    for (i, branch) in branches.iter().enumerate() {
        let last = i + 1 == branches.len();
        let (connector, indent) = if last {
            ("└──", "        ")
        } else {
            ("├──", "    │   ")
        };
        lines.push(format!("    {connector} {}", branch.label));
        for (j, leaf) in branch.leaves.iter().enumerate() {
            let leaf_connector = if j + 1 == branch.leaves.len() {
                "└──"
            } else {
                "├──"
            };
            lines.push(format!("{indent}{leaf_connector} {leaf}"));
        }
    }
    lines
}

fn print_tree(root: &str, branches: &[Branch]) {
    for line in tree(root, branches) {
        println!("{line}");
    }
}

fn heading(title: &str) {
    println!("\n{}", title.cyan().underline());
}

pub fn config_notices(loaded: &LoadedOjaConfig) {
    for event in &loaded.events {
        match event {
            LoadEvent::MigratedDotEnv { from, to } => println!(
                "{} Migrated settings from {} to {}",
                "INFO".blue(),
                from.display(),
                to.display()
            ),
        }
    }
    for warning in &loaded.warnings {
        println!("{} {warning}", "WARN".yellow());
    }
}

pub fn target(target: &Target) {
    if let Some(folder) = &target.folder {
        println!("{} Using folder: {}", "OK".green(), folder.display());
        println!(
            "{} Extracted submission ID: {}",
            "OK".green(),
            target.submission_id
        );
    }
}

pub fn discovery(discovery: &Discovery, submission_id: u64) {
    if let Some(archive) = &discovery.archive {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}", format!("Found submission zip: {name}").blue());
        println!(
            "{}",
            format!("Extracted {} files from zip", discovery.extracted).green()
        );
    }

    let branches: Vec<Branch> = GalleyLabel::ALL
        .into_iter()
        .filter_map(|galley| {
            let leaves: Vec<String> = discovery
                .files
                .iter()
                .filter(|f| f.role.galley() == galley)
                .map(|f| {
                    if f.role.is_dependent() {
                        format!("{} {}", f.name, "(dep.)".dimmed())
                    } else {
                        f.name.clone()
                    }
                })
                .collect();
            (!leaves.is_empty()).then(|| Branch {
                label: galley.to_string().green().to_string(),
                leaves,
            })
        })
        .collect();

    if branches.is_empty() {
        println!("{}", "No production files found".yellow());
    } else {
        print_tree(&format!("Submission {submission_id}"), &branches);
    }

    for warning in &discovery.warnings {
        println!("{} {warning}", "WARN".yellow());
    }
}

pub fn existing_galleys(state: &RemoteState) {
    println!("{}", format!("Existing galleys: {}", state.galleys.len()).cyan());
    for galley in &state.galleys {
        println!("{}", format!("  - {} (ID: {})", galley.label, galley.id).green());
    }
}

/// Tree of what is online; returns whether any file exists.
pub fn online_files(title: &str, state: &RemoteState, debug: bool) -> bool {
    heading(title);
    if state.galleys.is_empty() {
        println!("{}", "No files currently online".yellow());
        return false;
    }

    let branches: Vec<Branch> = state
        .galleys
        .iter()
        .map(|galley| {
            let label = if galley.files.is_empty() {
                format!("{} (empty)", format!("{} Galley", galley.label).yellow())
            } else {
                format!(
                    "{} {}",
                    format!("{} Galley", galley.label).green(),
                    format!("({} files)", galley.files.len()).cyan()
                )
            };
            let mut leaves = Vec::new();
            if debug {
                leaves.push(format!("Galley ID: {}", galley.id).dimmed().to_string());
            }
            leaves.extend(galley.files.iter().map(|f| {
                let kind = if f.is_main { "(main)" } else { "(dep.)" };
                if debug {
                    format!("{} {} {}", f.name, kind, format!("ID: {}", f.id).dimmed())
                } else {
                    format!("{} {kind}", f.name)
                }
            }));
            Branch { label, leaves }
        })
        .collect();

    print_tree(
        &format!("Submission {} (Online)", state.submission_id),
        &branches,
    );

    let total: usize = state.galleys.iter().map(|g| g.files.len()).sum();
    println!(
        "\n{}",
        format!(
            "Total: {} galleys with {total} files online",
            state.galleys.len()
        )
        .cyan()
    );
    total > 0
}

pub fn conflicts(report: &ConflictReport) {
    if report.has_conflicts() {
        println!("\n{}", "CONFLICTS DETECTED:".red());
        for (galley, entry) in &report.conflicts {
            println!("\n{}", format!("  {galley} Galley:").cyan());
            if let Some(main) = &entry.main {
                println!("    {} would conflict with:", main.local.name.red());
                for existing in &entry.existing_files {
                    println!("      - {}", existing.name);
                }
            }
            for (title, collisions) in [
                ("Conflicting CSS files:", &entry.conflicting_css),
                ("Conflicting figures:", &entry.conflicting_figures),
                ("Conflicting files:", &entry.conflicting_files),
            ] {
                if collisions.is_empty() {
                    continue;
                }
                println!("    {}", title.red());
                for collision in collisions {
                    let matched: Vec<&str> =
                        collision.remote.iter().map(|r| r.name.as_str()).collect();
                    println!(
                        "      - {} {}",
                        collision.local.name,
                        format!("(matches {})", matched.join(", ")).dimmed()
                    );
                }
            }
        }
    }

    if !report.has_uploadable() && report.new_files.is_empty() {
        return;
    }

    println!("\n{}", "NON-CONFLICTING CONTENT:".green());
    for galley in GalleyLabel::ALL {
        let new: Vec<_> = report
            .new_files
            .iter()
            .filter(|f| f.galley == galley)
            .collect();
        let addable = report.can_add_to_existing.get(&galley);
        if new.is_empty() && addable.is_none_or(Vec::is_empty) {
            continue;
        }

        println!("\n{}", format!("  {galley} Galley:").cyan());
        for file in new {
            let status = match file.status {
                NewFileStatus::NewGalley => "(new galley)",
                NewFileStatus::Additional => "(additional)",
                NewFileStatus::Orphaned => {
                    println!(
                        "    {} {} - no HTML file to attach to",
                        "SKIP:".yellow(),
                        file.file.name
                    );
                    continue;
                }
            };
            println!(
                "    {} - {} {status}",
                format!("OK: {}", file.file.name).green(),
                file.file.role.description()
            );
        }
        if let Some(files) = addable.filter(|v| !v.is_empty()) {
            println!(
                "    {}",
                format!("OK: {} dependent files for the existing galley", files.len()).green()
            );
            for file in files {
                println!("      - {}", file.name);
            }
        }
    }
}

pub fn options(options: &[PlanChoice], report: &ConflictReport) {
    println!("\n{}", "Options:".purple());
    for choice in options {
        println!("  {}", option_line(*choice, report));
    }
}

pub fn option_line(choice: PlanChoice, report: &ConflictReport) -> String {
    match choice {
        PlanChoice::Selective => format!(
            "{} - Upload only NON-conflicting files ({} files)",
            "n".green(),
            report.uploadable_count()
        ),
        PlanChoice::Overwrite => format!(
            "{} - Overwrite conflicting files with new versions",
            "o".blue()
        ),
        PlanChoice::Cancel => format!("{} - Cancel operation", "c".red()),
    }
}

pub fn plan(plan: &UploadPlan) {
    heading(&format!("Upload Plan ({:?})", plan.mode));

    if !plan.deletions.is_empty() {
        println!("{}", "Files to delete:".red());
        for deletion in &plan.deletions {
            let kind = if deletion.is_main { "main" } else { "dep." };
            println!(
                "  - {} {}",
                deletion.filename,
                format!("({} Galley, {kind})", deletion.galley).dimmed()
            );
        }
    }

    if !plan.galleys_to_create.is_empty() {
        println!("{}", "Galleys to create:".cyan());
        for galley in &plan.galleys_to_create {
            println!("  + {galley}");
        }
    }

    let branches: Vec<Branch> = GalleyLabel::ALL
        .into_iter()
        .filter_map(|galley| {
            let leaves: Vec<String> = plan
                .uploads_for(galley)
                .map(|u| {
                    let kind = if u.is_dependent { "dep." } else { "main" };
                    format!(
                        "{} {}",
                        u.file.name,
                        format!("({kind}, genre {})", u.genre.name()).dimmed()
                    )
                })
                .collect();
            (!leaves.is_empty()).then(|| Branch {
                label: format!("{galley} Galley").green().to_string(),
                leaves,
            })
        })
        .collect();
    if !branches.is_empty() {
        println!("{}", "Files to upload:".green());
        print_tree(&format!("{} files", plan.uploads.len()), &branches);
    }

    for skipped in &plan.skipped {
        let reason = match skipped.reason {
            SkipReason::NoHtml => "no HTML file locally or online",
            SkipReason::NoMainFile => "no main file to attach to",
        };
        println!("{} {} ({reason})", "SKIP".yellow(), skipped.file.name);
    }
}

pub fn execution(report: &ExecutionReport) {
    if report.dry_run {
        heading("Dry Run (nothing was changed)");
    } else {
        heading("Results");
    }

    for (deletion, status) in &report.deletions {
        let name = &deletion.filename;
        match status {
            DeletionStatus::Planned => println!("  {} {name}", "would delete".yellow()),
            DeletionStatus::Deleted { file_id } => {
                println!("  {} {name} (ID: {file_id})", "deleted".green());
            }
            DeletionStatus::AutoResolved => println!(
                "  {} {name} (removed with its main file)",
                "auto-resolved".green()
            ),
            DeletionStatus::Missing => println!("  {} {name} (not found online)", "skipped".yellow()),
            DeletionStatus::Failed(e) => println!("  {} {name}: {e}", "delete failed".red()),
        }
    }

    for (galley, status) in &report.galleys {
        match status {
            GalleyStatus::Planned => println!("  {} {galley} galley", "would create".yellow()),
            GalleyStatus::Created => println!("  {} {galley} galley", "created".green()),
            GalleyStatus::Failed(e) => println!("  {} {galley} galley: {e}", "create failed".red()),
        }
    }

    for (upload, status) in &report.uploads {
        let name = &upload.file.name;
        match status {
            UploadStatus::Planned => println!("  {} {name}", "would upload".yellow()),
            UploadStatus::Uploaded { file_id, parent_id } => match parent_id {
                Some(parent) => println!(
                    "  {} {name} (ID: {file_id}, linked to {parent})",
                    "uploaded".green()
                ),
                None => println!("  {} {name} (ID: {file_id})", "uploaded".green()),
            },
            UploadStatus::Failed(e) => println!("  {} {name}: {e}", "upload failed".red()),
        }
    }

    match &report.pages {
        PagesOutcome::NotApplicable => {}
        PagesOutcome::Preview(pages) => println!("  {} pages to {pages}", "would set".yellow()),
        PagesOutcome::Updated(pages) => println!("  {} pages to {pages}", "set".green()),
        PagesOutcome::NotFound => println!(
            "  {} no page range found in the online PDF",
            "WARN".yellow()
        ),
        PagesOutcome::Failed(e) => println!("  {} page range not updated: {e}", "WARN".yellow()),
    }

    for warning in &report.warnings {
        println!("  {} {warning}", "WARN".yellow());
    }

    if report.dry_run {
        println!(
            "\n{}",
            format!("{} uploads planned", report.uploads.len()).cyan()
        );
        return;
    }

    let mut summary = format!(
        "Uploaded {} of {} files",
        report.uploaded_count(),
        report.uploads.len()
    );
    if report.deleted_count() > 0 || report.auto_resolved_count() > 0 {
        summary.push_str(&format!(
            ", deleted {} ({} auto-resolved)",
            report.deleted_count(),
            report.auto_resolved_count()
        ));
    }
    if report.failed_count() > 0 {
        println!("\n{} ({} failed)", summary.yellow(), report.failed_count());
    } else {
        println!("\n{}", summary.green());
    }
}
