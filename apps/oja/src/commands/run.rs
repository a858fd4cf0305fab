//! The upload run: resolve the submission, compare, plan, execute.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use galley_plan::pages::LopdfText;
use galley_plan::plan::{
    PlanChoice, auto_choose, fresh_plan, overwrite_plan, plan_options, selective_plan,
};
use galley_plan::poll::PollPolicy;
use galley_plan::{ConflictReport, Executor, OjsPlatform, Platform, Timing, analyze, discover};
use oja_config::{OjaConfig, validation::require_credentials};
use ojs_async::{Client, OjsConfig};

use crate::{input, prompt, render};

pub struct RunArgs {
    pub input: String,
    pub settings: bool,
    pub dry_run: bool,
    pub debug: bool,
    pub skip: bool,
}

pub async fn execute(args: &RunArgs, mut config: OjaConfig) -> Result<()> {
    let target = input::parse_input(&args.input)?;
    render::target(&target);
    let submission_id = target.submission_id;

    if args.settings || (!config.is_complete() && !args.skip) {
        config = super::settings::execute(config).await?;
    }
    require_credentials(&config)?;

    let platform = connect(&config).await?;

    let (folder, selected) = match target.folder {
        Some(folder) => (folder, false),
        None => find_folder(submission_id, args.skip).await?,
    };
    if selected {
        println!("\n{}", "Proceeding with selected folder".green());
    } else if args.skip {
        println!("\n{}", "Proceeding with folder (--skip enabled)".green());
    } else if !prompt::confirm("Continue with this folder?", true).await? {
        bail!("Operation cancelled");
    }

    println!("\n{}", format!("/{}/", folder.display()).cyan());
    // Owns the scratch directory of extracted archive members until the run ends.
    let discovery = discover(&folder, submission_id)?;
    render::discovery(&discovery, submission_id);

    let snapshot = platform
        .remote_state(submission_id)
        .await
        .with_context(|| format!("Failed to read submission {submission_id}"))?
        .with_context(|| format!("Could not access submission {submission_id}"))?;
    render::existing_galleys(&snapshot);
    let has_content = render::online_files("Current Online Files", &snapshot, args.debug);

    let plan = if has_content {
        println!("\n{}", "Analyzing potential conflicts...".cyan());
        let report = analyze(&discovery.files, &snapshot);
        render::conflicts(&report);

        let options = plan_options(&report);
        if options.is_empty() {
            bail!("No new files to upload");
        }
        render::options(&options, &report);

        let choice = if args.skip {
            let choice = auto_choose(&options).context("No option can be chosen automatically")?;
            println!(
                "{}",
                format!("Auto-selected '{}' (--skip enabled)", choice.key()).green()
            );
            choice
        } else {
            choose(&options, &report).await?
        };

        match choice {
            PlanChoice::Selective => selective_plan(&report, &snapshot),
            PlanChoice::Overwrite => overwrite_plan(&discovery.files, &report, &snapshot),
            PlanChoice::Cancel => bail!("Operation cancelled"),
        }
    } else {
        fresh_plan(&discovery.files, &snapshot)
    };

    if plan.uploads.is_empty() {
        render::plan(&plan);
        bail!("Nothing to do: no files to upload");
    }
    render::plan(&plan);

    if !args.skip && !args.dry_run && !prompt::confirm("Proceed with upload?", true).await? {
        bail!("Operation cancelled");
    }

    let timing = Timing {
        settle_delay: config.execution.settle_delay(),
        verify: PollPolicy::new(
            config.execution.verify_attempts,
            config.execution.verify_delay(),
        ),
    };
    let pdf = LopdfText;
    let report = Executor::new(&platform, &pdf)
        .with_timing(timing)
        .dry_run(args.dry_run)
        .run(&plan, &snapshot)
        .await?;
    render::execution(&report);

    if !report.succeeded() {
        bail!("No files were uploaded");
    }
    if !report.dry_run {
        final_status(&platform, submission_id, args.debug).await;
    }
    drop(discovery);
    Ok(())
}

async fn connect(config: &OjaConfig) -> Result<OjsPlatform> {
    println!("{}", "Testing connections...".cyan());

    let ojs = &config.ojs;
    let token = ojs.api_token.clone().context("API token is not set")?;
    let password = ojs.password.clone().context("Password is not set")?;
    let client = Client::with_config(
        OjsConfig::new(ojs.base_url.trim())
            .with_api_token_secret(token)
            .with_credentials(ojs.username.trim(), password),
    )?;

    client.submissions().ping().await.context(
        "REST API connection failed. Try running with --settings to update your API key",
    )?;
    let session = client.login().await.context(
        "Web login failed. Try running with --settings to update your credentials",
    )?;

    println!("{} All connections successful", "OK".green());
    Ok(OjsPlatform::new(client, session, ojs.locale.clone()))
}

/// Folder for `submission_id` in the working directory; the flag is set when
/// the operator picked it from a list.
async fn find_folder(submission_id: u64, skip: bool) -> Result<(PathBuf, bool)> {
    let found = input::matching_folders(Path::new("."), submission_id)?;
    match found.as_slice() {
        [] => bail!("No folder found containing submission ID {submission_id}"),
        [only] => {
            println!("{} Found folder: {}", "OK".green(), only.display());
            Ok((only.clone(), false))
        }
        many if skip => {
            let listed: Vec<String> = many
                .iter()
                .enumerate()
                .map(|(i, p)| format!("  {}. {}", i + 1, p.display()))
                .collect();
            bail!(
                "Multiple folders found containing '{submission_id}' and --skip is enabled:\n{}\n\
                 Please specify the exact folder path.",
                listed.join("\n")
            )
        }
        many => {
            println!(
                "{}",
                format!("Multiple folders found containing '{submission_id}':").yellow()
            );
            let items = many.iter().map(|p| p.display().to_string()).collect();
            let idx = prompt::select("Select folder", items).await?;
            let folder = many
                .get(idx)
                .cloned()
                .context("Selection out of range")?;
            println!("{} Selected folder: {}", "OK".green(), folder.display());
            Ok((folder, true))
        }
    }
}

async fn choose(
    options: &[PlanChoice],
    report: &ConflictReport,
) -> Result<PlanChoice> {
    let items = options
        .iter()
        .map(|c| render::option_line(*c, report))
        .collect();
    let idx = prompt::select("Choose an option", items).await?;
    options.get(idx).copied().context("Selection out of range")
}

async fn final_status(platform: &OjsPlatform, submission_id: u64, debug: bool) {
    match platform.remote_state(submission_id).await {
        Ok(Some(state)) => {
            render::online_files("Final Status", &state, debug);
        }
        Ok(None) => println!("{}", "Could not retrieve final status".red()),
        Err(e) => {
            tracing::debug!(error = %e, "final status fetch failed");
            println!("{}", "Could not retrieve final status".red());
        }
    }
}

