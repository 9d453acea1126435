mod cli;

use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use audioslice_core::{plan, run_with_progress, Config, ProgressEvent, Selection, Stage};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::cli::build_cli;

fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Validating => "Validating parameters",
        Stage::Decoding => "Decoding audio",
        Stage::Segmenting => "Computing segments",
        Stage::Encoding => "Encoding segments",
        Stage::Archiving => "Writing archive",
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    if !input_path.is_file() {
        return Err(anyhow!(
            "input file does not exist: {}",
            input_path.display()
        ));
    }

    let selection = Selection {
        start: matches.get_one::<f64>("start").copied(),
        end: matches.get_one::<f64>("end").copied(),
        count: matches.get_one::<u32>("count").copied(),
    };
    let output_path = matches
        .get_one::<PathBuf>("output")
        .expect("defaulted argument");
    let threads = matches.get_one::<NonZeroUsize>("threads").copied();
    let dry_run = matches.get_flag("dry-run");

    let file_name = input_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("cannot derive a name from '{}'", input_path.display()))?;
    let base_name = file_name.split('.').next().unwrap_or(file_name);

    let mut builder = Config::builder(base_name, selection);
    if let Some(extension) = input_path.extension().and_then(|ext| ext.to_str()) {
        builder = builder.format_hint(extension);
    }
    if let Some(threads) = threads {
        builder = builder.threads(threads);
    }
    let config = builder
        .build()
        .with_context(|| format!("invalid parameters for '{}'", input_path.display()))?;

    let input = fs::read(input_path)
        .with_context(|| format!("failed to read '{}'", input_path.display()))?;

    if dry_run {
        let entries = plan(&input, &config)
            .with_context(|| format!("failed to plan segments for '{}'", input_path.display()))?;

        println!("Dry run: would archive {} segment(s):", entries.len());
        for name in entries {
            println!("  {name}");
        }
        return Ok(());
    }

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);

    let progress_handle = progress.clone();
    let result = run_with_progress(&input, &config, move |event| match event {
        ProgressEvent::StageChanged(stage) => {
            progress_handle.set_message(stage_message(stage));
        }
        ProgressEvent::SegmentEncoded { completed, total } => {
            progress_handle.set_length(total as u64);
            progress_handle.set_position(completed as u64);
        }
        ProgressEvent::Finished => {
            progress_handle.set_message("Completed");
        }
    })
    .with_context(|| format!("failed to split '{}'", input_path.display()));

    progress.finish_and_clear();

    let archive = result?;

    fs::write(output_path, &archive)
        .with_context(|| format!("failed to write '{}'", output_path.display()))?;
    println!("Wrote {} ({} bytes)", output_path.display(), archive.len());

    Ok(())
}
