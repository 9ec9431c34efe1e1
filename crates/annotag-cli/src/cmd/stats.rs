//! `ann stats` / `ann segments` — annotation analytics.

use std::path::Path;

use annotag_core::LabelId;
use annotag_core::{analytics, config};
use clap::Args;

use crate::cmd::{domain_failure, require_owner, require_store};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct StatsArgs {}

#[derive(Args, Debug)]
pub struct SegmentsArgs {
    /// Label id to measure density for.
    pub label: LabelId,

    /// How many segments to report; defaults to the workspace config value.
    #[arg(short, long)]
    pub top: Option<usize>,
}

pub fn run_stats(
    _args: &StatsArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    let summary = analytics::label_summary(&conn, &owner)?;
    render(output, &summary, |summary, out| {
        writeln!(
            out,
            "{} annotations across {} labels",
            summary.total_annotations, summary.total_labels
        )?;
        for stats in &summary.labels {
            writeln!(
                out,
                "{:>6}  {:<24} {:>5}  total {:>7}  avg {:>8.2}",
                stats.id, stats.name, stats.count, stats.total_length, stats.average_length
            )?;
        }
        Ok(())
    })
}

pub fn run_segments(
    args: &SegmentsArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    let analytics_config = config::load_workspace_config(workspace_root)
        .map(|workspace| workspace.analytics)
        .unwrap_or_default();
    let top_n = args.top.unwrap_or(analytics_config.top_segments);

    match analytics::top_segments(
        &conn,
        &owner,
        args.label,
        top_n,
        analytics_config.segment_size,
    ) {
        Ok(segments) => render(output, &segments, |segments, out| {
            for segment in segments {
                let preview: String = segment.text.chars().take(60).collect();
                writeln!(
                    out,
                    "doc {} seg {:>4} [{}..{}]  {} annotations  {:?}",
                    segment.document_id,
                    segment.segment_index,
                    segment.start_char,
                    segment.end_char,
                    segment.annotation_count,
                    preview
                )?;
            }
            Ok(())
        }),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}
