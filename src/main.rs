use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hunkwise::config::{self, AppConfig};
use hunkwise::diff::{
    DiffViewMode, ExpandDirection, FetchedLines, VirtualRow, VirtualRowModel, augment_hunks,
    build_diff_elements, build_virtual_row_model, expand_gap_range, resolve_selection_to_region,
    validate_hunks,
};
use hunkwise::model::{DiffElement, DiffFile, DiffHunk, DiffLine, LineIdentity, LineType};
use hunkwise::vcs::{self, ContextRequest, ContextSource};

const SPLIT_COLUMN_WIDTH: usize = 48;

#[derive(Parser, Debug)]
#[command(name = "hunkwise")]
#[command(version, about = "Print the review rows of a git unified diff")]
struct Args {
    /// Patch in git unified diff format; read from stdin when omitted
    patch: Option<PathBuf>,

    /// Side-by-side rows instead of the configured view mode
    #[arg(long)]
    split: bool,

    /// Reveal hidden context around each hunk
    #[arg(long, value_enum, requires = "context_root")]
    expand: Option<CliExpand>,

    /// Repository or directory to read hidden context from
    #[arg(long, value_name = "DIR")]
    context_root: Option<PathBuf>,

    /// Revision to read hidden context at; the working tree when omitted
    #[arg(long, value_name = "REV")]
    rev: Option<String>,

    /// Resolve the reviewable region between two lines, e.g. `--select L4 R9`
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    select: Vec<LineIdentity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliExpand {
    Up,
    Down,
    All,
}

impl From<CliExpand> for ExpandDirection {
    fn from(value: CliExpand) -> Self {
        match value {
            CliExpand::Up => ExpandDirection::Up,
            CliExpand::Down => ExpandDirection::Down,
            CliExpand::All => ExpandDirection::All,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match config::load_config() {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                eprintln!("{warning}");
            }
            outcome.config.unwrap_or_default()
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {e:#}");
            eprintln!("Expected location: {}", config::config_path_hint());
            AppConfig::default()
        }
    };
    let mode = if args.split {
        DiffViewMode::SideBySide
    } else {
        config.view_mode()
    };

    let diff_text = read_patch(args.patch.as_ref())?;
    let files = vcs::parse_unified_diff(&diff_text).context("Failed to parse patch")?;

    let source = args
        .context_root
        .as_deref()
        .map(vcs::detect_context_source)
        .transpose()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for file in &files {
        let hunks = match (&source, args.expand) {
            (Some(source), Some(direction)) => expand_file(
                file,
                &**source,
                args.rev.as_deref(),
                direction.into(),
                config.expand_step(),
            )?,
            _ => file.hunks.clone(),
        };
        print_file(&mut out, file, &hunks, mode, &args.select)?;
    }

    Ok(())
}

fn read_patch(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read patch from stdin")?;
            Ok(text)
        }
    }
}

/// Fetch the hidden lines of every gap in `direction` and merge them in
fn expand_file(
    file: &DiffFile,
    source: &dyn ContextSource,
    rev: Option<&str>,
    direction: ExpandDirection,
    step: u32,
) -> Result<Vec<DiffHunk>> {
    let Some(path) = file.display_path() else {
        return Ok(file.hunks.clone());
    };
    let total = file.known_new_line_count();

    let mut fetched = FetchedLines::new();
    for element in build_diff_elements(&file.hunks, total) {
        let DiffElement::Gap(gap) = element else {
            continue;
        };
        let Some(expansion) = expand_gap_range(&gap, direction, step) else {
            continue;
        };
        let request = ContextRequest::for_gap(path, rev.map(str::to_string), expansion);
        let lines = source
            .fetch_context_lines(&request)
            .with_context(|| format!("Failed to fetch context for {}", path.display()))?;
        fetched.extend(lines);
    }

    Ok(augment_hunks(&file.hunks, &fetched, total))
}

fn print_file(
    out: &mut impl Write,
    file: &DiffFile,
    hunks: &[DiffHunk],
    mode: DiffViewMode,
    select: &[LineIdentity],
) -> Result<()> {
    let path = file
        .display_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unknown)".to_string());
    writeln!(out, "{} {path}", file.status.as_char())?;

    if file.is_binary {
        writeln!(out, "      (binary file)")?;
        return Ok(());
    }
    if let Err(e) = validate_hunks(hunks) {
        eprintln!("Warning: skipping {path}: {e}");
        return Ok(());
    }

    let elements = build_diff_elements(hunks, file.known_new_line_count());
    let model = build_virtual_row_model(&elements, mode, None);
    print_rows(out, &model)?;

    if let [from, to] = select
        && let Some(region) = resolve_selection_to_region(*from, *to, &elements, mode)
    {
        writeln!(out, "      region {from}..{to}: {region}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_rows(out: &mut impl Write, model: &VirtualRowModel<'_>) -> io::Result<()> {
    for row in &model.rows {
        match row {
            VirtualRow::Gap { gap, is_last } => {
                let end = if *is_last { " (end of file)" } else { "" };
                writeln!(
                    out,
                    "      ... {} hidden lines {}-{}{end}",
                    gap.count, gap.new_start, gap.new_end
                )?;
            }
            VirtualRow::UnifiedLine {
                line, nav_index, ..
            } => {
                writeln!(
                    out,
                    "{nav_index:>4} {:>5} {:>5} {}{}",
                    lineno(line.old_lineno),
                    lineno(line.new_lineno),
                    sign(line),
                    line.text()
                )?;
            }
            VirtualRow::SplitLine {
                pair, nav_index, ..
            } => {
                let left = pair.left.map(|l| cell(l, l.old_lineno)).unwrap_or_default();
                let right = pair.right.map(|r| cell(r, r.new_lineno)).unwrap_or_default();
                writeln!(
                    out,
                    "{nav_index:>4} {left:<width$} | {right}",
                    width = SPLIT_COLUMN_WIDTH
                )?;
            }
            VirtualRow::CommentForm { target } => {
                writeln!(out, "      [comment on {target}]")?;
            }
        }
    }
    Ok(())
}

fn lineno(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn sign(line: &DiffLine) -> char {
    match line.line_type {
        LineType::Context => ' ',
        LineType::Addition => '+',
        LineType::Deletion => '-',
        LineType::AddEofNewline | LineType::DelEofNewline => '\\',
    }
}

fn cell(line: &DiffLine, number: Option<u32>) -> String {
    let text: String = line.text().chars().take(SPLIT_COLUMN_WIDTH - 8).collect();
    format!("{:>5} {}{text}", lineno(number), sign(line))
}
