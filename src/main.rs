use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mmdiff::blocks::{self, BlockSelector};
use mmdiff::differ::{self, RenderOptions};
use mmdiff::{Config, GitHistory, graph_parser, html};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "mmdiff",
    version,
    about = "Merge two versions of a Mermaid flowchart into one diagram highlighting what changed"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Diff two files (or "-" for stdin)
    Diff {
        old: String,
        new: String,

        /// Treat inputs as bare diagram text instead of Markdown documents
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Diff a file against a committed git revision
    Head {
        file: PathBuf,

        /// Revision to compare against
        #[arg(long, default_value = "HEAD")]
        rev: String,

        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the mermaid blocks of a document
    Blocks {
        /// Input file or "-" for stdin
        #[arg(default_value = "-")]
        file: String,
    },
}

#[derive(Args)]
struct SelectArgs {
    /// Zero-based index of the mermaid block to compare
    #[arg(long, conflicts_with = "line")]
    block: Option<usize>,

    /// Compare the mermaid block enclosing this 1-based line
    #[arg(long)]
    line: Option<usize>,
}

impl SelectArgs {
    fn selector(&self) -> BlockSelector {
        match (self.block, self.line) {
            (Some(index), _) => BlockSelector::Index(index),
            (None, Some(line)) => BlockSelector::Line(line),
            (None, None) => BlockSelector::First,
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    #[arg(short, long, value_enum, default_value = "mermaid")]
    format: OutputFormat,

    /// Output file. If omitted, writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with `[colors]` and `keep_directives`
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    added_fill: Option<String>,

    #[arg(long)]
    added_stroke: Option<String>,

    #[arg(long)]
    removed_fill: Option<String>,

    #[arg(long)]
    removed_stroke: Option<String>,

    /// Keep classDef/class/style lines of the new diagram
    #[arg(long)]
    keep_directives: bool,

    /// Print added/removed/unchanged counts to stderr
    #[arg(long)]
    stat: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    /// Merged Mermaid source
    Mermaid,
    /// Standalone HTML page rendering the merged diagram
    Html,
}

impl OutputArgs {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        let colors = &mut config.colors;
        override_with(&mut colors.added_fill, &self.added_fill);
        override_with(&mut colors.added_stroke, &self.added_stroke);
        override_with(&mut colors.removed_fill, &self.removed_fill);
        override_with(&mut colors.removed_stroke, &self.removed_stroke);
        config.keep_directives |= self.keep_directives;
        config.validate()?;
        Ok(config)
    }
}

fn override_with(slot: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        slot.clone_from(value);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Diff {
            old,
            new,
            raw,
            select,
            output,
        } => cmd_diff(&old, &new, raw, select.selector(), &output),
        Command::Head {
            file,
            rev,
            select,
            output,
        } => cmd_head(&file, &rev, select.selector(), &output),
        Command::Blocks { file } => cmd_blocks(&file),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn cmd_diff(
    old: &str,
    new: &str,
    raw: bool,
    selector: BlockSelector,
    args: &OutputArgs,
) -> Result<()> {
    if old == "-" && new == "-" {
        bail!("only one of OLD and NEW can be read from stdin");
    }
    let config = args.load_config()?;
    let old_text = load_input(old)?;
    let new_text = load_input(new)?;

    let (old_graph, new_graph) = if raw {
        (old_text, new_text)
    } else {
        blocks::select_pair(&old_text, &new_text, selector)?
    };
    emit(&old_graph, &new_graph, &config, args)
}

fn cmd_head(file: &Path, rev: &str, selector: BlockSelector, args: &OutputArgs) -> Result<()> {
    let config = args.load_config()?;
    let (old_graph, new_graph) = mmdiff::history_pair(&GitHistory::new(rev), file, selector)?;
    info!(file = %file.display(), rev, "loaded committed revision");
    emit(&old_graph, &new_graph, &config, args)
}

fn cmd_blocks(file: &str) -> Result<()> {
    let document = load_input(file)?;
    let mut out = String::new();
    for block in blocks::extract_blocks(&document) {
        let first = block.source.lines().next().unwrap_or("").trim();
        out.push_str(&format!(
            "{}\tlines {}-{}\t{first}\n",
            block.index, block.start_line, block.end_line
        ));
    }
    write_output(None, &out)
}

fn emit(old: &str, new: &str, config: &Config, args: &OutputArgs) -> Result<()> {
    let old = graph_parser::parse_graph(old);
    let new = graph_parser::parse_graph(new);
    let diff = differ::diff_parsed(&old, &new);
    if args.stat {
        eprintln!("{}", diff.summary());
    }

    let options = RenderOptions {
        keep_directives: config.keep_directives,
    };
    let diagram = diff.render(&config.colors, &options);
    let content = match args.format {
        OutputFormat::Mermaid => format!("{diagram}\n"),
        OutputFormat::Html => html::render_page(&diagram),
    };
    write_output(args.output.as_deref(), &content)
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read file: {input}"))
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to: {}", path.display()))?;
            info!("Wrote output to: {}", path.display());
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
