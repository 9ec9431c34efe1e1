#![forbid(unsafe_code)]

mod cmd;
mod output;
mod owner;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "annotag: label hierarchies and document annotation",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Override owner identity (skips env resolution).
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Get the user flag as an Option<&str> for resolution.
    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Initialize an annotag workspace",
        long_about = "Initialize an annotag workspace in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a workspace in the current directory\n    ann init\n\n    # Record a default owner identity in the workspace config\n    ann init --user ada"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Labels",
        subcommand,
        about = "Create, list, update, and delete labels",
        after_help = "EXAMPLES:\n    # Create a label with a color\n    ann label create method --color '#aa3311'\n\n    # List all labels\n    ann label ls\n\n    # Delete a label (children move up to their grandparent)\n    ann label rm 7"
    )]
    Label(cmd::label::LabelCommand),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Link a child label under a parent",
        long_about = "Link a child label under a parent. Fails if the child already has a parent or the link would create a cycle.",
        after_help = "EXAMPLES:\n    # Make label 7 a child of label 3\n    ann link 3 7\n\n    # Store the edge in child-to-parent orientation\n    ann link 3 7 --kind child_to_parent"
    )]
    Link(cmd::link::LinkArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Remove the link between a parent and a child",
        after_help = "EXAMPLES:\n    # Detach label 7 from label 3\n    ann unlink 3 7"
    )]
    Unlink(cmd::link::UnlinkArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Show a label's direct parent",
        after_help = "EXAMPLES:\n    # Print the parent id of label 7, or (root)\n    ann parent 7"
    )]
    Parent(cmd::link::ParentArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Show a label's direct children",
        after_help = "EXAMPLES:\n    # Print the child ids of label 3, one per line\n    ann children 3"
    )]
    Children(cmd::link::ChildrenArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Render a label tree",
        long_about = "Render the subtree under one label, or the whole forest when no label is given.",
        after_help = "EXAMPLES:\n    # Render every root tree\n    ann tree\n\n    # Render the subtree under label 3\n    ann tree 3\n\n    # Emit the tree as JSON\n    ann tree 3 --json"
    )]
    Tree(cmd::tree::TreeArgs),

    #[command(
        next_help_heading = "Hierarchy",
        about = "Show the breadcrumb path from the root to a label",
        after_help = "EXAMPLES:\n    # Print e.g. 'method (3) > qualitative (5) > interview (7)'\n    ann path 7"
    )]
    Path(cmd::link::PathArgs),

    #[command(
        next_help_heading = "Documents",
        subcommand,
        about = "Add and list documents",
        after_help = "EXAMPLES:\n    # Add a document from a file\n    ann doc add \"Field notes\" --file notes.txt\n\n    # Add a document from stdin\n    ann doc add \"Field notes\" < notes.txt\n\n    # List documents\n    ann doc ls"
    )]
    Doc(cmd::doc::DocCommand),

    #[command(
        next_help_heading = "Annotations",
        about = "Tag a character span of a document with a label",
        after_help = "EXAMPLES:\n    # Tag characters 10..25 of document 1 with label 4\n    ann annotate --doc 1 --label 4 10 25"
    )]
    Annotate(cmd::annotate::AnnotateArgs),

    #[command(
        next_help_heading = "Annotations",
        about = "List a document's annotations",
        after_help = "EXAMPLES:\n    # List annotations on document 1, ordered by span start\n    ann annotations 1"
    )]
    Annotations(cmd::annotate::AnnotationsArgs),

    #[command(
        next_help_heading = "Annotations",
        name = "annotation",
        subcommand,
        about = "Manage single annotations",
        after_help = "EXAMPLES:\n    # Delete annotation 12\n    ann annotation rm 12"
    )]
    Annotation(AnnotationCommand),

    #[command(
        next_help_heading = "Analytics",
        about = "Per-label annotation counts and lengths",
        after_help = "EXAMPLES:\n    # Show label usage, most-used first\n    ann stats\n\n    # Emit machine-readable output\n    ann stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Analytics",
        about = "Densest document segments for one label",
        after_help = "EXAMPLES:\n    # Top segments for label 4\n    ann segments 4\n\n    # Limit to the top 3\n    ann segments 4 --top 3"
    )]
    Segments(cmd::stats::SegmentsArgs),
}

#[derive(Subcommand, Debug)]
enum AnnotationCommand {
    /// Delete one annotation by id.
    Rm(cmd::annotate::RmAnnotationArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ANNOTAG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "annotag=debug,info"
        } else {
            "annotag=info,warn"
        })
    });

    let format = env::var("ANNOTAG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let workspace_root = std::env::current_dir()?;
    let output = cli.output_mode();
    let user = cli.user_flag();

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &workspace_root),
        Commands::Label(command) => cmd::label::run_label(command, user, output, &workspace_root),
        Commands::Link(args) => cmd::link::run_link(args, user, output, &workspace_root),
        Commands::Unlink(args) => cmd::link::run_unlink(args, user, output, &workspace_root),
        Commands::Parent(args) => cmd::link::run_parent(args, user, output, &workspace_root),
        Commands::Children(args) => cmd::link::run_children(args, user, output, &workspace_root),
        Commands::Tree(args) => cmd::tree::run_tree(args, user, output, &workspace_root),
        Commands::Path(args) => cmd::link::run_path(args, user, output, &workspace_root),
        Commands::Doc(command) => cmd::doc::run_doc(command, user, output, &workspace_root),
        Commands::Annotate(args) => cmd::annotate::run_annotate(args, user, output, &workspace_root),
        Commands::Annotations(args) => {
            cmd::annotate::run_annotations(args, user, output, &workspace_root)
        }
        Commands::Annotation(AnnotationCommand::Rm(args)) => {
            cmd::annotate::run_annotation_rm(args, user, output, &workspace_root)
        }
        Commands::Stats(args) => cmd::stats::run_stats(args, user, output, &workspace_root),
        Commands::Segments(args) => cmd::stats::run_segments(args, user, output, &workspace_root),
    }
}
