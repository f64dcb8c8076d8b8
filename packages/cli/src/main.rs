//! `apigraph` — command-line interface for API graph workspaces.
//!
//! Provides offline subcommands over workspace and document files:
//!
//! - **`validate`** — run the structural rules over an API document.
//! - **`project`** — derive the API document from a workspace graph.
//! - **`check`** — project a workspace, then validate the result.
//! - **`render`** — print a human-readable summary of a workspace graph.
//! - **`policy`** — print the connection table.
//!
//! All file arguments accept `-` to read from stdin.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use apigraph::{
    export, legal_targets, project, render, validate, ExportFormat, Graph, Issue, IssueSummary,
    NodeKind, Workspace,
};
use clap::{Parser, Subcommand};

/// apigraph — API graph CLI
///
/// Project, validate and inspect API graph workspaces.
#[derive(Parser)]
#[command(name = "apigraph", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an API document (JSON).
    ///
    /// Prints every issue found. Exits 0 when there are no error-severity
    /// issues, 1 otherwise.
    ///
    /// Pass `-` as FILE to read from stdin.
    Validate {
        /// Path to a JSON document, or `-` for stdin.
        file: PathBuf,

        /// Print issues as a JSON array instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Project a workspace into an API document and print it.
    ///
    /// Accepts a saved workspace (`{"header": ..., "graph": ...}`) or a bare
    /// graph (`{"nodes": [...], "edges": [...]}`), which is projected under
    /// the default header.
    Project {
        /// Path to a workspace JSON file, or `-` for stdin.
        file: PathBuf,

        /// Output format: json | yaml
        #[arg(short, long, default_value = "json", value_name = "FORMAT")]
        format: ExportFormat,
    },

    /// Project a workspace and validate the resulting document.
    ///
    /// Exits 0 when there are no error-severity issues, 1 otherwise.
    Check {
        /// Path to a workspace JSON file, or `-` for stdin.
        file: PathBuf,

        /// Print issues as a JSON array instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Render a workspace graph as human-readable text.
    Render {
        /// Path to a workspace JSON file, or `-` for stdin.
        file: PathBuf,
    },

    /// Print which node kinds may be linked to which.
    Policy,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file, json } => {
            let text = read_input(&file);
            let document = export::from_json(&text)
                .unwrap_or_else(|e| fatal(&format!("failed to parse document: {}", e)));
            report(&validate(&document), json);
        }

        Command::Project { file, format } => {
            let workspace = parse_workspace(&read_input(&file));
            let document = project(&workspace.graph, &workspace.header);
            let out = export::export(&document, format)
                .unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{}", out);
        }

        Command::Check { file, json } => {
            let workspace = parse_workspace(&read_input(&file));
            report(&validate(&workspace.document()), json);
        }

        Command::Render { file } => {
            let workspace = parse_workspace(&read_input(&file));
            print!("{}", render::render_graph(&workspace.graph));
        }

        Command::Policy => {
            for kind in NodeKind::ALL {
                let targets: Vec<String> =
                    legal_targets(kind).iter().map(|t| t.to_string()).collect();
                if targets.is_empty() {
                    println!("{:<16} (none)", kind.to_string());
                } else {
                    println!("{:<16} → {}", kind.to_string(), targets.join(", "));
                }
            }
        }
    }
}

/// Print `issues` and exit 1 if any is an error.
fn report(issues: &[Issue], json: bool) {
    if json {
        let out = serde_json::to_string_pretty(issues).unwrap_or_else(|e| fatal(&e.to_string()));
        println!("{}", out);
    } else {
        print!("{}", render::render_issues(issues));
    }
    if IssueSummary::of(issues).has_errors() {
        process::exit(1);
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Parse a JSON string as either a full workspace or a bare graph.
///
/// An object with a `header` or `graph` key is a workspace; anything else is
/// read as a graph and given the default header.
fn parse_workspace(json: &str) -> Workspace {
    let value: serde_json::Value = serde_json::from_str(json)
        .unwrap_or_else(|e| fatal(&format!("failed to parse input as JSON: {}", e)));
    let is_workspace = value
        .as_object()
        .is_some_and(|o| o.contains_key("header") || o.contains_key("graph"));

    if is_workspace {
        serde_json::from_value(value)
            .unwrap_or_else(|e| fatal(&format!("failed to parse input as a workspace: {}", e)))
    } else {
        let graph: Graph = serde_json::from_value(value)
            .unwrap_or_else(|e| fatal(&format!("failed to parse input as a graph: {}", e)));
        Workspace {
            graph,
            ..Workspace::default()
        }
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("apigraph: {}", msg);
    process::exit(2);
}
