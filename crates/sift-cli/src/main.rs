use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

use sift_analysis::{by_chunks, shannon, DEFAULT_CHUNK_SIZE};
use sift_engine::{EngineConfig, EngineGateway, SessionId, SessionManager};
use sift_report::{build_tree, AnalysisProgress, Report, TreeNode};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("sift")
        .version(sift_engine::VERSION)
        .about("Artifact triage from the command line")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("analyze")
                .about("Run the full analysis pipeline over a file")
                .arg(Arg::new("file").required(true).help("Path to the artifact"))
                .arg(
                    Arg::new("secret")
                        .long("secret")
                        .help("Decryption secret for encrypted containers"),
                )
                .arg(
                    Arg::new("rescan")
                        .long("rescan")
                        .help("After the parse, re-scan this member path as its own artifact"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("entropy")
                .about("Print whole-file and per-chunk Shannon entropy")
                .arg(Arg::new("file").required(true).help("Path to the artifact"))
                .arg(
                    Arg::new("chunk-size")
                        .long("chunk-size")
                        .default_value("256")
                        .value_parser(value_parser!(usize))
                        .help("Chunk size in bytes"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("analyze", args)) => {
            let path = args.get_one::<String>("file").expect("required");
            let secret = args.get_one::<String>("secret").cloned();
            let rescan = args.get_one::<String>("rescan").cloned();
            let json = args.get_flag("json");
            analyze(path, secret, rescan, json).await
        }
        Some(("entropy", args)) => {
            let path = args.get_one::<String>("file").expect("required");
            let chunk_size = *args.get_one::<usize>("chunk-size").expect("default");
            entropy(path, chunk_size)
        }
        _ => unreachable!("subcommand required"),
    }
}

async fn analyze(
    path: &str,
    secret: Option<String>,
    rescan: Option<String>,
    json: bool,
) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let declared_mime = mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string);

    let mut manager = SessionManager::new(EngineGateway::new(EngineConfig::new()));
    let id = match secret {
        Some(secret) => manager.open_with_secret(&name, bytes, declared_mime, secret),
        None => manager.open(&name, bytes, declared_mime),
    };
    let progress = wait_settled(&manager, id).await?;

    let (report, progress) = match rescan {
        Some(member) => {
            let child = manager
                .scan_member(id, &member)
                .with_context(|| format!("cannot re-scan member {member}"))?;
            let progress = wait_settled(&manager, child).await?;
            (manager.report(child)?, progress)
        }
        None => (manager.report(id)?, progress),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&name, &report);
    }

    if progress == AnalysisProgress::CompleteWithFailures {
        std::process::exit(1);
    }
    Ok(())
}

async fn wait_settled(manager: &SessionManager, id: SessionId) -> Result<AnalysisProgress> {
    // Bounded wait; the pipeline settles in milliseconds for typical files.
    for _ in 0..6000 {
        let progress = manager.progress(id)?;
        if progress != AnalysisProgress::Running {
            return Ok(progress);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    bail!("analysis did not finish in time");
}

fn entropy(path: &str, chunk_size: usize) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;

    println!("Overall entropy: {:.4}", shannon(&bytes));
    if chunk_size != DEFAULT_CHUNK_SIZE {
        println!("Chunk size: {chunk_size}");
    }
    for chunk in by_chunks(&bytes, chunk_size) {
        println!("  chunk {:>5}: {:.4}", chunk.index, chunk.entropy);
    }
    Ok(())
}

fn print_report(name: &str, report: &Report) {
    println!("Artifact: {name}");
    match report.progress() {
        AnalysisProgress::Complete => println!("Status: complete"),
        AnalysisProgress::CompleteWithFailures => println!("Status: complete with failures"),
        AnalysisProgress::Running => println!("Status: running"),
    }

    println!("Tasks:");
    for kind in sift_report::TaskKind::LIFECYCLE {
        if let Some(status) = report.status.get(kind) {
            println!("  {kind}: {status:?}");
        }
    }

    if let Some(info) = &report.content_type {
        println!(
            "Content type: {} ({})",
            info.mime_type.as_deref().unwrap_or("unknown"),
            info.group.as_deref().unwrap_or("unknown group"),
        );
    }
    if let Some(entropy) = report.entropy {
        println!("Entropy: {entropy:.4}");
    }

    if !report.metadata.is_empty() {
        println!("Metadata:");
        for entry in &report.metadata {
            println!("  {}: {}", entry.title, entry.value);
        }
    }

    if !report.heuristics.is_empty() {
        println!("Heuristics:");
        for heuristic in &report.heuristics {
            println!("  [{}] {}", heuristic.severity.as_str(), heuristic.name);
        }
    }

    if !report.ips.is_empty() {
        println!("IP indicators:");
        for ip in &report.ips {
            println!("  {ip}");
        }
    }
    if !report.urls.is_empty() {
        println!("URL indicators:");
        for url in &report.urls {
            println!("  {url}");
        }
    }

    if let Some(structured) = &report.structured {
        if !structured.items.is_empty() {
            println!("Contents:");
            for node in build_tree(&structured.items) {
                print_node(&node, 1);
            }
        }
        if !structured.imports.is_empty() {
            println!("Imports:");
            for (library, functions) in &structured.imports {
                println!("  {library}: {}", functions.join(", "));
            }
        }
    }
}

fn print_node(node: &TreeNode, indent: usize) {
    let pad = "  ".repeat(indent);
    let marker = if node.encrypted { " [encrypted]" } else { "" };
    println!("{pad}{}{marker}", node.name);
    for child in &node.children {
        print_node(child, indent + 1);
    }
}
