//! Codeintel MCP server
//!
//! Serves the C# code-intelligence tools to AI agents over stdio. An optional
//! positional argument names a solution, project or directory to load at startup.

use anyhow::Result;
use codeintel_mcp::{tool_inventory_json, CodeIntelServer};
use codeintel_search::AnalysisContext;
use rmcp::{transport::stdio, ServiceExt};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn print_help() {
    println!("Codeintel MCP server");
    println!();
    println!("Usage: codeintel-mcp [PATH] [--print-tools|--version|--help]");
    println!();
    println!("Arguments:");
    println!("  PATH           .sln, .slnx, .csproj or directory to load at startup");
    println!();
    println!("Flags:");
    println!("  --print-tools  Print tool inventory as JSON and exit");
    println!("  --version      Print version and exit");
    println!("  --help         Print this help and exit");
}

enum Startup {
    Exit(i32),
    Serve(Option<PathBuf>),
}

fn handle_cli_args() -> Startup {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => Startup::Serve(None),
        [flag] if flag == "--print-tools" => {
            println!("{}", tool_inventory_json(env!("CARGO_PKG_VERSION")));
            Startup::Exit(0)
        }
        [flag] if flag == "--version" || flag == "-V" => {
            println!("codeintel-mcp {}", env!("CARGO_PKG_VERSION"));
            Startup::Exit(0)
        }
        [flag] if flag == "--help" || flag == "-h" => {
            print_help();
            Startup::Exit(0)
        }
        [path] if !path.starts_with('-') => Startup::Serve(Some(PathBuf::from(path))),
        _ => {
            eprintln!("Unknown arguments: {}", args.join(" "));
            print_help();
            Startup::Exit(2)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let initial = match handle_cli_args() {
        Startup::Exit(code) => std::process::exit(code),
        Startup::Serve(path) => path,
    };

    // stdout carries the MCP protocol
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let context = Arc::new(AnalysisContext::with_workspace_provider());
    if let Some(path) = initial {
        match context.load_solution(&path, &CancellationToken::new()).await {
            Ok(state) => log::info!(
                "Loaded {} ({} projects)",
                state.info.name,
                state.info.projects.len()
            ),
            Err(err) => log::warn!("Failed to load {}: {err}", path.display()),
        }
    }

    log::info!("Starting codeintel MCP server");

    let service = CodeIntelServer::new(Arc::clone(&context));
    let surface = service.surface().clone();
    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    surface.cancel_all();
    context.clear().await;
    log::info!("Codeintel MCP server stopped");
    Ok(())
}
