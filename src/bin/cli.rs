//! fle-bridge CLI - run step scripts against a simulation and pull snapshots

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

use fle_bridge::config::BridgeConfig;
use fle_bridge::script::parser::read_script;
use fle_bridge::script::{ParseReport, StepParser};
use fle_bridge::session::render_batch;
use fle_bridge::{ActionQueue, AgentSession, DataType, WireFormat};

#[derive(Parser)]
#[command(name = "fle-bridge")]
#[command(about = "Queue and deliver agent actions to a simulation", long_about = None)]
struct Cli {
    /// Path to bridge.toml (defaults are used when the file is missing)
    #[arg(long, global = true, default_value = "bridge.toml", env = "FLE_BRIDGE_CONFIG")]
    config: PathBuf,
    /// Override the configured agent id
    #[arg(long, global = true)]
    agent_id: Option<u32>,
    /// Override the configured wire format
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Console,
    Http,
}

impl From<FormatArg> for WireFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Console => WireFormat::Console,
            FormatArg::Http => WireFormat::Http,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a step script and flush it to the backend
    Run {
        /// Step script to run
        script: PathBuf,
    },
    /// Parse a step script and print the payload without sending it
    Render {
        /// Step script to render
        script: PathBuf,
    },
    /// Fetch a world snapshot (meta, map or state)
    Data {
        kind: DataType,
        /// Search radius around the agent (defaults to the configured radius)
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Reset the scenario for the given number of agents
    Reset {
        agents: u32,
    },
    /// Start executing delivered actions
    Execute,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fle_bridge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Commands::Run { script } => run_script(&config, &script),
        Commands::Render { script } => render_script(&config, &script),
        Commands::Data { kind, radius } => fetch_data(&config, kind, radius),
        Commands::Reset { agents } => reset(&config, agents),
        Commands::Execute => execute(&config),
    }
}

fn load_config(cli: &Cli) -> BridgeConfig {
    let mut config = match BridgeConfig::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Some(agent_id) = cli.agent_id {
        config.agent_id = agent_id;
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    config
}

fn connect(config: &BridgeConfig) -> AgentSession {
    match config.connect() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error connecting ({} channel): {}", config.format, e);
            process::exit(1);
        }
    }
}

fn load_script(path: &Path) -> String {
    match read_script(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_report(report: &ParseReport) {
    for unknown in &report.unknown {
        eprintln!(
            "Note: line {}: skipped unknown step type \"{}\"",
            unknown.line_number, unknown.token
        );
    }
    for error in &report.errors {
        eprintln!("Warning: {}", error);
    }
}

// =============================================================================
// Run / Render Commands
// =============================================================================

fn run_script(config: &BridgeConfig, path: &Path) {
    let script = load_script(path);
    let mut session = connect(config);

    let outcome = StepParser::new().parse(&script, &mut session);
    print_report(&outcome.report);

    match outcome.flush {
        Ok(reply) => {
            println!("Queued {} actions for agent {}", outcome.report.appended, config.agent_id);
            if !reply.to_string().is_empty() {
                println!("{}", reply);
            }
        }
        Err(e) => {
            eprintln!("Error: flush failed: {}", e);
            process::exit(1);
        }
    }
}

fn render_script(config: &BridgeConfig, path: &Path) {
    let script = load_script(path);
    let mut queue = ActionQueue::new();
    let report = StepParser::new().parse_into(&script, &mut queue);
    print_report(&report);

    let rendered = match config.format {
        WireFormat::Console => render_batch(&config.console_renderer(), config.agent_id, &queue),
        WireFormat::Http => {
            let renderer = config.http_renderer();
            render_batch(&renderer, config.agent_id, &queue).map(|body| {
                let pretty = serde_json::to_string_pretty(&body)
                    .unwrap_or_else(|_| body.to_string());
                format!("POST {}\n{}", renderer.actions_path, pretty)
            })
        }
    };

    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

// =============================================================================
// Session Control Commands
// =============================================================================

fn fetch_data(config: &BridgeConfig, kind: DataType, radius: Option<u32>) {
    let mut session = connect(config);
    match session.get_data(kind, radius.unwrap_or(config.radius)) {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            eprintln!("Error fetching {} data: {}", kind.path_segment(), e);
            process::exit(1);
        }
    }
}

fn reset(config: &BridgeConfig, agents: u32) {
    let mut session = connect(config);
    match session.reset(agents) {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn execute(config: &BridgeConfig) {
    let mut session = connect(config);
    match session.execute() {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
