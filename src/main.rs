use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use codeaudit::{
    AnalysisDispatcher, AuditPipeline, AuditReport, ConfigStore, FsCrawler, PendingAuditor,
    ProviderName, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "codeaudit")]
#[command(version = "0.1.0")]
#[command(about = "AI-assisted code audit with multi-provider LLM analysis")]
struct Args {
    /// Provider configuration file
    #[arg(long, global = true, default_value = "codeaudit.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit code at a path with an AI provider
    Audit {
        /// File or directory to audit
        path: PathBuf,

        /// Provider to use (chatgpt, deepseek, kimi, ollama)
        #[arg(short, long, default_value = "chatgpt")]
        provider: String,

        /// Output format (json, text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Database path for report history
        #[arg(long, default_value = "codeaudit.db")]
        database: PathBuf,

        /// Use the most recent stored report for this path if available
        #[arg(long)]
        cached: bool,

        /// Cap on collected code bytes sent to the provider
        #[arg(long, default_value = "262144")]
        max_bytes: usize,
    },

    /// Inspect or edit provider settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective provider settings
    Show,

    /// Write the built-in defaults to the configuration file
    Init,

    /// Set a provider's API key
    SetKey { provider: String, api_key: String },

    /// Set a provider's base URL
    SetBase { provider: String, api_base: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("codeaudit=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Command::Audit {
            path,
            provider,
            format,
            output,
            database,
            cached,
            max_bytes,
        } => {
            let provider: ProviderName = provider.parse()?;
            let storage = Storage::new(&database)?;

            if cached {
                if let Some(report) = storage.latest_report(&path.display().to_string())? {
                    tracing::info!("Using stored report from {}", report.generated_at);
                    return output_report(&report, &format, output.as_deref());
                }
                tracing::info!("No stored report found, running a fresh audit");
            }

            let store = ConfigStore::load(&args.config)?;
            let dispatcher = AnalysisDispatcher::new(store)?;
            let pipeline = AuditPipeline::new(
                FsCrawler::new(max_bytes),
                dispatcher,
                PendingAuditor,
                storage,
            );

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .expect("Failed to build spinner template"),
            );
            spinner.set_message(format!("Auditing with {}...", provider.label()));
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));

            let result = pipeline.run(&path, provider).await;
            spinner.finish_and_clear();

            output_report(&result?, &format, output.as_deref())
        }

        Command::Config { command } => run_config_command(&args.config, command),
    }
}

fn run_config_command(path: &std::path::Path, command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            let store = ConfigStore::load(path)?;
            for (provider, config) in store.iter() {
                let key = if config.api_key.is_empty() {
                    "(not configured)".to_string()
                } else {
                    // Never echo full secrets back to the terminal.
                    let prefix: String = config.api_key.chars().take(6).collect();
                    format!("{}...", prefix)
                };
                println!("{:<10} {}  key: {}", provider, config.api_base, key);
            }
        }
        ConfigCommand::Init => {
            ConfigStore::default().save(path)?;
            println!("Defaults written to {}", path.display());
        }
        ConfigCommand::SetKey { provider, api_key } => {
            let provider: ProviderName = provider.parse()?;
            let mut store = ConfigStore::load(path)?;
            store.set_api_key(provider, api_key);
            store.save(path)?;
            println!("API key set for {}", provider.label());
        }
        ConfigCommand::SetBase { provider, api_base } => {
            let provider: ProviderName = provider.parse()?;
            let mut store = ConfigStore::load(path)?;
            store.set_api_base(provider, api_base);
            store.save(path)?;
            println!("Base URL set for {}", provider.label());
        }
    }
    Ok(())
}

fn output_report(
    report: &AuditReport,
    format: &str,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let rendered = match format {
        "json" => serde_json::to_string_pretty(report)?,
        "markdown" => format_markdown(report),
        _ => format_text(report),
    };

    if let Some(path) = output {
        std::fs::write(path, &rendered)?;
        tracing::info!("Report written to: {}", path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn format_text(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n=== Code Audit: {} ===\n\n", report.source_path));
    out.push_str(&format!("Model: {}\n\n", report.model));
    out.push_str("AI Analysis:\n");
    out.push_str(&report.analysis);
    out.push('\n');

    if report.findings.is_empty() {
        out.push_str("\nStatic findings: none\n");
    } else {
        out.push_str("\nStatic findings:\n");
        for finding in &report.findings.findings {
            let line = finding
                .line
                .map(|l| format!(":{}", l))
                .unwrap_or_default();
            out.push_str(&format!(
                "  [{:?}] {}{} ({}): {}\n",
                finding.severity, finding.file, line, finding.rule, finding.message
            ));
        }
    }

    out.push_str(&format!(
        "\nGenerated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out
}

fn format_markdown(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Code Audit: {}\n\n", report.source_path));
    out.push_str(&format!("**Model:** {}\n\n", report.model));
    out.push_str("## AI Analysis\n\n");
    out.push_str(&report.analysis);
    out.push_str("\n\n## Static Findings\n\n");

    if report.findings.is_empty() {
        out.push_str("_No findings (static pass pending)._\n");
    } else {
        out.push_str("| Severity | Location | Rule | Message |\n");
        out.push_str("|----------|----------|------|--------|\n");
        for finding in &report.findings.findings {
            let line = finding
                .line
                .map(|l| format!(":{}", l))
                .unwrap_or_default();
            out.push_str(&format!(
                "| {:?} | {}{} | {} | {} |\n",
                finding.severity, finding.file, line, finding.rule, finding.message
            ));
        }
    }

    out.push_str(&format!(
        "\n---\n*Generated {}*\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out
}
