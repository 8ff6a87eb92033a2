use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use daybrief_lib::json_loader::load_meetings;
use daybrief_lib::research::config::GateDecision;
use daybrief_lib::research::{
    enrich_meetings, select_research_provider, ResearchConfig, ResearchProvider, ResearchRequest,
    StubResearchProvider,
};

#[derive(Parser)]
#[command(name = "daybrief")]
#[command(about = "Attach verified research to a day's meetings", long_about = None)]
#[command(version)]
struct Cli {
    /// Meetings JSON (array, or an object with a `meetings` array)
    meetings: PathBuf,
    /// The executive's own address; its domain counts as internal
    #[arg(long)]
    mailbox: Option<String>,
    /// Use the offline stub provider even when an API key is configured
    #[arg(long)]
    stub: bool,
    /// Permit provider calls for this run
    #[arg(long)]
    allow_research: bool,
    /// Omit dev-only research traces from the output
    #[arg(long)]
    production: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match ResearchConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load research config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let meetings = match load_meetings(&cli.meetings) {
        Ok(meetings) => meetings,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let allowed = config.gate(cli.allow_research) == GateDecision::Allowed;
    let provider: Box<dyn ResearchProvider> = if cli.stub {
        Box::new(StubResearchProvider)
    } else {
        select_research_provider(&config, allowed)
    };

    let request = ResearchRequest {
        mailbox: cli.mailbox.as_deref(),
        allow_research: cli.allow_research,
    };
    let mut digest = enrich_meetings(&meetings, &request, &config, provider.as_ref());
    if cli.production {
        digest = digest.for_production();
    }

    match serde_json::to_string_pretty(&digest) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize digest: {}", e);
            ExitCode::FAILURE
        }
    }
}
