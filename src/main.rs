use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use translation_conformance::config::HarnessConfig;
use translation_conformance::logging::setup_logging;
use translation_conformance::runner::{RunReport, Runner};
use translation_conformance::scenarios::{self, Scenario};

const EXIT_CONFIG_ERROR: u8 = 2;

enum Command {
    Help,
    List,
    Run(Vec<String>),
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut names = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--list" => return Ok(Command::List),
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {flag}")),
            name => names.push(name.to_string()),
        }
    }
    Ok(Command::Run(names))
}

fn usage() -> String {
    format!(
        "translation-conformance v{}\n\n\
         Usage: translation-conformance [--list] [SCENARIO ...]\n\n\
         Runs the conformance scenarios against TEST_API_URL (default http://localhost:5000).\n\
         Tag filters: TEST_RUN__TAGS, TEST_RUN__SKIP_TAGS (comma separated).\n\
         Output format follows TEST_LOG__FORMAT (pretty|json).",
        env!("CARGO_PKG_VERSION")
    )
}

/// Process exit status for a finished run: 0 when nothing failed, 1 otherwise.
fn exit_status(report: &RunReport) -> u8 {
    if report.is_success() {
        0
    } else {
        1
    }
}

fn load_config() -> Result<HarnessConfig, u8> {
    HarnessConfig::new().map_err(|e| {
        eprintln!(
            "Failed to load configuration: {e}. Please check your TEST_* environment variables."
        );
        EXIT_CONFIG_ERROR
    })
}

fn list_scenarios(all: &[Box<dyn Scenario>]) -> String {
    all.iter()
        .map(|s| {
            let tags = s.tags().iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",");
            format!("{:<28} [{tags}]", s.name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let all = scenarios::all();

    let names = match parse_args(&args) {
        Ok(Command::Help) => {
            println!("{}", usage());
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Command::List) => {
            println!("{}", list_scenarios(&all));
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Command::Run(names)) => names,
        Err(e) => {
            eprintln!("{e}\n\n{}", usage());
            return Ok(ExitCode::from(EXIT_CONFIG_ERROR));
        }
    };

    if let Some(unknown) = names.iter().find(|n| !all.iter().any(|s| s.name() == n.as_str())) {
        eprintln!("Unknown scenario '{unknown}'. Known scenarios:\n{}", list_scenarios(&all));
        return Ok(ExitCode::from(EXIT_CONFIG_ERROR));
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return Ok(ExitCode::from(code)),
    };

    setup_logging(&config.log);
    info!(
        "Target={}, DB configured={}",
        config.base_url(),
        !config.db_url().is_empty()
    );

    let json_output = config.log.is_json();
    let runner = Runner::new(Arc::new(config))?;
    let report = runner.run_selected(&all, &names).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    let code = exit_status(&report);
    if code != 0 {
        error!("{} scenario(s) failed", report.failed());
    }
    Ok(ExitCode::from(code))
}
