use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

use parcel::cli::{Cli, Command, GrantsCommand, JobsCommand};
use parcel::{
    ApiClient, Constraints, Grant, GrantCreateParams, GrantId, Grantee, JobId, JobSpec,
    ListJobsFilter, ParcelConfig, delete_grant, get_job, list_jobs, submit_job, terminate_job, ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ParcelConfig::load().context("failed to load parcel.toml")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let client = config.client().context("failed to build HTTP client")?;

    match cli.command {
        Command::Jobs(cmd) => run_jobs(&client, cmd).await,
        Command::Grants(cmd) => run_grants(&client, cmd).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("parcel=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_jobs(client: &ApiClient, cmd: JobsCommand) -> Result<()> {
    match cmd {
        JobsCommand::Submit { file } => {
            let spec = JobSpec::load(&file)
                .with_context(|| format!("failed to read job spec {}", file.display()))?;
            let job = submit_job(client, &spec).await.context("failed to submit job")?;
            ui::print_job(&job);
        }
        JobsCommand::Get { id } => {
            let job = get_job(client, &JobId::new(id)).await?;
            ui::print_job(&job);
        }
        JobsCommand::List(args) => {
            let mut filter = ListJobsFilter::new();
            filter.page.page_size = args.page_size;
            filter.page.page_token = args.page_token;
            for (key, value) in args.params {
                filter = filter.with_param(key, value);
            }
            let page = list_jobs(client, &filter).await?;
            for job in &page.results {
                ui::print_job(job);
            }
            if page.has_more() {
                let token = page.next_page_token.as_deref().unwrap_or_default();
                println!("next page: --page-token {token}");
            }
        }
        JobsCommand::Terminate { id } => {
            terminate_job(client, &JobId::new(id.clone())).await?;
            ui::print_done("terminated job", &id);
        }
        JobsCommand::Wait { id, interval_secs } => {
            let id = JobId::new(id);
            let progress = ui::JobProgress::start(id.as_str());
            loop {
                let job = get_job(client, &id).await?;
                if job.is_terminal() {
                    progress.finish(&job);
                    break;
                }
                progress.update(&job);
                sleep(Duration::from_secs(interval_secs)).await;
            }
        }
    }
    Ok(())
}

async fn run_grants(client: &ApiClient, cmd: GrantsCommand) -> Result<()> {
    match cmd {
        GrantsCommand::Create { grantee, filter } => {
            let mut params = GrantCreateParams::new(Grantee::from(grantee));
            if let Some(raw) = filter {
                let value = serde_json::from_str(&raw).context("--filter is not valid JSON")?;
                params = params.with_filter(Constraints(value));
            }
            let grant = Grant::create(client, &params).await.context("failed to create grant")?;
            ui::print_grant(&grant);
        }
        GrantsCommand::Get { id } => {
            let grant = Grant::get(client, &GrantId::new(id)).await?;
            ui::print_grant(&grant);
        }
        GrantsCommand::Delete { id } => {
            delete_grant(client, &GrantId::new(id.clone())).await?;
            ui::print_done("deleted grant", &id);
        }
    }
    Ok(())
}
