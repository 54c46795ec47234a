//! Terminal output for the `parcel` binary.
//!
//! Uses `indicatif` for the `jobs wait` spinner and `console` for colors.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::grant::Grant;
use crate::job::{Job, JobPhase};

fn phase_style(phase: JobPhase) -> Style {
    match phase {
        JobPhase::Succeeded => Style::new().green().bold(),
        JobPhase::Failed => Style::new().red().bold(),
        JobPhase::Running => Style::new().cyan(),
        JobPhase::Pending => Style::new().yellow(),
    }
}

/// Spinner shown while polling a job.
pub struct JobProgress {
    pb: ProgressBar,
}

impl JobProgress {
    pub fn start(job_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("{job_id}: waiting"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn update(&self, job: &Job) {
        let phase = job.phase();
        self.pb
            .set_message(format!("{}: {}", job.id, phase_style(phase).apply_to(phase)));
    }

    pub fn finish(&self, job: &Job) {
        self.pb.finish_and_clear();
        let phase = job.phase();
        let mark = if phase == JobPhase::Succeeded { "✓" } else { "✗" };
        println!(
            "  {} Job {} {}",
            phase_style(phase).apply_to(mark),
            job.id,
            phase_style(phase).apply_to(phase)
        );
        if let Some(message) = &job.status.message {
            println!("    {message}");
        }
    }
}

pub fn print_job(job: &Job) {
    let dim = Style::new().dim();
    println!(
        "{}  {}  {}",
        job.id,
        phase_style(job.phase()).apply_to(job.phase()),
        job.spec.name
    );
    println!("  {} {}", dim.apply_to("created"), job.created_at.to_rfc3339());
    println!("  {} {}", dim.apply_to("image"), job.spec.image);
    if let Some(message) = &job.status.message {
        println!("  {} {message}", dim.apply_to("message"));
    }
    for doc in &job.status.output_documents {
        println!("  {} {} -> {}", dim.apply_to("output"), doc.mount_path, doc.id);
    }
}

pub fn print_grant(grant: &Grant) {
    let dim = Style::new().dim();
    let grantee = grant
        .grantee
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "everyone".to_string());
    println!("{}", grant.id);
    println!("  {} {}", dim.apply_to("created"), grant.created_at.to_rfc3339());
    println!("  {} {}", dim.apply_to("granter"), grant.granter);
    println!("  {} {grantee}", dim.apply_to("grantee"));
    if let Some(consent) = &grant.consent {
        println!("  {} {consent}", dim.apply_to("consent"));
    }
    if let Some(filter) = &grant.filter {
        println!("  {} {}", dim.apply_to("filter"), filter.0);
    }
}

pub fn print_done(action: &str, id: &str) {
    println!("  {} {action} {id}", Style::new().green().bold().apply_to("✓"));
}
