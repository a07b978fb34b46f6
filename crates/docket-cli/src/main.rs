//! The `docket` command-line interface.
//!
//! Drives a local SQLite case store: projects, evidence lifecycle, drafts,
//! report generation, and rendering reports to PDF packages on disk.
//!
//! Configuration is read from `config.toml` (or the path given with
//! `--config`), with `DOCKET_`-prefixed environment variables overriding
//! file values.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use docket_core::{
  draft::DraftContent,
  evidence::{EvidenceItem, NewEvidence, SourceEntry},
  store::CaseStore,
};
use docket_render::{DocumentRenderer, RenderOptions, compose_report_document};
use docket_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_store_path() -> PathBuf { PathBuf::from("docket.sqlite") }

#[derive(Debug, Clone, Deserialize)]
struct DocketConfig {
  /// Location of the SQLite store.
  #[serde(default = "default_store_path")]
  store_path: PathBuf,

  /// Default responsible party printed in rendered reports. Can be
  /// overridden per render with `--responsible`.
  #[serde(default)]
  responsible: Option<String>,

  /// Per-file size ceiling for rendered packages, in bytes.
  #[serde(default)]
  part_size_limit: Option<usize>,
}

// ─── Command line ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Docket evidence and report manager")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create a new project and print its id.
  ProjectNew { name: String },

  /// Show a project and its generated report versions.
  ProjectShow { project_id: Uuid },

  /// Record a new evidence item.
  EvidenceAdd {
    project_id: Uuid,
    #[arg(long)]
    title:      String,
    #[arg(long, default_value = "")]
    description: String,
    /// Object-storage reference for the underlying file.
    #[arg(long)]
    file_ref:   String,
    /// Select the item for the next generated report.
    #[arg(long)]
    include:    bool,
  },

  /// List a project's evidence, numbered in allocation order.
  EvidenceList {
    project_id: Uuid,
    /// Include soft-deleted items.
    #[arg(long)]
    all:        bool,
  },

  /// Update an item's title and description.
  EvidenceAnnotate {
    evidence_id: Uuid,
    #[arg(long)]
    title:       String,
    #[arg(long, default_value = "")]
    description: String,
  },

  /// Select or deselect an item for the next report.
  EvidenceInclude {
    evidence_id: Uuid,
    /// Deselect instead of select.
    #[arg(long)]
    off:         bool,
  },

  /// Soft-delete an item. Its number is never reused.
  EvidenceRemove { evidence_id: Uuid },

  /// Create evidence for source-feed entries not yet represented.
  Backfill {
    project_id: Uuid,
    /// JSON file holding the source feed entries.
    #[arg(long)]
    feed:       PathBuf,
  },

  /// Replace the project's draft from a JSON file.
  DraftSet {
    project_id: Uuid,
    #[arg(long)]
    file:       PathBuf,
  },

  /// Print the project's draft as JSON.
  DraftShow { project_id: Uuid },

  /// Generate the next immutable report version.
  Generate { project_id: Uuid },

  /// Render a generated report to PDF files in a directory.
  Render {
    report_id:   Uuid,
    #[arg(long, default_value = "out")]
    out:         PathBuf,
    /// Responsible party named in the document; defaults to the
    /// configured value.
    #[arg(long)]
    responsible: Option<String>,
  },

  /// Flip a report's archived flag.
  Archive {
    report_id: Uuid,
    #[arg(long)]
    undo:      bool,
  },

  /// Record that a backup of the rendered report has been downloaded.
  MarkBackedUp { report_id: Uuid },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DOCKET"))
    .build()
    .context("failed to read config file")?;
  let cfg: DocketConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  run(cli.command, &store, &cfg).await
}

async fn run(
  command: Command,
  store: &SqliteStore,
  cfg: &DocketConfig,
) -> anyhow::Result<()> {
  match command {
    Command::ProjectNew { name } => {
      let project = store.create_project(name).await?;
      println!("{}", project.project_id);
    }

    Command::ProjectShow { project_id } => {
      let project = store
        .get_project(project_id)
        .await?
        .with_context(|| format!("no project {project_id}"))?;
      println!("{}  {}", project.project_id, project.name);
      match project.legal_lock_activated_at {
        Some(at) => {
          println!("legal lock active since {}", at.format("%Y-%m-%d %H:%M UTC"))
        }
        None => println!("no report generated yet"),
      }
      for report in store.list_reports(project_id).await? {
        println!(
          "v{}  {}  {} evidence item(s){}{}",
          report.version_number,
          report.created_at.format("%Y-%m-%d %H:%M"),
          report.total_evidence_count,
          if report.archived { "  [archived]" } else { "" },
          if report.backup_downloaded { "  [backed up]" } else { "" },
        );
      }
    }

    Command::EvidenceAdd {
      project_id,
      title,
      description,
      file_ref,
      include,
    } => {
      let item = store
        .create_evidence(NewEvidence {
          project_id,
          title,
          description,
          file_ref,
          include_in_report: include,
        })
        .await?;
      println!("#{}  {}", item.evidence_number, item.evidence_id);
    }

    Command::EvidenceList { project_id, all } => {
      for item in store.list_evidence(project_id, !all).await? {
        print_evidence(&item);
      }
    }

    Command::EvidenceAnnotate { evidence_id, title, description } => {
      let item =
        store.annotate_evidence(evidence_id, title, description).await?;
      print_evidence(&item);
    }

    Command::EvidenceInclude { evidence_id, off } => {
      let item = store.set_inclusion(evidence_id, !off).await?;
      print_evidence(&item);
    }

    Command::EvidenceRemove { evidence_id } => {
      let item = store.soft_delete_evidence(evidence_id).await?;
      println!("#{} removed (number stays allocated)", item.evidence_number);
    }

    Command::Backfill { project_id, feed } => {
      let raw = std::fs::read_to_string(&feed)
        .with_context(|| format!("failed to read feed {feed:?}"))?;
      let entries: Vec<SourceEntry> =
        serde_json::from_str(&raw).context("invalid feed JSON")?;
      let created = store.backfill_from_source(project_id, entries).await?;
      println!("created {} evidence item(s)", created.len());
      for item in &created {
        print_evidence(item);
      }
    }

    Command::DraftSet { project_id, file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read draft {file:?}"))?;
      let content: DraftContent =
        serde_json::from_str(&raw).context("invalid draft JSON")?;
      let draft = store.put_draft(project_id, content).await?;
      println!(
        "draft updated at {}",
        draft.updated_at.format("%Y-%m-%d %H:%M UTC")
      );
    }

    Command::DraftShow { project_id } => {
      let content = store
        .get_draft(project_id)
        .await?
        .map(|draft| draft.content)
        .unwrap_or_default();
      println!("{}", serde_json::to_string_pretty(&content)?);
    }

    Command::Generate { project_id } => {
      let generated = generate_with_retry(store, project_id).await?;
      println!(
        "report {} generated as v{} with {} evidence item(s)",
        generated.report_id, generated.version_number, generated.evidence_count
      );
    }

    Command::Render { report_id, out, responsible } => {
      let report = store
        .get_report(report_id)
        .await?
        .with_context(|| format!("no report {report_id}"))?;
      let project = store
        .get_project(report.project_id)
        .await?
        .with_context(|| format!("no project {}", report.project_id))?;
      let snapshots = store.report_evidence(report_id).await?;

      let responsible = responsible
        .or_else(|| cfg.responsible.clone())
        .context("no responsible party; pass --responsible or configure one")?;

      let document =
        compose_report_document(&project, &report, &snapshots, &responsible)?;
      let mut options = RenderOptions::default();
      if let Some(limit) = cfg.part_size_limit {
        options.part_size_limit = limit;
      }
      let package = DocumentRenderer::new(options).render_package(&document)?;

      std::fs::create_dir_all(&out)
        .with_context(|| format!("failed to create {out:?}"))?;
      for file in std::iter::once(&package.main).chain(&package.parts) {
        let path = out.join(&file.name);
        std::fs::write(&path, &file.data)
          .with_context(|| format!("failed to write {path:?}"))?;
        println!("{}  {}  {} bytes", file.digest, file.name, file.data.len());
      }
    }

    Command::Archive { report_id, undo } => {
      let report = store.set_archived(report_id, !undo).await?;
      println!(
        "v{} archived: {}",
        report.version_number, report.archived
      );
    }

    Command::MarkBackedUp { report_id } => {
      let report = store.mark_backup_downloaded(report_id).await?;
      println!("v{} backup recorded", report.version_number);
    }
  }

  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Retry generation a few times when the store reports a write conflict;
/// everything else is terminal.
async fn generate_with_retry(
  store: &SqliteStore,
  project_id: Uuid,
) -> anyhow::Result<docket_core::report::GeneratedReport> {
  let mut attempts = 0;
  loop {
    match store.generate_report(project_id).await {
      Ok(generated) => return Ok(generated),
      Err(e) if e.is_retryable() && attempts < 3 => {
        attempts += 1;
        tracing::warn!("write conflict, retrying ({attempts}/3)");
      }
      Err(e) => return Err(e.into()),
    }
  }
}

fn print_evidence(item: &EvidenceItem) {
  let mut flags = String::new();
  if item.include_in_report {
    flags.push_str("  [included]");
  }
  if item.lock.is_locked() {
    flags.push_str("  [locked]");
  }
  if item.deleted_at.is_some() {
    flags.push_str("  [deleted]");
  }
  println!(
    "#{}  {}  {}{}",
    item.evidence_number, item.evidence_id, item.title, flags
  );
}
