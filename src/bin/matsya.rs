//! matsya: command-line access to the MATSYA backend.
//!
//! Usage:
//!   matsya health
//!   matsya ingest survey.csv --source CMFRI --contributor "Survey team" --wait
//!   matsya marine --lat 9.9 --lng 76.2 --radius 25 --species "Sardinella longiceps"
//!   matsya stream --limit 10

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use matsya::types::{
    Coordinates, DataFormat, EdnaAnalysisRequest, ExportFormat, ExportRequest, ImageType,
    IngestionMetadata, IngestionRequest, Marker, MarineDataQuery, SpeciesIdentificationRequest,
    VesselQuery,
};
use matsya::{ApiResponse, ClientConfig, MatsyaClient, PollOutcome};

/// Command-line client for the MATSYA marine biodiversity platform
#[derive(Parser, Debug)]
#[command(name = "matsya", version)]
#[command(about = "Query and feed the MATSYA marine biodiversity backend")]
struct Cli {
    /// Backend base URL (REST calls go to <base>/api/v1)
    #[arg(long, global = true, env = "MATSYA_API_URL")]
    base_url: Option<String>,

    /// YAML client configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the raw JSON payload instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backend health and dependency status
    Health,

    /// Upload a dataset for ingestion
    Ingest {
        file: PathBuf,
        /// csv, json, dwc-a or obis-env (guessed from the extension if omitted)
        #[arg(long)]
        format: Option<DataFormat>,
        #[arg(long)]
        source: String,
        #[arg(long)]
        contributor: String,
        #[arg(long)]
        description: Option<String>,
        /// Poll the job until it finishes
        #[arg(long)]
        wait: bool,
    },

    /// Status of an ingestion job
    Status { job_id: String },

    /// Search occurrence records
    Marine {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Search radius in km around --lat/--lng
        #[arg(long, default_value = "10")]
        radius: f64,
        #[arg(long)]
        species: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Identify species in an image file
    Identify {
        image: PathBuf,
        #[arg(long, default_value = "specimen")]
        image_type: ImageType,
    },

    /// Match eDNA sequences against the reference database
    Edna {
        #[arg(required = true)]
        sequences: Vec<String>,
        #[arg(long, default_value = "COI")]
        marker: Marker,
    },

    /// List tracked vessels
    Vessels {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Latest sensor readings
    Realtime {
        #[arg(long)]
        sensor: Option<String>,
    },

    /// Request a dataset export
    Export {
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long)]
        species: Option<String>,
    },

    /// Print live update messages from the socket
    Stream {
        /// Stop after this many messages
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matsya=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::from_env(),
    };
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    let client = MatsyaClient::new(config)?;
    let json = cli.json;

    match cli.command {
        Command::Health => emit(client.health().await, json, |h| {
            println!("status: {}", h.status);
            if let Some(version) = &h.version {
                println!("version: {}", version);
            }
            for name in h.degraded_services() {
                println!("degraded: {}", name);
            }
        }),

        Command::Ingest {
            file,
            format,
            source,
            contributor,
            description,
            wait,
        } => {
            let mut metadata = IngestionMetadata::new(source, contributor);
            if let Some(d) = description {
                metadata = metadata.with_description(d);
            }
            let request = IngestionRequest::from_path(&file, format, metadata).await?;
            if !wait {
                return emit(client.ingest_data(&request).await, json, |job| {
                    println!("job {} {}", job.job_id, job.status);
                });
            }
            let tracker = match client.ingest_and_track(&request).await {
                ApiResponse::Success { data, .. } => data,
                ApiResponse::Failure { error, .. } => {
                    eprintln!("{}: {}", error.code, error.message);
                    return Ok(ExitCode::FAILURE);
                }
            };
            eprintln!("tracking job {}", tracker.job_id());
            report_outcome(tracker.wait().await, json)
        }

        Command::Status { job_id } => emit(client.ingestion_status(&job_id).await, json, |job| {
            println!(
                "job {} {}: {} processed, {} valid, {} invalid",
                job.job_id, job.status, job.records_processed, job.records_valid, job.records_invalid
            );
        }),

        Command::Marine {
            lat,
            lng,
            radius,
            species,
            limit,
        } => {
            let mut query = MarineDataQuery::new();
            if let Some(center) = Coordinates::from_parts(lat, lng)? {
                query = query.near(center.latitude, center.longitude, radius);
            }
            if let Some(s) = species {
                query = query.species(s);
            }
            query.limit = limit;
            emit(client.marine_data(&query).await, json, |page| {
                for r in &page.records {
                    println!(
                        "{}  {}  {}",
                        r.id,
                        r.scientific_name.as_deref().or(r.species.as_deref()).unwrap_or("-"),
                        r.event_date.as_deref().unwrap_or("-")
                    );
                }
                match page.total {
                    Some(total) => println!("{} of {} records", page.records.len(), total),
                    None => println!("{} records", page.records.len()),
                }
            })
        }

        Command::Identify { image, image_type } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("reading {}", image.display()))?;
            let request = SpeciesIdentificationRequest::from_image_bytes(&bytes, image_type);
            emit(client.identify_species(&request).await, json, |result| {
                if result.predictions.is_empty() {
                    println!("no species identified");
                }
                for p in &result.predictions {
                    println!(
                        "{:>5.1}%  {}",
                        p.confidence * 100.0,
                        p.scientific_name.as_deref().unwrap_or(&p.species)
                    );
                }
            })
        }

        Command::Edna { sequences, marker } => {
            let request = EdnaAnalysisRequest::from_raw(marker, sequences.as_slice());
            emit(client.analyze_edna(&request).await, json, |result| {
                if result.matches.is_empty() {
                    println!("no matches");
                }
                for m in &result.matches {
                    println!(
                        "{}  {:.3}  {}",
                        m.sequence_id.as_deref().unwrap_or("-"),
                        m.similarity,
                        m.species
                    );
                }
            })
        }

        Command::Vessels { status, limit } => {
            let query = VesselQuery {
                status,
                limit,
                ..Default::default()
            };
            emit(client.vessels(&query).await, json, |vessels| {
                for v in vessels {
                    println!(
                        "{}  {}  {}",
                        v.id,
                        v.name,
                        v.status.as_deref().unwrap_or("-")
                    );
                }
            })
        }

        Command::Realtime { sensor } => emit(
            client.realtime_oceanographic(sensor.as_deref()).await,
            json,
            |readings| {
                for r in readings {
                    println!(
                        "{}  {}  T={}  S={}",
                        r.sensor_id.as_deref().unwrap_or("-"),
                        r.timestamp.as_deref().unwrap_or("-"),
                        fmt_opt(r.temperature),
                        fmt_opt(r.salinity)
                    );
                }
            },
        ),

        Command::Export { format, species } => {
            let mut request = ExportRequest::new(format);
            if let Some(s) = species {
                request = request.with_filters(MarineDataQuery::new().species(s));
            }
            emit(client.export_data(&request).await, json, |export| {
                match &export.download_url {
                    Some(url) => println!("download: {}", url),
                    None => println!(
                        "export {} {}",
                        export.export_id.as_deref().unwrap_or("-"),
                        export.status.as_deref().unwrap_or("submitted")
                    ),
                }
            })
        }

        Command::Stream { limit } => {
            let mut subscription = client.subscribe().await?;
            let mut received = 0usize;
            loop {
                let message = tokio::select! {
                    m = subscription.recv() => m,
                    _ = tokio::signal::ctrl_c() => break,
                };
                let Some(message) = message else { break };
                println!("{}", serde_json::to_string(&message)?);
                received += 1;
                if limit.is_some_and(|n| received >= n) {
                    break;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn emit<T: Serialize>(
    response: ApiResponse<T>,
    json: bool,
    summary: impl FnOnce(&T),
) -> anyhow::Result<ExitCode> {
    match response {
        ApiResponse::Success { data, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                summary(&data);
            }
            Ok(ExitCode::SUCCESS)
        }
        ApiResponse::Failure { error, .. } => {
            eprintln!("{}: {}", error.code, error.message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_outcome(outcome: PollOutcome, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        if let Some(job) = outcome.job() {
            println!("{}", serde_json::to_string_pretty(job)?);
        }
    }
    match outcome {
        PollOutcome::Completed(job) => {
            if !json {
                println!(
                    "job {} completed: {} processed, {} valid, {} invalid",
                    job.job_id, job.records_processed, job.records_valid, job.records_invalid
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::Failed(job) => {
            eprintln!("job {} failed with {} errors", job.job_id, job.error_count());
            for issue in job.errors.iter().take(10) {
                eprintln!("  {}", issue.message);
            }
            Ok(ExitCode::FAILURE)
        }
        PollOutcome::Exhausted { attempts, .. } => {
            eprintln!("job still running after {} status checks", attempts);
            Ok(ExitCode::FAILURE)
        }
        PollOutcome::Abandoned { .. } => {
            eprintln!("job tracking stopped");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".into())
}
