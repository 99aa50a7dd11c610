//! Availability Worker CLI
//!
//! Runs the queue consumer (worker mode) or publishes a single
//! availability-check message for testing.

use anyhow::Result;
use availability_worker::config::{require_env, Settings};
use availability_worker::db::{create_pool_from_env, PgStore};
use availability_worker::queue::sqs::DEFAULT_REGION;
use availability_worker::{
    setup_signal_handler, AgentClient, AvailabilityProcessor, AvailabilityRequest, Consumer,
    CreateTaskRequest, Publisher, SqsQueueClient, WorkerConfig,
};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "availability-worker")]
#[command(about = "Consume availability-check tasks from SQS and store scraped results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the consumer loop against the configured queue
    Worker {
        /// Messages per receive call, processed sequentially (max 10)
        #[arg(short, long, default_value = "1")]
        batch_size: usize,

        /// Per-message timeout in seconds (overrides TIMEOUT_SECONDS)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Poll once and exit (for testing)
        #[arg(long)]
        once: bool,
    },

    /// Publish one availability-check message (for testing)
    Publish {
        /// Task description for the browser agent
        #[arg(short, long)]
        task: String,

        /// Id of the availability_requests row to store the result in
        #[arg(short = 'i', long)]
        task_id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load .env file if present
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Worker {
            batch_size,
            timeout,
            once,
        } => {
            info!("Initializing worker...");
            let settings = Settings::from_env()?;
            let timeout_seconds = timeout.unwrap_or(settings.timeout_seconds);

            match settings.queue_max_receives {
                Some(cap) => info!("Queue redrive cap: {cap} receive(s) before dead-letter"),
                None => warn!(
                    "QUEUE_MAX_RECEIVES not set; relying on the queue's own redrive \
                     policy to contain poison messages"
                ),
            }

            let pool = create_pool_from_env().await?;
            info!("Database connection established");

            let queue = SqsQueueClient::new(&settings.queue_url, &settings.region).await;
            info!("Consuming from queue: {}", settings.queue_url);

            let agent = AgentClient::new(&settings.agent_url, &settings.gemini_api_key)?;
            let processor = AvailabilityProcessor::new(
                PgStore::new(pool),
                agent,
                Duration::from_secs(timeout_seconds),
            );

            let config = WorkerConfig::builder()
                .batch_size(batch_size)
                .task_timeout_secs(timeout_seconds)
                .build();
            let consumer = Consumer::new(queue, processor, config);

            if once {
                info!("Running in single-poll mode...");
                let handled = consumer.poll_once().await?;
                println!("Handled {handled} message(s)");
            } else {
                // Graceful shutdown on SIGINT/SIGTERM
                setup_signal_handler(consumer.shutdown_handle());
                consumer.run().await?;
            }
        }

        Commands::Publish { task, task_id } => {
            let queue_url = require_env("QUEUE_URL")?;
            let region =
                std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());

            let queue = SqsQueueClient::new(&queue_url, &region).await;
            let publisher = Publisher::new(queue);

            let message = AvailabilityRequest {
                task_data: CreateTaskRequest { task },
                task_id,
            };
            publisher.publish(&message).await?;
            println!("Published availability check for task_id {task_id}");
        }
    }

    Ok(())
}
