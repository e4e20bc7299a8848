//! Book Catalog Admin CLI
//!
//! Administrative tool for inspecting and maintaining the book store directly,
//! without going through the HTTP server.

use anyhow::{bail, Context, Result};
use book_catalog::{open_storage, Book, BookDraft, BookOutcome, BookRepository, CatalogConfig, StorageBackend};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::info;

#[derive(Parser)]
#[command(name = "book-catalog-admin")]
#[command(about = "Book Catalog Admin CLI - inspect and maintain the book store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "BOOK_CATALOG_CONFIG")]
    config: Option<String>,

    /// Storage backend: memory or nats
    #[arg(long)]
    storage: Option<StorageBackend>,

    /// NATS server URL
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// Key-value bucket holding the books
    #[arg(long)]
    bucket: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all books
    List,

    /// Show one book
    Get {
        /// Book ID
        id: String,
    },

    /// Add a book
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        year: i32,
    },

    /// Delete a book
    Delete {
        /// Book ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        confirm: bool,
    },

    /// Show store statistics
    Stats,

    /// Delete every book in the store
    Purge {
        /// Skip the confirmation prompt
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut config = CatalogConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(backend) = cli.storage {
        config.storage.backend = backend;
    }
    if let Some(url) = cli.nats_url {
        config.storage.nats_url = url;
    }
    if let Some(bucket) = cli.bucket {
        config.storage.bucket = bucket;
    }

    if config.storage.backend == StorageBackend::Memory {
        eprintln!(
            "{}",
            "Using in-memory storage: changes are lost when this command exits".yellow()
        );
    }

    let storage = open_storage(&config.storage)
        .await
        .context("Failed to open book storage")?;
    let repository = BookRepository::new(storage);

    match cli.command {
        Commands::List => list_books(&repository).await?,
        Commands::Get { id } => show_book(&repository, &id).await?,
        Commands::Add { title, author, year } => add_book(&repository, title, author, year).await?,
        Commands::Delete { id, confirm } => {
            if confirm || confirm_prompt(&format!("Delete book {}?", id))? {
                delete_book(&repository, &id).await?;
            } else {
                println!("{}", "Aborted".yellow());
            }
        }
        Commands::Stats => show_stats(&repository).await?,
        Commands::Purge { confirm } => {
            if confirm || confirm_prompt("Delete ALL books from the store?")? {
                purge_books(&repository).await?;
            } else {
                println!("{}", "Aborted".yellow());
            }
        }
    }

    Ok(())
}

fn confirm_prompt(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn print_book(book: &Book) {
    println!("📖 ID: {}", book.id.bold());
    println!("   Title:  {}", book.title);
    println!("   Author: {}", book.author);
    println!("   Year:   {}", book.year);
}

async fn list_books(repository: &BookRepository) -> Result<()> {
    let books = repository.list().await?;

    println!("\n{}", format!("📚 Books ({})", books.len()).green().bold());
    println!("=====================================");

    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    for book in &books {
        print_book(book);
        println!();
    }

    Ok(())
}

// Unwrap an id-addressed outcome into the book or a CLI error
fn found(id: &str, outcome: BookOutcome) -> Result<Book> {
    match outcome {
        BookOutcome::Found(book) => Ok(book),
        BookOutcome::NotFound => bail!("Book not found: {}", id),
        BookOutcome::Failed(e) => Err(e.into()),
    }
}

async fn show_book(repository: &BookRepository, id: &str) -> Result<()> {
    let book = found(id, repository.get_by_id(id).await)?;
    print_book(&book);
    Ok(())
}

async fn add_book(repository: &BookRepository, title: String, author: String, year: i32) -> Result<()> {
    let draft = BookDraft::new(title, author, year)?;
    let book = repository.create(draft).await?;

    println!("{}", "✅ Book created".green());
    print_book(&book);
    Ok(())
}

async fn delete_book(repository: &BookRepository, id: &str) -> Result<()> {
    let book = found(id, repository.delete(id).await)?;
    info!("Deleted book {}", book.id);

    println!("{}", format!("🗑️  Deleted \"{}\" ({})", book.title, book.id).green());
    Ok(())
}

async fn show_stats(repository: &BookRepository) -> Result<()> {
    let books = repository.list().await?;

    println!("\n{}", "📈 Book Catalog Statistics".green().bold());
    println!("==================================");
    println!("Backend: {}", repository.backend_name());
    println!("Books:   {}", books.len());

    let mut authors: Vec<&str> = books.iter().map(|b| b.author.as_str()).collect();
    authors.sort_unstable();
    authors.dedup();
    println!("Authors: {}", authors.len());

    if let (Some(oldest), Some(newest)) = (
        books.iter().min_by_key(|b| b.year),
        books.iter().max_by_key(|b| b.year),
    ) {
        println!("Oldest:  {} ({})", oldest.title, oldest.year);
        println!("Newest:  {} ({})", newest.title, newest.year);
    }

    Ok(())
}

async fn purge_books(repository: &BookRepository) -> Result<()> {
    let removed = repository.purge().await?;
    println!("{}", format!("🧹 Removed {} books", removed).green());
    Ok(())
}
