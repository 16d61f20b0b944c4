use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use minidb::{BufferPoolManager, ColumnInfo, DbConfig, DiskManager, PageId, Record, Relation};

#[derive(Parser)]
#[command(author, version, about = "MiniDB - paged record storage demo")]
struct Cli {
    /// Database directory (page files live in <db-path>/BinData)
    #[arg(short, long, default_value = "DB")]
    db_path: PathBuf,

    /// Page size in bytes
    #[arg(short, long, default_value_t = 4096)]
    page_size: usize,

    /// Buffer pool size (number of frames)
    #[arg(short, long, default_value_t = 4)]
    buffer_count: usize,

    /// Replacement policy (LRU or MRU)
    #[arg(long, default_value = "LRU")]
    policy: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a relation, insert and delete a few records, then flush
    Demo {
        /// Number of records to insert
        #[arg(short, long, default_value_t = 10)]
        records: usize,
    },

    /// Show page files and allocation counts
    Info,

    /// Hex dump of a page as stored on disk
    Dump {
        file_idx: i32,
        page_idx: i32,
        /// Number of bytes to show
        #[arg(short, long, default_value_t = 64)]
        len: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = DbConfig {
        page_size: cli.page_size,
        buffer_count: cli.buffer_count,
        replacement_policy: cli.policy.clone(),
        ..DbConfig::new(&cli.db_path)
    };

    let disk_manager = Arc::new(DiskManager::new(&config).context("Invalid configuration")?);
    disk_manager
        .init()
        .with_context(|| format!("Failed to open database at {:?}", config.db_path))?;
    let buffer_pool = Arc::new(BufferPoolManager::new(&config, disk_manager.clone()));

    match cli.command.unwrap_or(Commands::Demo { records: 10 }) {
        Commands::Demo { records } => run_demo(&disk_manager, &buffer_pool, records)?,
        Commands::Info => show_info(&config, &disk_manager),
        Commands::Dump { file_idx, page_idx, len } => {
            let mut buf = vec![0u8; config.page_size];
            disk_manager.read_page(PageId::new(file_idx, page_idx), &mut buf)?;
            println!("{}", hex::encode(&buf[..len.min(buf.len())]));
        }
    }

    buffer_pool.flush_buffers()?;
    disk_manager.finish()?;
    Ok(())
}

fn run_demo(
    disk_manager: &Arc<DiskManager>,
    buffer_pool: &Arc<BufferPoolManager>,
    count: usize,
) -> Result<()> {
    let columns = vec![
        ColumnInfo::int("id")?,
        ColumnInfo::float("price")?,
        ColumnInfo::char("code", 4)?,
        ColumnInfo::varchar("name", 12)?,
    ];
    let record_size: usize = columns.iter().map(ColumnInfo::size_in_bytes).sum();
    let slots = Relation::max_slots_per_page(buffer_pool.page_size(), record_size).min(8);

    let relation = Relation::create("Demo", columns, slots, disk_manager.clone(), buffer_pool.clone())?;
    println!("Created {}", relation.describe());

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let record = Record::from_values([
            i.to_string(),
            format!("{:.2}", i as f32 * 1.5),
            format!("C{:03}", i),
            format!("item-{}", i),
        ]);
        ids.push(relation.insert_record(&record)?);
    }
    println!("Inserted {} records into {} data pages", count, relation.data_pages()?.len());

    for rid in ids.iter().step_by(3) {
        relation.delete_record(*rid)?;
    }

    for (rid, record) in relation.get_all_records_with_ids()? {
        println!("{:>10}  {}", rid.to_string(), record);
    }

    let header = relation.header_page_id();
    let page = buffer_pool.get_page(header)?;
    println!("Header page {}: {}", header, hex::encode(&page.read().data[..16]));
    buffer_pool.free_page(header, false);

    let meta = relation.meta();
    println!(
        "Relation {} header={} slots={} record_size={}",
        meta.name,
        meta.header_page_id,
        meta.slots_per_page,
        meta.record_size()
    );
    Ok(())
}

fn show_info(config: &DbConfig, disk_manager: &DiskManager) {
    println!("Database: {:?}", config.db_path);
    println!("Page size: {} bytes", config.page_size);
    for file_idx in 0..config.max_file_count {
        if let Some(pages) = disk_manager.page_count(file_idx) {
            println!("  {:?}: {} pages", disk_manager.file_path(file_idx), pages);
        }
    }
    println!("Allocated pages: {}", disk_manager.allocated_page_count());
}
