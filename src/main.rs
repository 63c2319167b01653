// Wed Aug 5 2026 - Alex

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Instant;
use yarascan::config::{ScanConfig, SectionSpec};
use yarascan::output::project;
use yarascan::rules::DEFAULT_MAX_SIZE;
use yarascan::{Address, ImageLayer, LogSink, NativeEngine, RuleCompiler, ScanRequest, TableWriter};

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Yara pattern scanner for captured memory images", long_about = None)]
struct Args {
    /// Memory image to scan
    #[arg(short = 'p', long)]
    image: Option<PathBuf>,

    /// Base address the image is mapped at (hex accepted)
    #[arg(long, value_parser = parse_u64, default_value = "0")]
    base: u64,

    /// Inline yara rule text
    #[arg(short = 'r', long)]
    yara_rules: Option<String>,

    /// Yara rule file: path or file:// URI, optionally gzip-compressed
    #[arg(short = 'f', long)]
    yara_file: Option<String>,

    /// Case-insensitive matching
    #[arg(short, long)]
    insensitive: bool,

    /// Also match wide (utf-16le) string occurrences
    #[arg(short, long)]
    wide: bool,

    /// Upper bound on bytes scanned (hex accepted)
    #[arg(long, value_parser = parse_u64, default_value = "0x40000000")]
    max_size: u64,

    /// Restrict the scan to start:length windows (hex accepted, repeatable)
    #[arg(long = "section", value_parser = parse_section)]
    sections: Vec<SectionSpec>,

    /// Load defaults from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    no_progress: bool,
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let t = s.trim();
    let parsed = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        t.parse()
    };
    parsed.map_err(|e| e.to_string())
}

fn parse_section(s: &str) -> Result<SectionSpec, String> {
    let (start, length) = s
        .split_once(':')
        .ok_or_else(|| "expected start:length".to_string())?;
    Ok(SectionSpec {
        start: parse_u64(start)?,
        length: parse_u64(length)?,
    })
}

fn build_config(args: &Args) -> anyhow::Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => {
            ScanConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => ScanConfig::default(),
    };

    if let Some(image) = &args.image {
        config.image = image.clone();
    }
    if args.base != 0 {
        config.base = args.base;
    }
    if args.insensitive {
        config.insensitive = true;
    }
    if args.wide {
        config.wide = true;
    }
    if let Some(rule) = &args.yara_rules {
        config.yara_rules = Some(rule.clone());
    }
    if let Some(file) = &args.yara_file {
        config.yara_file = Some(file.clone());
    }
    if args.max_size != DEFAULT_MAX_SIZE {
        config.max_size = args.max_size;
    }
    if !args.sections.is_empty() {
        config.sections = args.sections.clone();
    }

    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    if std::env::var("RUST_LOG").is_ok() {
        yarascan::logging::init_from_env();
    } else {
        let level = if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        yarascan::logging::init_logger(level);
    }

    let show_progress = !args.no_progress;
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config, show_progress) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(config: &ScanConfig, show_progress: bool) -> anyhow::Result<()> {
    println!("{} Loading image: {}", "[*]".blue(), config.image.display());

    let layer = ImageLayer::open(&config.image)
        .with_context(|| format!("opening {}", config.image.display()))?
        .with_base(Address::new(config.base));
    println!(
        "{} Mapped {} bytes at {}",
        "[+]".green(),
        layer.len(),
        layer.base()
    );

    let engine = NativeEngine::new();
    let sink = LogSink;
    let rules = RuleCompiler::new(&engine).compile(&config.compile_options(), &sink)?;

    let mut request = ScanRequest::new(rules).with_max_size(config.max_size);
    if let Some(sections) = config.section_ranges() {
        request = request.with_sections(sections);
    }

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut writer = TableWriter::new(stdout.lock());
    let mut count = 0usize;

    for record in request.run(&layer, &sink) {
        writer.write_row(&project(&record))?;
        count += 1;
        if let Some(pb) = &spinner {
            pb.set_message(format!("{} match(es)", count));
        }
    }
    writer.flush()?;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    println!();
    println!(
        "{} {} match(es) in {:.2}s",
        "[+]".green(),
        count,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
