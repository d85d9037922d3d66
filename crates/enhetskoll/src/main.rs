//! Implements the CLI for enhetskoll

mod cli;

use std::io::BufWriter;
use std::io::Write;

use clap::Parser;
use cli::Cli;
use cli::Commands;
use cli::Field;
use cli::Format;
use enhetskoll_hwinfo::Bus;
use enhetskoll_hwinfo::DeviceRecord;
use enhetskoll_hwinfo::config::ScanConfiguration;
use enhetskoll_hwinfo::ids::IdDb;
use enhetskoll_hwinfo::ids::NameLookup;
use enhetskoll_hwinfo::readable::NameStrategy;
use enhetskoll_hwinfo::scan::LogObserver;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[cfg(target_env = "musl")]
use mimalloc::MiMalloc;

#[cfg(target_env = "musl")]
#[cfg_attr(target_env = "musl", global_allocator)]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    // Logs go to stderr, stdout is for the device listing
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Pci => list_devices(Bus::Pci, &cli),
        Commands::Usb => list_devices(Bus::Usb, &cli),
        Commands::Name { bus, field, text } => {
            let strategy = NameStrategy::for_bus((*bus).into());
            let text = text.join(" ");
            let name = match field {
                Field::Class => strategy.class(&text),
                Field::Vendor => strategy.vendor(&text),
                Field::Device => strategy.device(&text),
            };
            println!("{name}");
            Ok(())
        }
    }
}

/// One device in the output
#[derive(Debug)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
struct Listing {
    attributes: DeviceRecord,
    #[cfg_attr(feature = "json", serde(skip_serializing_if = "Option::is_none"))]
    names: Option<NameLookup<String>>,
    #[cfg_attr(feature = "json", serde(skip_serializing_if = "Option::is_none"))]
    readable: Option<NameLookup<String>>,
}

fn list_devices(bus: Bus, cli: &Cli) -> eyre::Result<()> {
    let config = ScanConfiguration::builder()
        .sysfs_root(cli.sysfs_root.clone())
        .build()?;
    let records = enhetskoll_hwinfo::scanner_for(bus, &config).scan(&LogObserver)?;
    let db = load_ids(bus, cli)?;

    let listings: Vec<Listing> = records
        .into_iter()
        .map(|attributes| Listing {
            names: db.as_ref().map(|db| db.lookup(&attributes).into_owned()),
            readable: db.as_ref().map(|db| db.readable(bus, &attributes)),
            attributes,
        })
        .collect();

    let mut stdout = BufWriter::new(std::io::stdout().lock());
    match cli.format {
        Format::Human => {
            for listing in &listings {
                print_human(&mut stdout, listing)?;
            }
        }
        #[cfg(feature = "json")]
        Format::Json => {
            serde_json::to_writer_pretty(&mut stdout, &listings)?;
            writeln!(stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn print_human(out: &mut impl Write, listing: &Listing) -> eyre::Result<()> {
    writeln!(out, "{}", listing.attributes)?;
    let (Some(names), Some(readable)) = (&listing.names, &listing.readable) else {
        return Ok(());
    };
    let rows = [
        ("class", &names.class, &readable.class),
        ("vendor", &names.vendor, &readable.vendor),
        ("device", &names.device, &readable.device),
    ];
    for (field, name, short) in rows {
        if let (Some(name), Some(short)) = (name, short) {
            writeln!(out, "    {field:<7}{name} [{short}]")?;
        }
    }
    Ok(())
}

/// Load the ID database, if any.
///
/// Only a database given on the command line is required to load.
fn load_ids(bus: Bus, cli: &Cli) -> eyre::Result<Option<IdDb>> {
    if cli.no_ids {
        return Ok(None);
    }
    if let Some(path) = &cli.ids {
        return IdDb::parse_file(path).map(Some);
    }
    let Some(path) = IdDb::find(bus) else {
        tracing::debug!("No {bus} ID database found");
        return Ok(None);
    };
    match IdDb::parse_file(&path) {
        Ok(db) => Ok(Some(db)),
        Err(err) => {
            tracing::warn!("Ignoring {bus} ID database: {err:#}");
            Ok(None)
        }
    }
}

impl From<cli::Bus> for Bus {
    fn from(value: cli::Bus) -> Self {
        match value {
            cli::Bus::Pci => Self::Pci,
            cli::Bus::Usb => Self::Usb,
        }
    }
}
