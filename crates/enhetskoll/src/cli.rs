use std::fmt::Display;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[clap(disable_help_subcommand = true)]
pub struct Cli {
    /// Where sysfs is mounted (useful for scanning the host from a container)
    #[arg(
        long,
        env = "ENHETSKOLL_SYSFS_ROOT",
        default_value = "/sys",
        global = true
    )]
    pub sysfs_root: PathBuf,
    /// ID database (`pci.ids` or `usb.ids`) to look up names in.
    /// The usual locations are searched if not given.
    #[arg(long, global = true)]
    pub ids: Option<PathBuf>,
    /// Don't look up names at all
    #[arg(long, global = true, conflicts_with = "ids")]
    pub no_ids: bool,
    /// Output format to use
    #[arg(short, long, default_value_t = Format::Human, global = true)]
    pub format: Format,
    /// Operation to perform
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List PCI devices
    Pci,
    /// List USB devices. Composite devices are listed once per interface class.
    Usb,
    /// Derive the short name for a name from the ID database
    Name {
        /// Bus the name is for
        bus: Bus,
        /// What kind of name it is
        field: Field,
        /// The name (multiple arguments are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },
}

/// Output format to use
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, clap::ValueEnum)]
pub enum Format {
    /// Human-readable output
    Human,
    /// JSON formatted output
    #[cfg(feature = "json")]
    Json,
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Human => write!(f, "human"),
            #[cfg(feature = "json")]
            Format::Json => write!(f, "json"),
        }
    }
}

/// Device bus
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, clap::ValueEnum)]
pub enum Bus {
    Pci,
    Usb,
}

impl Display for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bus::Pci => write!(f, "pci"),
            Bus::Usb => write!(f, "usb"),
        }
    }
}

/// Kind of name
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, clap::ValueEnum)]
pub enum Field {
    Class,
    Vendor,
    Device,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Class => write!(f, "class"),
            Field::Vendor => write!(f, "vendor"),
            Field::Device => write!(f, "device"),
        }
    }
}
