pub mod abbrev;
pub mod config;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use abbrev::{AbbreviationCache, AbbrevisoClient, AbbrevisoConfig, JournalLookup};
pub use config::{Config, ConfigError};
pub use io::{discover_aux_files, parse_aux_file, parse_bibtex_file, render_bibtex};
pub use models::{Entry, Verdict, Violation};
pub use pipeline::{UnitReport, process_all, process_aux};
