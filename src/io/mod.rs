pub mod aux;
pub mod discover;
pub mod input;
pub mod output;

pub use aux::{AuxData, AuxError, parse_aux, parse_aux_file};
pub use discover::discover_aux_files;
pub use input::{BibParseError, BibSource, parse_bibtex, parse_bibtex_file};
pub use output::{file_checksum, render_bibtex, sha256_hex, write_atomically};
