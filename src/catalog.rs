//! Translation catalogues: data model, XML reader/writer and lookup table.
mod error;
/// Language detection
pub mod language;
/// Lookup table and resolution
pub mod lookup;
/// Catalogue data model
pub mod model;
/// XML reader
pub mod parser;
/// Plural rules for numerus messages
pub mod plural;
/// XML writer
pub mod writer;

pub use error::CatalogError;
pub use lookup::{
    FallbackReason,
    LookupTable,
    Resolution,
};
pub use model::{
    Catalog,
    CatalogStats,
    Context,
    LineRef,
    Location,
    Message,
    Translation,
    TranslationStatus,
    TranslationText,
};
pub use parser::{
    load_catalog,
    parse_catalog,
};
pub use writer::{
    save_catalog,
    write_catalog,
};
