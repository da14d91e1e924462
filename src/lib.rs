//! morphal-i18n
//!
//! Qt Linguist 形式の翻訳カタログ（MorphAL プラグイン用）の読み込み・検索・検証

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod indexer;
pub mod translator;
pub mod types;

mod test_utils;

pub use catalog::{
    Catalog,
    load_catalog,
    parse_catalog,
};
pub use translator::Translator;
