//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::catalog::{
    Catalog,
    Context,
    Message,
};
use crate::types::SourcePosition;

/// テスト用の Catalog を作成する
///
/// # Arguments
/// * `language` - 言語コード（例: "fr"）。`None` なら属性なし
/// * `contexts` - コンテキスト名とメッセージの組
pub(crate) fn catalog_with(language: Option<&str>, contexts: &[(&str, Vec<Message>)]) -> Catalog {
    Catalog {
        contexts: contexts
            .iter()
            .map(|(name, messages)| Context { name: (*name).to_string(), messages: messages.clone() })
            .collect(),
        ..Catalog::new(language.map(str::to_string))
    }
}

/// メッセージに解析位置（0始まりの行）を付ける
pub(crate) fn positioned(message: Message, line: u32) -> Message {
    Message { position: Some(SourcePosition { line, character: 4 }), ..message }
}
