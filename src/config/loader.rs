//! `.morphal-i18n.json` の読み込み

use std::path::Path;

use super::{
    CONFIG_FILE_NAME,
    ConfigError,
    I18nSettings,
};

/// プラグインのルートにある `.morphal-i18n.json` を読む
///
/// ファイルがなければ `Ok(None)`。先頭の UTF-8 BOM は無視する
/// (Windows のエディタで保存された設定ファイル向け)。
/// 値の検証はここでは行わず、[`super::ConfigManager`] が担当する。
///
/// # Errors
/// - [`ConfigError::IoError`]: ファイルを読めない
/// - [`ConfigError::ParseError`]: JSON として不正、または未知の重要度名など
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<I18nSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        tracing::debug!(path = %config_path.display(), "No configuration file");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&config_path)?;
    let settings: I18nSettings = serde_json::from_str(content.trim_start_matches('\u{feff}'))?;
    tracing::debug!(path = %config_path.display(), "Loaded configuration file");

    Ok(Some(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::{
        ConfigManager,
        Severity,
    };

    fn workspace_with_config(content: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), content).unwrap();
        temp_dir
    }

    #[rstest]
    fn test_load_lookup_and_diagnostics_settings() {
        let workspace = workspace_with_config(
            r#"{
                "lookup": {"defaultContext": "PTM4QgisProvider", "useUnfinished": true},
                "diagnostics": {"obsolete": "off", "numerusForms": "error"}
            }"#,
        );

        let settings = load_from_workspace(workspace.path()).unwrap().unwrap();

        assert_eq!(settings.lookup.default_context.as_deref(), Some("PTM4QgisProvider"));
        assert!(settings.lookup.use_unfinished);
        assert_eq!(settings.diagnostics.obsolete, Severity::Off);
        assert_eq!(settings.diagnostics.numerus_forms, Severity::Error);
        assert_eq!(settings.translation_files.include_patterns, ["**/i18n/*.ts"]);
    }

    #[rstest]
    fn test_load_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        assert!(load_from_workspace(temp_dir.path()).unwrap().is_none());
    }

    /// 設定ファイル名のディレクトリは設定ファイルとして扱わない
    #[rstest]
    fn test_load_ignores_directory_named_like_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();

        assert!(load_from_workspace(temp_dir.path()).unwrap().is_none());
    }

    #[rstest]
    fn test_load_skips_byte_order_mark() {
        let workspace = workspace_with_config("\u{feff}{\"lookup\": {\"useUnfinished\": true}}");

        let settings = load_from_workspace(workspace.path()).unwrap().unwrap();

        assert!(settings.lookup.use_unfinished);
    }

    #[rstest]
    #[case::not_json("invalid json")]
    #[case::unknown_severity(r#"{"diagnostics": {"unfinished": "fatal"}}"#)]
    #[case::wrong_type(r#"{"lookup": {"useUnfinished": "yes"}}"#)]
    fn test_load_rejects_malformed_file(#[case] content: &str) {
        let workspace = workspace_with_config(content);

        let result = load_from_workspace(workspace.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    /// 読み込み自体は成功しても、空の defaultContext は検証で弾かれる
    #[rstest]
    fn test_empty_default_context_is_rejected_on_load() {
        let workspace = workspace_with_config(r#"{"lookup": {"defaultContext": ""}}"#);
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(Some(workspace.path().to_path_buf()));

        let Err(ConfigError::ValidationErrors(errors)) = &result else {
            panic!("expected validation errors, got {result:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field_path, "lookup.defaultContext");
        assert!(manager.get_settings().lookup.default_context.is_none());
    }
}
