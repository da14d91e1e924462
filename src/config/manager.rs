//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    FileMatcher,
    I18nSettings,
    LookupConfig,
    MatcherError,
    loader,
};

/// 設定管理を行う
///
/// 設定ファイル (`.morphal-i18n.json`) の読み込み・検証と、
/// 設定から派生するマッチャーの生成を担当する。
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: I18nSettings,

    /// 設定ファイルを読み込んだワークスペースのルートパス
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// デフォルト設定で作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: I18nSettings::default(), workspace_root: None }
    }

    /// ワークスペースの設定ファイルを読み込む
    ///
    /// 設定ファイルがなければデフォルト設定を使う。
    /// 読み込みまたは検証に失敗した場合、現在の設定は変更しない。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(workspace_root = ?workspace_root, "Loading settings");

        let settings = match &workspace_root {
            Some(root) => loader::load_from_workspace(root)?.unwrap_or_default(),
            None => I18nSettings::default(),
        };
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded");

        Ok(())
    }

    /// 設定を置き換える（コマンドラインからの上書き用）
    ///
    /// # Errors
    /// - バリデーションエラー
    pub fn update_settings(&mut self, new_settings: I18nSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;
        self.current_settings = new_settings;
        tracing::debug!("Settings updated");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &I18nSettings {
        &self.current_settings
    }

    /// 検索設定を取得
    #[must_use]
    pub const fn lookup_config(&self) -> &LookupConfig {
        &self.current_settings.lookup
    }

    /// ワークスペースルートを取得
    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }

    /// `root` 以下の翻訳ファイルを判定するマッチャーを作成
    ///
    /// # Errors
    /// - 不正な glob パターン
    pub fn file_matcher(&self, root: &Path) -> Result<FileMatcher, MatcherError> {
        FileMatcher::new(root.to_path_buf(), &self.current_settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;

    /// new: デフォルト値で作成される
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert!(!manager.get_settings().lookup.use_unfinished);
        assert!(manager.workspace_root().is_none());
    }

    /// load_settings: workspace_root が None の場合
    #[rstest]
    fn test_load_settings_without_workspace() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().translation_files.include_patterns, ["**/i18n/*.ts"]);
        assert!(manager.workspace_root().is_none());
    }

    /// load_settings: 設定ファイルがある場合
    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"lookup": {"useUnfinished": true}}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert!(manager.get_settings().lookup.use_unfinished);
        assert!(manager.workspace_root().is_some());
    }

    /// load_settings: 設定ファイルがない場合はデフォルト値
    #[rstest]
    fn test_load_settings_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert!(!manager.get_settings().lookup.use_unfinished);
    }

    /// load_settings: 不正な設定ファイルはエラーになり、現在の設定は変わらない
    #[rstest]
    fn test_load_settings_with_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"indexing": {"numThreads": 0}}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert!(manager.get_settings().indexing.num_threads.is_none());
        assert!(manager.workspace_root().is_none());
    }

    /// update_settings: 有効な設定で更新成功
    #[rstest]
    fn test_update_settings_valid() {
        let mut manager = ConfigManager::new();
        let mut new_settings = I18nSettings::default();
        new_settings.lookup.use_unfinished = true;

        let result = manager.update_settings(new_settings);

        assert!(result.is_ok());
        assert!(manager.get_settings().lookup.use_unfinished);
    }

    /// file_matcher: 現在の設定のパターンを使う
    #[rstest]
    fn test_file_matcher_uses_current_settings() {
        let manager = ConfigManager::new();

        let matcher = manager.file_matcher(Path::new("/plugin")).unwrap();

        assert!(matcher.is_translation_file(Path::new("/plugin/resources/i18n/morphal_fr.ts")));
        assert_eq!(matcher.workspace_root(), Path::new("/plugin"));
    }

    /// update_settings: 無効な設定でエラー
    #[rstest]
    fn test_update_settings_invalid() {
        let mut manager = ConfigManager::new();
        let mut new_settings = I18nSettings::default();
        new_settings.translation_files.include_patterns.clear(); // 空は無効

        let result = manager.update_settings(new_settings);

        assert!(result.is_err());
    }
}
