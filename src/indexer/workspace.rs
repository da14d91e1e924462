//! Loads every catalogue under a workspace root into a shared index.
use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use futures::StreamExt;
use ignore::WalkBuilder;
use tokio::sync::RwLock;

use crate::catalog::language::{
    catalog_language,
    normalize_language_code,
};
use crate::catalog::{
    Catalog,
    CatalogError,
    parse_catalog,
};
use crate::config::{
    ConfigManager,
    FileMatcher,
    LookupConfig,
};
use crate::indexer::types::{
    IndexedCatalog,
    IndexerError,
    LoadFailure,
};
use crate::translator::Translator;

/// Catalogues of a workspace, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    /// 読み込み済みカタログ（パス順）
    catalogs: Arc<RwLock<BTreeMap<PathBuf, IndexedCatalog>>>,
    /// 読み込みに失敗したファイル
    failures: Arc<RwLock<Vec<LoadFailure>>>,
}

impl CatalogIndex {
    /// 新しいインデックスを作成
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ワークスペースをインデックス
    ///
    /// `workspace_path` may be a directory, searched with the configured
    /// patterns, or a single catalogue file, loaded as is. Files that fail to
    /// load are recorded in [`Self::failures`] and do not stop indexing.
    ///
    /// Returns the number of catalogues loaded by this call.
    ///
    /// # Errors
    /// - The path does not exist
    /// - The configured patterns are invalid
    pub async fn index_workspace(
        &self,
        workspace_path: &Path,
        config_manager: &ConfigManager,
    ) -> Result<usize, IndexerError> {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");
        if !workspace_path.exists() {
            return Err(IndexerError::InvalidPath(workspace_path.to_path_buf()));
        }

        let files = if workspace_path.is_file() {
            vec![workspace_path.to_path_buf()]
        } else {
            let matcher = config_manager.file_matcher(workspace_path)?;
            Self::find_catalog_files(&matcher)
        };
        let num_threads = config_manager.get_settings().indexing.effective_num_threads();
        tracing::debug!(files = files.len(), num_threads, "Loading catalogues");

        // 並列処理でファイルを読み込む（同時実行数は numThreads まで）
        let results: Vec<(PathBuf, Result<Catalog, CatalogError>)> = futures::stream::iter(files)
            .map(|path| async move {
                let result = Self::load_file(&path).await;
                (path, result)
            })
            .buffer_unordered(num_threads)
            .collect()
            .await;

        let mut loaded = 0;
        let mut catalogs = self.catalogs.write().await;
        let mut failures = self.failures.write().await;
        for (path, result) in results {
            // 再インデックス時は古い失敗記録を消す
            failures.retain(|failure| failure.path != path);
            match result {
                Ok(catalog) => {
                    let language = catalog_language(&catalog, Some(&path));
                    catalogs.insert(
                        path.clone(),
                        IndexedCatalog { path, language, catalog: Arc::new(catalog) },
                    );
                    loaded += 1;
                }
                Err(error) => {
                    // 読み込みエラーは警告として扱い、処理を続行
                    tracing::warn!(path = %path.display(), %error, "Skipping catalogue");
                    catalogs.remove(&path);
                    failures.push(LoadFailure { path, error: Arc::new(error) });
                }
            }
        }
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(loaded, failed = failures.len(), "Workspace indexed");
        Ok(loaded)
    }

    /// 単一ファイルを読み込む
    async fn load_file(path: &Path) -> Result<Catalog, CatalogError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        parse_catalog(&content)
    }

    /// カタログファイルを検索
    fn find_catalog_files(matcher: &FileMatcher) -> Vec<PathBuf> {
        let workspace_path = matcher.workspace_root();
        let mut found_files = Vec::new();

        // ignore クレートでファイルを走査
        for result in WalkBuilder::new(workspace_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry({
                let matcher = matcher.clone();
                let root = workspace_path.to_path_buf();
                move |entry| {
                    // 除外ディレクトリには降りない
                    let Ok(relative) = entry.path().strip_prefix(&root) else {
                        return true;
                    };
                    relative.as_os_str().is_empty() || !matcher.is_excluded_relative(relative)
                }
            })
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            // ファイルのみを対象
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative_path) = path.strip_prefix(workspace_path) else {
                continue;
            };
            if matcher.is_translation_file_relative(relative_path) {
                found_files.push(path.to_path_buf());
            }
        }

        found_files.sort();
        found_files
    }

    /// 読み込み済みカタログ（パス順）
    pub async fn catalogs(&self) -> Vec<IndexedCatalog> {
        self.catalogs.read().await.values().cloned().collect()
    }

    /// 読み込みに失敗したファイル（パス順）
    pub async fn failures(&self) -> Vec<LoadFailure> {
        self.failures.read().await.clone()
    }

    /// Languages with at least one catalogue.
    pub async fn languages(&self) -> BTreeSet<String> {
        self.catalogs
            .read()
            .await
            .values()
            .filter_map(|indexed| indexed.language.clone())
            .collect()
    }

    /// Translator over every catalogue of `language`, in path order.
    ///
    /// Language tags compare case-insensitively, with `-` and `_` equivalent.
    /// Returns `None` when no catalogue has that language.
    pub async fn translator(&self, language: &str, config: LookupConfig) -> Option<Translator> {
        let wanted = normalize_language_code(language);
        let catalogs: Vec<Arc<Catalog>> = self
            .catalogs
            .read()
            .await
            .values()
            .filter(|indexed| {
                indexed.language.as_deref().map(normalize_language_code).as_deref()
                    == Some(wanted.as_str())
            })
            .map(|indexed| Arc::clone(&indexed.catalog))
            .collect();

        if catalogs.is_empty() {
            tracing::debug!(language, "No catalogue for language");
            return None;
        }
        Some(Translator::new(Some(language.to_string()), catalogs, config))
    }

    /// インデックスを空にする
    pub async fn clear(&self) {
        self.catalogs.write().await.clear();
        self.failures.write().await.clear();
    }
}
