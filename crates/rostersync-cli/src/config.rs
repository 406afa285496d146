//! Runtime configuration assembled from command-line options.

use std::fs;
use std::time::Duration;

use rostersync::{
    DataTable, FieldMapping, FieldType, RestIdentityStore, RestStoreConfig, RosterSync, SyncError,
};

use crate::cli::{MappingArgs, StoreArgs};

/// HTTP service settings.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Allowed origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// Whether execute requests may write to the store.
    pub allow_execute: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 16 * 1024 * 1024,
            allow_execute: false,
        }
    }
}

impl ServeConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o.trim() == "*")
    }
}

impl StoreArgs {
    /// REST store configuration, if a store URL was given.
    pub fn rest_config(&self) -> Option<RestStoreConfig> {
        let url = self.store_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        let mut config =
            RestStoreConfig::new(url).with_timeout(Duration::from_secs(self.store_timeout_secs));
        if let Some(token) = &self.store_token {
            config = config.with_token(token.clone());
        }
        Some(config)
    }

    /// Connect to the configured store, if any.
    pub fn build_store(&self) -> rostersync::Result<Option<RestIdentityStore>> {
        self.rest_config().map(RestIdentityStore::new).transpose()
    }
}

impl MappingArgs {
    /// Mapping from `--mapping` (or auto-detection), with per-field
    /// overrides applied on top.
    pub fn resolve(&self, sync: &RosterSync, table: &DataTable) -> rostersync::Result<FieldMapping> {
        let mut mapping = match &self.mapping {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| SyncError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                serde_json::from_str(&text)?
            }
            None => sync.detect_mapping(table),
        };

        let overrides = [
            (FieldType::Name, &self.name),
            (FieldType::Email, &self.email),
            (FieldType::Position, &self.position),
            (FieldType::Department, &self.department),
        ];
        for (field, column) in overrides {
            if let Some(column) = column {
                mapping.set(field, column.clone());
            }
        }

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostersync::ColumnRef;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table() -> DataTable {
        DataTable::from_strings(
            &["名前", "メール", "役職"],
            &[vec!["田中 太郎", "tanaka@example.com", "部長"]],
        )
    }

    #[test]
    fn test_overrides_apply_on_auto_detection() {
        let args = MappingArgs {
            position: Some(ColumnRef::Absent),
            ..Default::default()
        };
        let mapping = args.resolve(&RosterSync::new(), &table()).unwrap();

        assert_eq!(mapping.email, ColumnRef::Single(1));
        assert_eq!(mapping.position, ColumnRef::Absent);
    }

    #[test]
    fn test_mapping_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"name": [0], "email": 1}"#).unwrap();

        let args = MappingArgs {
            mapping: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let mapping = args.resolve(&RosterSync::new(), &table()).unwrap();

        assert_eq!(mapping.name, ColumnRef::Composite(vec![0]));
        assert_eq!(mapping.position, ColumnRef::Absent);
    }

    #[test]
    fn test_store_requires_url() {
        let args = StoreArgs {
            store_url: None,
            store_token: Some("secret".into()),
            store_timeout_secs: 5,
        };
        assert!(args.build_store().unwrap().is_none());

        let args = StoreArgs {
            store_url: Some("https://idp.example.com".into()),
            ..args
        };
        assert!(args.build_store().unwrap().is_some());
    }

    #[test]
    fn test_any_origin() {
        assert!(ServeConfig::default().allows_any_origin());
        let config = ServeConfig {
            cors_origins: vec!["http://localhost:5173".into()],
            ..Default::default()
        };
        assert!(!config.allows_any_origin());
    }
}
