// ==========================================
// 工厂生产看板 - 产品参考表加载
// ==========================================
// 配置了文件路径时从 JSON 文件加载，否则使用内置表
// 文件格式: { "<代码>": {"pesoMassa":..,"pesoCaixa":..,"pesoAlvoPacote":..}, ... }
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::ProductCatalog;
use std::path::Path;

/// 加载产品参考表
pub fn load_product_catalog(path: Option<&Path>) -> ConfigResult<ProductCatalog> {
    let Some(path) = path else {
        let catalog = ProductCatalog::builtin();
        tracing::info!("使用内置产品参考表: {} 个产品", catalog.len());
        return Ok(catalog);
    };

    let to_error = |message: String| ConfigError::ProductCatalogError {
        path: path.display().to_string(),
        message,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
    let catalog: ProductCatalog = serde_json::from_str(&raw).map_err(|e| to_error(e.to_string()))?;

    if catalog.is_empty() {
        tracing::warn!(path = %path.display(), "产品参考表为空，所有产品均不会自动带出重量参数");
    } else {
        tracing::info!(path = %path.display(), "已加载产品参考表: {} 个产品", catalog.len());
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_path_uses_builtin() {
        let catalog = load_product_catalog(None).unwrap();
        assert_eq!(catalog, ProductCatalog::builtin());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"X1": {{"pesoMassa": 100.0, "pesoCaixa": 5.0, "pesoAlvoPacote": 500.0}}}}"#
        )
        .unwrap();

        let catalog = load_product_catalog(Some(file.path())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("X1").unwrap().box_weight_kg, 5.0);
        assert!(!catalog.contains("204"));
    }

    #[test]
    fn test_missing_or_malformed_file_is_error() {
        let missing = Path::new("/definitely/not/here/products.json");
        assert!(matches!(
            load_product_catalog(Some(missing)),
            Err(ConfigError::ProductCatalogError { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(load_product_catalog(Some(file.path())).is_err());
    }
}
