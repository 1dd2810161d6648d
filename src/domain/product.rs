// ==========================================
// 工厂生产看板 - 产品参考表
// ==========================================
// 产品代码 -> 重量参数（面团重量/箱重/包装目标重量）
// 运行期只读；可由配置文件注入，未配置时使用内置表
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 产品重量参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// 单批面团重量 (kg)
    #[serde(rename = "pesoMassa")]
    pub mass_weight_kg: f64,
    /// 单箱重量 (kg)
    #[serde(rename = "pesoCaixa")]
    pub box_weight_kg: f64,
    /// 包装目标重量 (g)
    #[serde(rename = "pesoAlvoPacote")]
    pub target_package_weight_g: f64,
}

impl ProductSpec {
    pub const fn new(mass_weight_kg: f64, box_weight_kg: f64, target_package_weight_g: f64) -> Self {
        Self {
            mass_weight_kg,
            box_weight_kg,
            target_package_weight_g,
        }
    }
}

/// 工厂现行产品表
const BUILTIN_PRODUCTS: &[(&str, ProductSpec)] = &[
    ("204", ProductSpec::new(491.70, 12.00, 1000.0)),
    ("208", ProductSpec::new(491.70, 12.00, 1000.0)),
    ("901", ProductSpec::new(599.00, 10.00, 1000.0)),
    ("69901", ProductSpec::new(303.70, 12.00, 1000.0)),
    ("70974", ProductSpec::new(491.70, 12.00, 300.0)),
    ("72169", ProductSpec::new(511.00, 12.00, 1000.0)),
    ("72170", ProductSpec::new(511.00, 12.00, 1000.0)),
    ("73399", ProductSpec::new(539.50, 12.00, 400.0)),
    ("73400", ProductSpec::new(539.50, 12.00, 400.0)),
    ("73402", ProductSpec::new(539.50, 12.00, 1000.0)),
    ("76303", ProductSpec::new(515.50, 12.00, 1000.0)),
    ("76304", ProductSpec::new(515.50, 12.00, 1000.0)),
    ("76378", ProductSpec::new(599.00, 12.00, 800.0)),
    ("76379", ProductSpec::new(599.00, 12.00, 800.0)),
    ("76678", ProductSpec::new(515.50, 9.60, 300.0)),
    ("76679", ProductSpec::new(515.50, 9.60, 800.0)),
    ("76792", ProductSpec::new(599.06, 10.00, 1000.0)),
    ("74231", ProductSpec::new(526.00, 6.00, 1000.0)),
];

/// 产品参考表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductSpec>,
}

impl ProductCatalog {
    pub fn new(products: BTreeMap<String, ProductSpec>) -> Self {
        Self { products }
    }

    /// 内置产品表
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PRODUCTS
                .iter()
                .map(|(code, spec)| (code.to_string(), *spec))
                .collect(),
        )
    }

    /// 按产品代码精确查询
    pub fn get(&self, code: &str) -> Option<&ProductSpec> {
        self.products.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
