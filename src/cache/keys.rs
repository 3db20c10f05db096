use std::fmt;

use serde::Serialize;

/// Logical name of a process-wide cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheName {
    Navigation,
    AllProducts,
}

impl CacheName {
    pub const ALL: [CacheName; 2] = [CacheName::Navigation, CacheName::AllProducts];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheName::Navigation => "navigation",
            CacheName::AllProducts => "all-products",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
