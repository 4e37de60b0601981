//! IBC 路径支持表

use std::collections::HashMap;

use crate::domain::{ChainKey, ChainPair, RouteSupport};

pub trait RouteSupportTable: Send + Sync {
    /// 未登记的路径视为不支持
    fn supports(&self, source: &ChainKey, destination: &ChainKey) -> RouteSupport;

    /// 为转账上下文生成 源链 → 各目标链 的快照
    fn snapshot_for(
        &self,
        source: &ChainKey,
        destinations: &[ChainKey],
    ) -> HashMap<ChainPair, RouteSupport> {
        destinations
            .iter()
            .filter(|dest| *dest != source)
            .map(|dest| {
                (
                    ChainPair::new(source.clone(), dest.clone()),
                    self.supports(source, dest),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRouteSupportTable {
    routes: HashMap<ChainPair, RouteSupport>,
}

impl InMemoryRouteSupportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: &str, destination: &str, support: RouteSupport) {
        self.routes
            .insert(ChainPair::new(source, destination), support);
    }

    /// 双向登记
    pub fn insert_bidirectional(&mut self, a: &str, b: &str, support: RouteSupport) {
        self.insert(a, b, support);
        self.insert(b, a, support);
    }
}

impl RouteSupportTable for InMemoryRouteSupportTable {
    fn supports(&self, source: &ChainKey, destination: &ChainKey) -> RouteSupport {
        self.routes
            .get(&ChainPair::new(source.clone(), destination.clone()))
            .copied()
            .unwrap_or_default()
    }
}
