// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Resources discovered by the post-teardown existence scan, grouped by
/// category. Read-only: surfaced for human verification, never acted upon.
#[derive(Debug, Clone, Default)]
pub struct ResourceInventory {
    pub clusters: Vec<String>,
    pub registries: Vec<String>,
    pub networks: Vec<String>,
}

impl ResourceInventory {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.registries.is_empty() && self.networks.is_empty()
    }

    pub fn total(&self) -> usize {
        self.clusters.len() + self.registries.len() + self.networks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inventory() {
        let inv = ResourceInventory::default();
        assert!(inv.is_empty());
        assert_eq!(inv.total(), 0);
    }

    #[test]
    fn test_counts_across_categories() {
        let inv = ResourceInventory {
            clusters: vec!["dev".to_string()],
            registries: vec!["dev-app".to_string(), "dev-web".to_string()],
            networks: Vec::new(),
        };
        assert!(!inv.is_empty());
        assert_eq!(inv.total(), 3);
    }
}
