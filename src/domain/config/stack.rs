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

//! Stack settings loaded from `ekstack.toml` and forwarded to Terraform
//! as `-var` arguments.

use crate::shared::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConf {
    pub region: String,
    pub cluster_name: String,
    pub cluster_version: String,
    pub registries: Vec<String>,
    pub nodes: NodeGroupConf,
    pub network: NetworkConf,
    pub features: FeatureConf,
}

impl Default for StackConf {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            cluster_name: "ekstack-dev".to_string(),
            cluster_version: "1.31".to_string(),
            registries: vec!["app".to_string()],
            nodes: NodeGroupConf::default(),
            network: NetworkConf::default(),
            features: FeatureConf::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGroupConf {
    pub instance_types: Vec<String>,
    pub min_size: u32,
    pub max_size: u32,
    pub desired_size: u32,
}

impl Default for NodeGroupConf {
    fn default() -> Self {
        Self {
            instance_types: vec!["t3.medium".to_string()],
            min_size: 1,
            max_size: 4,
            desired_size: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConf {
    pub vpc_cidr: String,
    pub availability_zones: Vec<String>,
    pub private_subnets: Vec<String>,
    pub public_subnets: Vec<String>,
    pub single_nat_gateway: bool,
}

impl Default for NetworkConf {
    fn default() -> Self {
        Self {
            vpc_cidr: "10.0.0.0/16".to_string(),
            availability_zones: Vec::new(),
            private_subnets: vec![
                "10.0.1.0/24".to_string(),
                "10.0.2.0/24".to_string(),
                "10.0.3.0/24".to_string(),
            ],
            public_subnets: vec![
                "10.0.101.0/24".to_string(),
                "10.0.102.0/24".to_string(),
                "10.0.103.0/24".to_string(),
            ],
            single_nat_gateway: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FeatureConf {
    pub container_insights: bool,
    pub workload_identity: bool,
}

impl StackConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> anyhow::Result<Self> {
        let content = read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.as_ref(), e))?;

        let conf: Self =
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;

        Ok(conf)
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(StackError::config_error("region must not be empty"));
        }

        if !is_valid_cluster_name(&self.cluster_name) {
            return Err(StackError::ConfigError(format!(
                "Invalid cluster_name: {}",
                self.cluster_name
            )));
        }

        if self.cluster_name.len() > 100 {
            return Err(StackError::ConfigError(format!(
                "cluster_name too long (max 100 chars): {}",
                self.cluster_name
            )));
        }

        if self.nodes.min_size > self.nodes.max_size {
            return Err(StackError::config_error(
                "nodes.min_size must not exceed nodes.max_size",
            ));
        }

        if self.nodes.desired_size < self.nodes.min_size
            || self.nodes.desired_size > self.nodes.max_size
        {
            return Err(StackError::config_error(
                "nodes.desired_size must be between nodes.min_size and nodes.max_size",
            ));
        }

        if self.nodes.instance_types.is_empty() {
            return Err(StackError::config_error(
                "nodes.instance_types must not be empty",
            ));
        }

        if !is_valid_cidr(&self.network.vpc_cidr) {
            return Err(StackError::ConfigError(format!(
                "Invalid network.vpc_cidr: {}",
                self.network.vpc_cidr
            )));
        }

        for cidr in self
            .network
            .private_subnets
            .iter()
            .chain(self.network.public_subnets.iter())
        {
            if !is_valid_cidr(cidr) {
                return Err(StackError::ConfigError(format!(
                    "Invalid subnet CIDR: {}",
                    cidr
                )));
            }
        }

        for name in &self.registries {
            if name.is_empty() {
                return Err(StackError::config_error(
                    "registries must not contain empty names",
                ));
            }
        }

        Ok(())
    }

    /// Render the settings as `-var` arguments for terraform plan/destroy.
    /// List values use JSON syntax, which terraform accepts for HCL lists.
    pub fn var_args(&self) -> Result<Vec<String>> {
        let mut args = Vec::new();
        let mut push = |key: &str, value: String| {
            args.push("-var".to_string());
            args.push(format!("{}={}", key, value));
        };

        push("region", self.region.clone());
        push("cluster_name", self.cluster_name.clone());
        push("cluster_version", self.cluster_version.clone());
        push(
            "node_instance_types",
            serde_json::to_string(&self.nodes.instance_types)?,
        );
        push("node_min_size", self.nodes.min_size.to_string());
        push("node_max_size", self.nodes.max_size.to_string());
        push("node_desired_size", self.nodes.desired_size.to_string());
        push("vpc_cidr", self.network.vpc_cidr.clone());
        if !self.network.availability_zones.is_empty() {
            push(
                "availability_zones",
                serde_json::to_string(&self.network.availability_zones)?,
            );
        }
        push(
            "private_subnets",
            serde_json::to_string(&self.network.private_subnets)?,
        );
        push(
            "public_subnets",
            serde_json::to_string(&self.network.public_subnets)?,
        );
        push(
            "single_nat_gateway",
            self.network.single_nat_gateway.to_string(),
        );
        push(
            "enable_container_insights",
            self.features.container_insights.to_string(),
        );
        push(
            "enable_irsa",
            self.features.workload_identity.to_string(),
        );
        push("ecr_repositories", serde_json::to_string(&self.registries)?);

        Ok(args)
    }
}

pub(crate) fn is_valid_cluster_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    if !name.chars().next().unwrap_or(' ').is_ascii_alphabetic() {
        return false;
    }
    if !name.chars().last().unwrap_or(' ').is_alphanumeric() {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_cidr(cidr: &str) -> bool {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    if prefix > 32 {
        return false;
    }
    addr.parse::<std::net::Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conf_is_valid() {
        let conf = StackConf::default();
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let conf: StackConf = toml::from_str(
            r#"
            region = "eu-central-1"
            cluster_name = "payments"
            cluster_version = "1.30"
            registries = ["api", "worker"]

            [nodes]
            instance_types = ["m5.large"]
            min_size = 2
            max_size = 6
            desired_size = 3

            [network]
            vpc_cidr = "172.16.0.0/16"
            single_nat_gateway = false

            [features]
            container_insights = true
            "#,
        )
        .unwrap();

        assert_eq!(conf.region, "eu-central-1");
        assert_eq!(conf.cluster_name, "payments");
        assert_eq!(conf.registries, vec!["api", "worker"]);
        assert_eq!(conf.nodes.desired_size, 3);
        assert!(!conf.network.single_nat_gateway);
        assert!(conf.features.container_insights);
        assert!(!conf.features.workload_identity);
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_capacity() {
        let mut conf = StackConf::default();
        conf.nodes.min_size = 5;
        conf.nodes.max_size = 3;
        assert!(conf.validate().is_err());

        let mut conf = StackConf::default();
        conf.nodes.desired_size = 10;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_cidr() {
        let mut conf = StackConf::default();
        conf.network.vpc_cidr = "10.0.0.0".to_string();
        assert!(conf.validate().is_err());

        conf.network.vpc_cidr = "10.0.0.0/40".to_string();
        assert!(conf.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_cluster_name() {
        let mut conf = StackConf::default();
        conf.cluster_name = "9starts-with-digit".to_string();
        assert!(conf.validate().is_err());

        conf.cluster_name = "has_underscore".to_string();
        assert!(conf.validate().is_err());
    }

    #[test]
    fn test_var_args_cover_settings() {
        let conf = StackConf::default();
        let args = conf.var_args().unwrap();

        let joined = args.join(" ");
        assert!(joined.contains("region=us-west-2"));
        assert!(joined.contains("cluster_name=ekstack-dev"));
        assert!(joined.contains(r#"node_instance_types=["t3.medium"]"#));
        assert!(joined.contains("single_nat_gateway=true"));
        assert!(joined.contains(r#"ecr_repositories=["app"]"#));
        // Empty AZ list is omitted so terraform can derive zones itself.
        assert!(!joined.contains("availability_zones"));
    }
}
