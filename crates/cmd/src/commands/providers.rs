// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use dropfs::{Capability, ProviderInfo, provider_by_name, providers, providers_with};

fn describe(provider: &ProviderInfo) -> String {
    let capabilities: Vec<&str> = provider.capabilities.iter().map(Capability::as_str).collect();
    format!(
        "{}: {} [{}]",
        provider.name,
        provider.description,
        capabilities.join(", ")
    )
}

/// Registered providers, by name or by declared capability
pub fn providers_command(name: Option<&str>, capability: Option<&str>) -> Result<Vec<String>> {
    let selected: Vec<&ProviderInfo> = match (name, capability) {
        (Some(name), _) => {
            let provider =
                provider_by_name(name).ok_or_else(|| anyhow!("No provider named '{name}'"))?;
            vec![provider]
        }
        (None, Some(capability)) => {
            let capability: Capability = capability.parse().map_err(|e: String| anyhow!(e))?;
            providers_with(capability).collect()
        }
        (None, None) => providers().iter().collect(),
    };
    Ok(selected.into_iter().map(describe).collect())
}
