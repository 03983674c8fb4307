// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Optional features a provider declares to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Drives can be mounted with an inline credential
    Credentials,
    /// The provider expands wildcard paths itself
    ExpandWildcards,
}

impl Capability {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Credentials => "credentials",
            Capability::ExpandWildcards => "expand-wildcards",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "credentials" => Ok(Capability::Credentials),
            "expand-wildcards" | "expand_wildcards" => Ok(Capability::ExpandWildcards),
            _ => Err(format!("unknown capability '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [Capability],
}

impl ProviderInfo {
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

pub const DROPBOX: ProviderInfo = ProviderInfo {
    name: "Dropbox",
    description: "Dropbox account mounted as a navigable drive",
    capabilities: &[Capability::Credentials, Capability::ExpandWildcards],
};

static PROVIDERS: &[ProviderInfo] = &[DROPBOX];

/// Every registered provider
#[must_use]
pub fn providers() -> &'static [ProviderInfo] {
    PROVIDERS
}

/// Look up a registered provider, ignoring case
#[must_use]
pub fn provider_by_name(name: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Every registered provider declaring `capability`
pub fn providers_with(capability: Capability) -> impl Iterator<Item = &'static ProviderInfo> {
    PROVIDERS.iter().filter(move |p| p.supports(capability))
}
