//! Contracts, their per-network addresses, and event modules.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Network id assumed when an address declares none (Ethereum mainnet).
pub const DEFAULT_NETWORK: u64 = 1;

/// A contract declared by a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractInfo {
    /// Interface family (e.g. `erc721`).
    pub interface: String,
    /// Network id to ordered, de-duplicated, lower-cased addresses.
    pub addresses: FxHashMap<u64, Vec<String>>,
    /// Event modules declared inside this contract, by label.
    pub event_modules: FxHashMap<String, Arc<EventModule>>,
}

impl ContractInfo {
    /// Creates a contract with the given interface and no addresses.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Self::default()
        }
    }

    /// Adds an address for a network. Returns false if it was already present.
    pub fn add_address(&mut self, network: u64, address: &str) -> bool {
        let address = address.trim().to_lowercase();
        let list = self.addresses.entry(network).or_default();
        if list.contains(&address) {
            return false;
        }
        list.push(address);
        true
    }

    /// Returns the addresses for a network, in declaration order.
    pub fn addresses_for(&self, network: u64) -> &[String] {
        self.addresses.get(&network).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the declared network ids in ascending order.
    pub fn networks(&self) -> Vec<u64> {
        let mut networks: Vec<u64> = self.addresses.keys().copied().collect();
        networks.sort_unstable();
        networks
    }
}

/// An ordered list of event sources declared by a contract `module`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventModule {
    /// Label of the owning contract.
    pub contract: String,
    pub sequence: Vec<EventDefinition>,
}

/// An event source: which event to watch, how to filter it, what to select.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDefinition {
    /// Tag of the declaring element.
    pub element: String,
    pub name: Option<String>,
    pub event: Option<String>,
    /// Module named by `event`, if it was declared earlier in the document.
    pub module: Option<Arc<EventModule>>,
    pub filter: Option<String>,
    pub select: Option<String>,
}
