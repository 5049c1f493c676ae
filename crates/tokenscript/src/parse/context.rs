//! Mutable state for one parse, frozen into a [`TokenDefinition`] at the end.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ParseStatus;
use crate::model::{
    Action, AttributeType, ContractInfo, EventModule, TokenDefinition, TokenNames, ViewHolder,
};
use crate::parse::Locale;

/// Everything accumulated while walking a document.
#[derive(Debug)]
pub(crate) struct ParseContext<'a> {
    pub locale: &'a Locale,
    pub contracts: FxHashMap<String, Arc<ContractInfo>>,
    /// Contract labels in declaration order.
    pub contract_order: Vec<String>,
    /// Event modules by label, across all contracts.
    pub modules: FxHashMap<String, Arc<EventModule>>,
    pub attribute_types: FxHashMap<String, AttributeType>,
    pub actions: FxHashMap<String, Action>,
    action_count: usize,
    pub names: TokenNames,
    pub views: ViewHolder,
    pub holding_token: Option<String>,
}

impl<'a> ParseContext<'a> {
    pub fn new(locale: &'a Locale) -> Self {
        Self {
            locale,
            contracts: FxHashMap::default(),
            contract_order: Vec::new(),
            modules: FxHashMap::default(),
            attribute_types: FxHashMap::default(),
            actions: FxHashMap::default(),
            action_count: 0,
            names: TokenNames::new(),
            views: ViewHolder::default(),
            holding_token: None,
        }
    }

    /// Registers a contract under its label. A redeclared label replaces
    /// the earlier contract but keeps its original position.
    pub fn register_contract(&mut self, label: String, contract: ContractInfo) {
        if !self.contracts.contains_key(&label) {
            self.contract_order.push(label.clone());
        }
        self.contracts.insert(label, Arc::new(contract));
    }

    /// Returns the next action order index.
    pub fn next_action_order(&mut self) -> usize {
        let order = self.action_count;
        self.action_count += 1;
        order
    }

    pub fn finish(
        self,
        namespace: Option<String>,
        status: ParseStatus,
        key_name: Option<String>,
        digest: [u8; 32],
    ) -> TokenDefinition {
        TokenDefinition {
            namespace,
            status,
            locale: self.locale.clone(),
            holding_token: self.holding_token,
            contracts: self.contracts,
            attribute_types: self.attribute_types,
            actions: self.actions,
            names: self.names,
            views: self.views,
            event_modules: self.modules,
            key_name,
            digest,
        }
    }
}
