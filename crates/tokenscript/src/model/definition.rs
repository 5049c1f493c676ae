//! The parsed definition aggregate and its query surface.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::U256;
use rustc_hash::FxHashMap;

use crate::decode::{decode_attributes, DecodedAttribute, FunctionResults};
use crate::error::ParseStatus;
use crate::model::{
    Action, AttributeType, ContractInfo, EventModule, FunctionDefinition, TokenNames, ViewHolder,
};
use crate::parse::Locale;

/// The immutable model of one TokenScript document.
///
/// Built once by [`crate::parse_definition`]; all access afterwards is
/// read-only, so a definition can be shared across threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDefinition {
    pub(crate) namespace: Option<String>,
    pub(crate) status: ParseStatus,
    pub(crate) locale: Locale,
    pub(crate) holding_token: Option<String>,
    pub(crate) contracts: FxHashMap<String, Arc<ContractInfo>>,
    pub(crate) attribute_types: FxHashMap<String, AttributeType>,
    pub(crate) actions: FxHashMap<String, Action>,
    pub(crate) names: TokenNames,
    pub(crate) views: ViewHolder,
    pub(crate) event_modules: FxHashMap<String, Arc<EventModule>>,
    pub(crate) key_name: Option<String>,
    pub(crate) digest: [u8; 32],
}

impl TokenDefinition {
    /// Creates a definition with no content, as produced for documents in
    /// an unsupported format.
    pub(crate) fn empty(
        locale: Locale,
        namespace: Option<String>,
        status: ParseStatus,
        digest: [u8; 32],
    ) -> Self {
        Self {
            namespace,
            status,
            locale,
            holding_token: None,
            contracts: FxHashMap::default(),
            attribute_types: FxHashMap::default(),
            actions: FxHashMap::default(),
            names: TokenNames::new(),
            views: ViewHolder::default(),
            event_modules: FxHashMap::default(),
            key_name: None,
            digest,
        }
    }

    // =========================================================================
    // Document
    // =========================================================================

    /// Namespace the document was parsed under; `None` if version
    /// negotiation rejected it.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Result of schema version negotiation.
    pub fn status(&self) -> ParseStatus {
        self.status
    }

    /// Returns true if the document may be used.
    pub fn is_usable(&self) -> bool {
        self.namespace.is_some() && self.status.is_usable()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Name of the signing key (`ds:KeyName`), if the document carries one.
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    /// SHA-256 of the source document bytes.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    // =========================================================================
    // Contracts
    // =========================================================================

    /// Label of the contract that holds the tokens.
    pub fn holding_token(&self) -> Option<&str> {
        self.holding_token.as_deref()
    }

    /// Returns the holding contract, if it was declared.
    pub fn holding_contract(&self) -> Option<&ContractInfo> {
        self.holding_token.as_deref().and_then(|label| self.contract(label))
    }

    pub fn contract(&self, label: &str) -> Option<&ContractInfo> {
        self.contracts.get(label).map(Arc::as_ref)
    }

    pub fn contracts(&self) -> &FxHashMap<String, Arc<ContractInfo>> {
        &self.contracts
    }

    /// Returns a contract's addresses on one network.
    pub fn addresses(&self, label: &str, network: u64) -> Option<&[String]> {
        self.contracts
            .get(label)
            .and_then(|c| c.addresses.get(&network))
            .map(Vec::as_slice)
    }

    /// Looks up an event module by label across all contracts.
    pub fn event_module(&self, label: &str) -> Option<&EventModule> {
        self.event_modules.get(label).map(Arc::as_ref)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Global attribute types by name.
    pub fn attribute_types(&self) -> &FxHashMap<String, AttributeType> {
        &self.attribute_types
    }

    pub fn attribute_type(&self, name: &str) -> Option<&AttributeType> {
        self.attribute_types.get(name)
    }

    /// Functions behind every function-backed global attribute.
    pub fn function_definitions(&self) -> Vec<&FunctionDefinition> {
        self.attribute_types
            .values()
            .filter_map(AttributeType::function)
            .collect()
    }

    /// Enumeration table of a mapping attribute, keyed by raw field value.
    pub fn mapping_members(&self, name: &str) -> Option<&BTreeMap<U256, String>> {
        self.attribute_types.get(name).and_then(AttributeType::members)
    }

    /// Enumeration table of a mapping attribute, keyed by the value as it
    /// is stored inside a token id.
    pub fn converted_mapping_members(&self, name: &str) -> Option<BTreeMap<U256, String>> {
        self.attribute_types
            .get(name)
            .and_then(AttributeType::converted_members)
    }

    /// Decodes every global attribute for one token.
    pub fn decode(
        &self,
        token_id: U256,
        results: Option<&dyn FunctionResults>,
    ) -> Vec<DecodedAttribute> {
        decode_attributes(self, token_id, results)
    }

    // =========================================================================
    // Labels and views
    // =========================================================================

    /// Localized token name for `count` tokens.
    pub fn token_name(&self, count: u64) -> Option<&str> {
        self.names.for_count(count)
    }

    pub fn names(&self) -> &TokenNames {
        &self.names
    }

    pub fn has_token_view(&self) -> bool {
        !self.views.views.is_empty()
    }

    /// Content of a token card view (`view` or `item-view`).
    pub fn token_view(&self, tag: &str) -> Option<&str> {
        self.views.view(tag)
    }

    pub fn token_view_style(&self, tag: &str) -> Option<&str> {
        self.views.view_style(tag)
    }

    pub fn global_style(&self) -> Option<&str> {
        self.views.global_style.as_deref()
    }

    /// Attribute types scoped to the token card.
    pub fn token_view_local_attributes(&self) -> &FxHashMap<String, AttributeType> {
        &self.views.local_attribute_types
    }

    pub fn views(&self) -> &ViewHolder {
        &self.views
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Actions by label.
    pub fn actions(&self) -> &FxHashMap<String, Action> {
        &self.actions
    }

    pub fn action(&self, label: &str) -> Option<&Action> {
        self.actions.get(label)
    }

    /// Actions in document order.
    pub fn ordered_actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.values().collect();
        actions.sort_by_key(|a| a.order);
        actions
    }
}
