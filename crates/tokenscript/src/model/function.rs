//! Contract method calls and transactions declared by a document.

use std::sync::Arc;

use crate::model::{As, ContractInfo, Syntax};

/// A value reference inside a call or transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    /// `ref` attribute: name of another attribute.
    pub xml_ref: Option<String>,
    /// Literal text content.
    pub value: Option<String>,
    /// `local-ref` attribute: name of an action-local attribute.
    pub local_ref: Option<String>,
}

/// One typed method parameter; the type is the element tag (e.g. `uint256`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArg {
    pub parameter_type: String,
    pub element: Reference,
}

/// Target and value slots of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPayload {
    pub to: Option<Reference>,
    pub value: Option<Reference>,
}

/// A contract method call, used by function-backed attributes and actions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// Contract label as written in the document.
    pub contract_label: String,
    /// The contract, if the label was declared before this call.
    pub contract: Option<Arc<ContractInfo>>,
    pub method: String,
    pub syntax: Syntax,
    pub value_as: As,
    pub parameters: Vec<MethodArg>,
    pub transaction: Option<TransactionPayload>,
}

impl FunctionDefinition {
    /// Returns true if the owning contract was resolved at parse time.
    pub fn is_resolved(&self) -> bool {
        self.contract.is_some()
    }
}
