//! Data model types for TokenScript definitions.
//!
//! This module contains the parsed representation of a document:
//! - Contracts and event modules
//! - Attribute types and their origins
//! - Functions and transactions
//! - Cards (views, actions) and token names
//! - The [`TokenDefinition`] aggregate

pub mod action;
pub mod attribute;
pub mod contract;
pub mod definition;
pub mod function;
pub mod names;

pub use action::{Action, View, ViewHolder};
pub use attribute::{As, AttributeType, BitField, Origin, Syntax};
pub use contract::{ContractInfo, EventDefinition, EventModule, DEFAULT_NETWORK};
pub use definition::TokenDefinition;
pub use function::{FunctionDefinition, MethodArg, Reference, TransactionPayload};
pub use names::TokenNames;
