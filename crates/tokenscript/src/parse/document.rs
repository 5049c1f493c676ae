//! Top-level document structure: origins, contracts, labels, attribute
//! types and cards.

use tracing::debug;

use crate::error::ParseError;
use crate::parse::attribute::register_global;
use crate::parse::card::{is_action_card, parse_action, parse_cards};
use crate::parse::context::ParseContext;
use crate::parse::contract::parse_contract;
use crate::xml::{Document, Element};
use crate::XMLDSIG_NAMESPACE;

/// Walks the root element. A root that is itself an action card is parsed
/// as an action-only document.
pub(crate) fn parse_root(root: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    if is_action_card(root) {
        return parse_action(root, ctx);
    }

    for element in root.elements() {
        if element.is_signature() {
            continue;
        }
        match element.local.as_str() {
            "origins" => parse_origins(element, ctx),
            "contract" => {
                parse_contract(element, ctx)?;
            }
            "label" => parse_label(element, ctx),
            "attribute-types" => {
                for attribute in element.elements_named("attribute-type") {
                    register_global(attribute, ctx)?;
                }
            }
            "attribute-type" => register_global(element, ctx)?,
            "cards" => parse_cards(element, ctx)?,
            other => debug!(tag = %other, "ignoring top-level element"),
        }
    }
    Ok(())
}

/// `origins/ethereum[@contract]` names the holding contract.
fn parse_origins(origins: &Element, ctx: &mut ParseContext<'_>) {
    for origin in origins.elements_named("ethereum") {
        if let Some(contract) = origin.non_empty_attr("contract") {
            ctx.holding_token = Some(contract.to_string());
        }
    }
}

/// Stores the token names from a `label` element, one per plural quantity.
fn parse_label(label: &Element, ctx: &mut ParseContext<'_>) {
    if let Some(plurals) = ctx.locale.select(label.elements_named("plurals")) {
        for string in plurals.elements_named("string") {
            let quantity = string.attr("quantity").unwrap_or_default();
            ctx.names.insert(quantity, string.text_content().trim());
        }
    } else if let Some(string) = ctx.locale.select(label.elements_named("string")) {
        let quantity = string.attr("quantity").unwrap_or_default();
        ctx.names.insert(quantity, string.text_content().trim());
    } else if let Some(text) = ctx.locale.label_text(label) {
        ctx.names.insert("", text);
    }
}

/// Returns true if any element named `token` is bound to `namespace`.
pub(crate) fn has_token_element(document: &Document, namespace: &str) -> bool {
    document
        .elements()
        .any(|e| e.local == "token" && e.namespace.as_deref() == Some(namespace))
}

/// Returns the signer key name (`ds:KeyName`), if present.
pub(crate) fn find_key_name(document: &Document) -> Option<String> {
    document
        .elements()
        .find(|e| e.local == "KeyName" && e.namespace.as_deref() == Some(XMLDSIG_NAMESPACE))
        .map(|e| e.text_content().trim().to_string())
        .filter(|name| !name.is_empty())
}
