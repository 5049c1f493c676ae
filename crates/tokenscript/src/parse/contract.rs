//! Contracts, addresses and event modules.

use std::sync::Arc;

use crate::error::ParseError;
use crate::model::{ContractInfo, EventDefinition, EventModule, DEFAULT_NETWORK};
use crate::parse::context::ParseContext;
use crate::xml::Element;

/// Parses a `contract` element and registers it under its own label.
pub(crate) fn parse_contract(element: &Element, ctx: &mut ParseContext<'_>) -> Result<String, ParseError> {
    let label = element.attr("label").unwrap_or_default().to_string();
    parse_contract_as(element, label, ctx)
}

/// Parses a `contract` element and registers it under `label`.
pub(crate) fn parse_contract_as(
    element: &Element,
    label: String,
    ctx: &mut ParseContext<'_>,
) -> Result<String, ParseError> {
    let mut info = ContractInfo::new(element.attr("interface").unwrap_or_default());

    for child in element.elements() {
        match child.local.as_str() {
            "address" => {
                let network = parse_network(child)?;
                let address = child.text_content();
                if !address.trim().is_empty() {
                    info.add_address(network, &address);
                }
            }
            "module" => parse_module(child, &label, &mut info, ctx)?,
            _ => {}
        }
    }

    ctx.register_contract(label.clone(), info);
    Ok(label)
}

/// Reads the `network` attribute, defaulting to mainnet.
pub(crate) fn parse_network(element: &Element) -> Result<u64, ParseError> {
    match element.non_empty_attr("network") {
        Some(value) => value.trim().parse().map_err(|_| ParseError::InvalidNumber {
            field: "network",
            value: value.to_string(),
        }),
        None => Ok(DEFAULT_NETWORK),
    }
}

fn parse_module(
    element: &Element,
    contract: &str,
    info: &mut ContractInfo,
    ctx: &mut ParseContext<'_>,
) -> Result<(), ParseError> {
    let label = element
        .non_empty_attr("label")
        .ok_or_else(|| ParseError::MissingModuleLabel {
            contract: contract.to_string(),
        })?;
    if ctx.modules.contains_key(label) {
        return Err(ParseError::DuplicateModuleLabel {
            label: label.to_string(),
        });
    }

    let sequence = element
        .elements_named("sequence")
        .next()
        .map(|sequence| sequence.elements().map(|e| parse_event(e, ctx)).collect())
        .unwrap_or_default();

    let module = Arc::new(EventModule {
        contract: contract.to_string(),
        sequence,
    });
    info.event_modules.insert(label.to_string(), Arc::clone(&module));
    ctx.modules.insert(label.to_string(), module);
    Ok(())
}

/// Builds an event definition, resolving `event` against modules declared
/// so far.
pub(crate) fn parse_event(element: &Element, ctx: &ParseContext<'_>) -> EventDefinition {
    let owned = |name: &str| element.non_empty_attr(name).map(str::to_string);
    let event = owned("event");
    let module = event.as_deref().and_then(|label| ctx.modules.get(label).cloned());
    EventDefinition {
        element: element.local.clone(),
        name: owned("name"),
        event,
        module,
        filter: owned("filter"),
        select: owned("select"),
    }
}
