//! Token cards, action cards and views.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::model::{Action, As, ContractInfo, Syntax, View};
use crate::parse::attribute::parse_attribute_type;
use crate::parse::context::ParseContext;
use crate::parse::contract::{parse_contract_as, parse_network};
use crate::parse::function::parse_function;
use crate::xml::{Element, Node};

const TOKEN_CARD: &str = "token card";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardKind {
    Token,
    Action,
    Other,
}

fn card_kind(element: &Element) -> CardKind {
    match element.local.as_str() {
        "card" => match element.attr("type") {
            Some("token") => CardKind::Token,
            Some("action") => CardKind::Action,
            _ => CardKind::Other,
        },
        "token" => CardKind::Token,
        "action" => CardKind::Action,
        _ => CardKind::Other,
    }
}

/// Returns true if the element is an action card.
pub(crate) fn is_action_card(element: &Element) -> bool {
    card_kind(element) == CardKind::Action
}

/// Parses the children of a `cards` element.
pub(crate) fn parse_cards(cards: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    for card in cards.elements() {
        if card.is_signature() {
            continue;
        }
        match card_kind(card) {
            CardKind::Token => parse_token_card(card, ctx)?,
            CardKind::Action => parse_action(card, ctx)?,
            CardKind::Other => debug!(tag = %card.local, "ignoring unknown card"),
        }
    }
    Ok(())
}

fn parse_token_card(card: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    let mut views: FxHashMap<&str, Vec<&Element>> = FxHashMap::default();

    for element in card.elements() {
        if element.is_signature() {
            continue;
        }
        match element.local.as_str() {
            "attribute-type" => {
                let attribute = parse_attribute_type(element, ctx)?;
                ctx.views
                    .local_attribute_types
                    .insert(attribute.name.clone(), attribute);
            }
            tag @ ("view" | "item-view") => views.entry(tag).or_default().push(element),
            "style" => ctx.views.global_style = Some(element.inner_markup()),
            "view-iconified" => {
                return Err(ParseError::DeprecatedFeature {
                    tag: element.local.clone(),
                    scope: TOKEN_CARD.to_string(),
                    replacement: "item-view",
                });
            }
            tag => {
                return Err(ParseError::SchemaViolation {
                    tag: tag.to_string(),
                    scope: TOKEN_CARD.to_string(),
                });
            }
        }
    }

    for (tag, candidates) in views {
        if let Some(view) = ctx.locale.select(candidates) {
            ctx.views.views.insert(tag.to_string(), parse_view(view));
        }
    }
    Ok(())
}

/// Parses an action card and stores it by label.
pub(crate) fn parse_action(card: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    // Resolved up front so errors below can name the action
    let label = ctx
        .locale
        .select(card.elements_named("label"))
        .and_then(|label| ctx.locale.label_text(label));
    let scope = format!("action '{}'", label.as_deref().unwrap_or_default());

    let mut action = Action {
        order: ctx.next_action_order(),
        action_type: card.attr("type").unwrap_or_default().to_string(),
        label: label.clone(),
        ..Action::default()
    };
    let mut views = Vec::new();

    for element in card.elements() {
        if element.is_signature() {
            continue;
        }
        match element.local.as_str() {
            "label" => {}
            "attribute-type" => {
                let attribute = parse_attribute_type(element, ctx)?;
                action.attribute_types.insert(attribute.name.clone(), attribute);
            }
            "transaction" => {
                let transaction = element.first_element().ok_or_else(|| ParseError::MissingElement {
                    parent: element.local.clone(),
                })?;
                if transaction.local == "transaction" {
                    let value_as = As::parse(transaction.attr("as").unwrap_or_default());
                    action.function =
                        Some(parse_function(transaction, ctx, Syntax::IA5String, value_as));
                } else {
                    debug!(tag = %transaction.local, "ignoring unsupported transaction kind");
                }
            }
            "exclude" => action.exclude = element.attr("selection").unwrap_or_default().to_string(),
            "view" => views.push(element),
            "style" => action.style = Some(element.inner_markup()),
            "input" => parse_input(element, ctx)?,
            "output" => debug!(scope = %scope, "action output is not modeled"),
            tag => {
                return Err(ParseError::SchemaViolation {
                    tag: tag.to_string(),
                    scope,
                });
            }
        }
    }

    action.view = ctx.locale.select(views).map(parse_view);

    let key = label.unwrap_or_default();
    if ctx.actions.contains_key(&key) {
        warn!(label = %key, "duplicate action label, keeping the last one");
    }
    ctx.actions.insert(key, action);
    Ok(())
}

/// Registers contracts supplied through `input/token` and makes the first
/// declared contract the holding token.
fn parse_input(input: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    for token in input.elements_named("token") {
        let label = token.attr("label").unwrap_or_default().to_string();
        let Some(source) = token.first_element() else {
            continue;
        };
        match source.local.as_str() {
            "ethereum" => {
                let network = parse_network(source)?;
                let mut info = ContractInfo::new("ethereum");
                if let Some(address) = source
                    .non_empty_attr("address")
                    .or_else(|| source.non_empty_attr("contract"))
                {
                    info.add_address(network, address);
                }
                ctx.register_contract(label, info);
            }
            "contract" => {
                let label = source
                    .non_empty_attr("label")
                    .map(str::to_string)
                    .unwrap_or(label);
                parse_contract_as(source, label, ctx)?;
            }
            other => debug!(tag = %other, "ignoring unknown input token source"),
        }
    }
    ctx.holding_token = ctx.contract_order.first().cloned();
    Ok(())
}

/// Builds a view record: nested `style` children become the view's style,
/// everything else its content.
fn parse_view(element: &Element) -> View {
    let mut view = View::default();
    for node in &element.children {
        match node {
            Node::Element(child) if child.local == "style" => {
                view.style
                    .get_or_insert_with(String::new)
                    .push_str(&child.inner_markup());
            }
            node => view.content.push_str(&node.markup()),
        }
    }
    view
}
