//! Simple inspector for TokenScript files.
//!
//! Usage: inspect_definition <file.xml> [locale] [token-id]

use std::fs;

use alloy_primitives::U256;
use tokenscript::{parse_definition_bytes, Locale, Origin, ParseOptions, TokenDefinition};

fn format_origin(origin: &Origin) -> String {
    match origin {
        Origin::TokenId(field) => format!("token-id mask=0x{:x} shift={}", field.mask, field.shift),
        Origin::Mapping { field, members } => {
            format!("mapping mask=0x{:x} shift={} members={}", field.mask, field.shift, members.len())
        }
        Origin::Function(function) => {
            let state = if function.is_resolved() { "" } else { " (unresolved)" };
            format!("call {}.{}(){}", function.contract_label, function.method, state)
        }
        Origin::Event(event) => format!("event {}", event.event.as_deref().unwrap_or("?")),
        Origin::UserEntry => "user-entry".to_string(),
        Origin::Unresolved => "none".to_string(),
    }
}

fn print_definition(definition: &TokenDefinition) {
    println!("\n=== Document ===");
    println!("Namespace: {}", definition.namespace().unwrap_or("(none)"));
    println!("Status: {}", definition.status().code());
    println!("Name: {}", definition.token_name(1).unwrap_or("(unnamed)"));
    println!("Signer: {}", definition.key_name().unwrap_or("(unsigned)"));
    let digest: String = definition.digest().iter().map(|b| format!("{:02x}", b)).collect();
    println!("SHA-256: {}", digest);

    println!("\n=== Contracts ===");
    let mut labels: Vec<_> = definition.contracts().keys().collect();
    labels.sort();
    for label in labels {
        let Some(contract) = definition.contract(label) else { continue };
        let holding = if definition.holding_token() == Some(label.as_str()) { " [holding]" } else { "" };
        println!("{} ({}){}", label, contract.interface, holding);
        for network in contract.networks() {
            for address in contract.addresses_for(network) {
                println!("  network {}: {}", network, address);
            }
        }
        for module in contract.event_modules.keys() {
            println!("  module {}", module);
        }
    }

    println!("\n=== Attributes ===");
    let mut attributes: Vec<_> = definition.attribute_types().values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    for attribute in attributes {
        println!(
            "{} \"{}\" {:?}/{:?}: {}",
            attribute.name,
            attribute.label,
            attribute.syntax,
            attribute.value_as,
            format_origin(&attribute.origin)
        );
    }

    println!("\n=== Actions ===");
    for action in definition.ordered_actions() {
        let label = action.label.as_deref().unwrap_or("(unlabeled)");
        let function = action
            .function
            .as_ref()
            .map(|f| format!(" -> {}.{}()", f.contract_label, f.method))
            .unwrap_or_default();
        println!("{}. {}{}", action.order, label, function);
        if action.has_exclusion() {
            println!("   excluded when: {}", action.exclude);
        }
    }

    println!("\n=== Views ===");
    let mut tags: Vec<_> = definition.views().views.keys().collect();
    tags.sort();
    for tag in tags {
        let content = definition.token_view(tag).unwrap_or_default();
        println!("{}: {} bytes", tag, content.len());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: inspect_definition <file.xml> [locale] [token-id]");
    let locale = args.next().unwrap_or_else(|| "en".to_string());
    let token_id = args.next();

    println!("Reading: {}", path);
    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let locale: Locale = locale.parse().expect("Invalid locale");
    let definition = parse_definition_bytes(&data, &ParseOptions::new(locale)).expect("Failed to parse");
    print_definition(&definition);

    if let Some(token_id) = token_id {
        let token_id: U256 = token_id.parse().expect("Invalid token id");
        println!("\n=== Token {:#x} ===", token_id);
        for attribute in definition.decode(token_id, None) {
            println!("{} ({}): {} [{:?}]", attribute.name, attribute.label, attribute.text, attribute.status);
        }
    }
}
