//! End-to-end parsing and decoding of complete TokenScript documents.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use tokenscript::{
    decode_attributes, parse_definition, parse_definition_bytes, parse_definition_for_language,
    As, DecodeFault, DecodeStatus, FunctionResults, Locale, Origin, ParseError, ParseOptions,
    ParseStatus, Syntax, TokenDefinition, UNSUPPORTED_ENCODING,
};

const TICKET: &str = include_str!("fixtures/ticket.xml");

fn parse(xml: &str, language: &str) -> Result<TokenDefinition, ParseError> {
    parse_definition_for_language(xml, language)
}

fn ticket(language: &str) -> TokenDefinition {
    parse(TICKET, language).unwrap()
}

fn ticket_id(locality: u64, numero: u64, time: u64) -> U256 {
    (U256::from(locality) << 120usize) | (U256::from(time) << 80usize) | U256::from(numero)
}

fn wrap(body: &str) -> String {
    format!(
        r#"<ts:token xmlns:ts="http://tokenscript.org/2020/06/tokenscript">{}</ts:token>"#,
        body
    )
}

// =============================================================================
// Document
// =============================================================================

#[test]
fn test_ticket_document() {
    let definition = ticket("en");
    assert_eq!(definition.status(), ParseStatus::Ok);
    assert!(definition.is_usable());
    assert_eq!(definition.namespace(), Some(tokenscript::TOKENSCRIPT_NAMESPACE));
    assert_eq!(definition.key_name(), Some("tickets.example.com"));
    assert_eq!(definition.locale().language(), "en");
}

#[test]
fn test_contracts_and_holding_token() {
    let definition = ticket("en");
    assert_eq!(definition.holding_token(), Some("EntryToken"));

    let holding = definition.holding_contract().unwrap();
    assert_eq!(holding.interface, "erc875");
    assert_eq!(
        definition.addresses("EntryToken", 1),
        Some(&["0xa66a3f08068174e8f005112a8b2c7a507a822335".to_string()][..])
    );
    assert_eq!(holding.addresses_for(3).len(), 1);
    assert_eq!(definition.addresses("EntryToken", 42), None);
    assert_eq!(definition.contracts().len(), 2);
}

#[test]
fn test_event_modules() {
    let definition = ticket("en");
    let module = definition.event_module("NewOwner").unwrap();
    assert_eq!(module.contract, "ENS");
    assert_eq!(module.sequence.len(), 1);
    assert_eq!(module.sequence[0].name.as_deref(), Some("node"));
    assert!(definition.contract("ENS").unwrap().event_modules.contains_key("NewOwner"));
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_global_attribute_registry() {
    let definition = ticket("en");
    let mut names: Vec<_> = definition.attribute_types().keys().cloned().collect();
    names.sort();
    // `owner` has neither a bitmask nor a function
    assert_eq!(names, vec!["expired", "locality", "numero", "time"]);

    let locality = definition.attribute_type("locality").unwrap();
    assert_eq!(locality.label, "City");
    assert_eq!(locality.value_as, As::Mapping);
    assert_eq!(locality.bit_field().unwrap().shift, 120);

    let functions = definition.function_definitions();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].method, "isExpired");
    assert!(functions[0].is_resolved());
    assert_eq!(functions[0].value_as, As::Boolean);
}

#[test]
fn test_mapping_symmetry() {
    let definition = ticket("en");
    let raw = definition.mapping_members("locality").unwrap();
    let converted = definition.converted_mapping_members("locality").unwrap();
    assert_eq!(raw.len(), converted.len());

    for ((key, name), (stored, stored_name)) in raw.iter().zip(converted.iter()) {
        assert_eq!(name, stored_name);
        assert_eq!(*stored, *key << 120usize);
        let decoded = decode_attributes(&definition, *stored, None);
        let locality = decoded.iter().find(|d| d.name == "locality").unwrap();
        assert_eq!(locality.value, *key);
        assert_eq!(&locality.text, name);
    }
}

#[test]
fn test_card_local_attributes() {
    let definition = ticket("en");
    let venue = &definition.token_view_local_attributes()["venue"];
    assert_eq!(venue.origin, Origin::UserEntry);

    let redeem = definition.action("Redeem").unwrap();
    let code = &redeem.attribute_types["code"];
    assert_eq!(code.value_as, As::E18);
}

// =============================================================================
// Labels and views
// =============================================================================

#[test]
fn test_plural_names() {
    let en = ticket("en");
    assert_eq!(en.token_name(1), Some("Ticket"));
    assert_eq!(en.token_name(2), Some("Tickets"));
    assert_eq!(en.token_name(10), Some("Tickets"));

    let es = ticket("es");
    assert_eq!(es.token_name(1), Some("Boleto"));
    assert_eq!(es.token_name(0), Some("Boletos"));
}

#[test]
fn test_localization_fallback() {
    let xml = wrap(
        r#"<ts:label><ts:string xml:lang="fr">Toto</ts:string><ts:string xml:lang="en">Foo</ts:string></ts:label>"#,
    );
    assert_eq!(parse(&xml, "fr").unwrap().token_name(1), Some("Toto"));
    assert_eq!(parse(&xml, "de").unwrap().token_name(1), Some("Foo"));

    let es = ticket("es");
    assert_eq!(es.attribute_type("locality").unwrap().label, "Ciudad");
    // No Spanish entry: falls back to the untagged/English one
    assert_eq!(es.attribute_type("numero").unwrap().label, "Number");
}

#[test]
fn test_views() {
    let en = ticket("en");
    assert!(en.has_token_view());
    assert_eq!(en.global_style(), Some(".ticket { font-weight: bold }"));
    assert_eq!(en.token_view_style("view"), Some("h3 { color: blue }"));
    let view = en.token_view("view").unwrap();
    assert_eq!(view.trim(), "<h3>Admission</h3>");
    assert!(!view.contains("iframe"));
    assert_eq!(en.token_view("item-view"), Some(r#"<div class="ticket">Ticket</div>"#));

    let es = ticket("es");
    assert_eq!(es.token_view("view"), Some("<h3>Admisión</h3>"));
    assert_eq!(es.token_view_style("view"), None);
}

#[test]
fn test_declared_entities_in_label_and_view() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE token [
  <!ENTITY brand "Acme">
  <!ENTITY style "color: red">
]>
<ts:token xmlns:ts="http://tokenscript.org/2020/06/tokenscript">
  <ts:label><ts:string>&brand; Pass</ts:string></ts:label>
  <ts:cards>
    <ts:card type="token">
      <ts:view><ts:style>p { &style; }</ts:style><p class="&brand;">&brand; &amp; friends</p></ts:view>
    </ts:card>
  </ts:cards>
</ts:token>"#;

    let definition = parse(xml, "en").unwrap();
    assert_eq!(definition.token_name(1), Some("Acme Pass"));
    assert_eq!(definition.token_view_style("view"), Some("p { color: red }"));
    assert_eq!(
        definition.token_view("view"),
        Some(r#"<p class="Acme">Acme &amp; friends</p>"#)
    );
}

// =============================================================================
// Actions
// =============================================================================

#[test]
fn test_actions() {
    let definition = ticket("en");
    let ordered: Vec<_> = definition
        .ordered_actions()
        .iter()
        .map(|a| a.label.clone().unwrap_or_default())
        .collect();
    assert_eq!(ordered, vec!["Enter", "Redeem"]);

    let enter = definition.action("Enter").unwrap();
    assert_eq!(enter.order, 0);
    assert_eq!(enter.exclude, "expired");
    assert!(enter.function.is_none());
    assert_eq!(
        enter.view.as_ref().map(|v| v.content.as_str()),
        Some("<p>Show this at the door</p>")
    );

    let redeem = definition.action("Redeem").unwrap();
    let function = redeem.function.as_ref().unwrap();
    assert_eq!(function.syntax, Syntax::IA5String);
    assert_eq!(function.value_as, As::Unsigned);
    assert_eq!(function.contract.as_ref().map(|c| c.interface.as_str()), Some("erc875"));
    assert_eq!(function.parameters.len(), 2);
    assert_eq!(function.parameters[1].element.local_ref.as_deref(), Some("code"));
    assert_eq!(
        function.transaction.as_ref().and_then(|t| t.value.as_ref()).and_then(|v| v.value.as_deref()),
        Some("0")
    );
}

#[test]
fn test_action_labels_localized() {
    let es = ticket("es");
    assert!(es.action("Entrar").is_some());
    assert!(es.action("Enter").is_none());
    // The English-only view is still chosen
    assert!(es.action("Entrar").unwrap().view.is_some());
}

#[test]
fn test_action_only_document() {
    let xml = r#"<ts:card xmlns:ts="http://tokenscript.org/2020/06/tokenscript" type="action">
        <ts:label><ts:string>Approve</ts:string></ts:label>
        <ts:input>
          <ts:token label="Dai"><ts:ethereum network="1" address="0x6B175474E89094C44Da98b954EedeAC495271d0F"/></ts:token>
        </ts:input>
      </ts:card>"#;
    let definition = parse(xml, "en").unwrap();
    assert_eq!(definition.holding_token(), Some("Dai"));
    assert_eq!(
        definition.addresses("Dai", 1),
        Some(&["0x6b175474e89094c44da98b954eedeac495271d0f".to_string()][..])
    );
    assert_eq!(definition.action("Approve").unwrap().order, 0);
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_decode_ticket() {
    let definition = ticket("en");
    let decoded = definition.decode(ticket_id(2, 258, 1_710_460_800), None);
    let names: Vec<_> = decoded.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["expired", "locality", "numero", "time"]);

    assert_eq!(decoded[0].status, DecodeStatus::Deferred);
    assert_eq!(decoded[0].text, UNSUPPORTED_ENCODING);
    assert_eq!(decoded[1].text, "Saint Petersburg");
    assert_eq!(decoded[2].text, "258");
    assert_eq!(decoded[2].label, "Number");
    assert_eq!(decoded[3].text, "2024-03-15T00:00:00Z");
}

#[test]
fn test_decode_with_results() {
    let definition = ticket("en");
    let mut results = BTreeMap::new();
    results.insert("isExpired".to_string(), "TRUE".to_string());
    let results: &dyn FunctionResults = &results;

    let decoded = decode_attributes(&definition, ticket_id(1, 1, 0), Some(results));
    assert_eq!(decoded[0].text, "TRUE");
    assert_eq!(decoded[0].value, U256::ZERO);
    assert!(decoded[0].status.is_decoded());
    assert_eq!(decoded[1].text, "Moscow");
}

#[test]
fn test_decode_fault_isolation() {
    let definition = ticket("en");
    let decoded = decode_attributes(&definition, ticket_id(9, 7, 0), None);
    assert_eq!(decoded.len(), 4);

    let locality = &decoded[1];
    assert_eq!(locality.text, UNSUPPORTED_ENCODING);
    assert_eq!(locality.status, DecodeStatus::Failed(DecodeFault::UnknownMappingKey));
    assert_eq!(decoded[2].text, "7");
    assert_eq!(decoded[3].text, "1970-01-01T00:00:00Z");
}

#[test]
fn test_definition_shared_across_threads() {
    let definition = ticket("en");
    std::thread::scope(|scope| {
        let handles: Vec<_> = (1..=4u64)
            .map(|n| {
                let definition = &definition;
                scope.spawn(move || definition.decode(ticket_id(1, n, 0), None)[2].text.clone())
            })
            .collect();
        let texts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(texts, vec!["1", "2", "3", "4"]);
    });
}

// =============================================================================
// Versions and errors
// =============================================================================

#[test]
fn test_invalid_locale() {
    for language in ["", "e", "engl"] {
        assert!(matches!(
            parse(TICKET, language),
            Err(ParseError::InvalidLocale { .. })
        ));
    }
}

#[test]
fn test_version_ordering() {
    let older = TICKET.replace("2020/06", "2019/10");
    let definition = parse(&older, "en").unwrap();
    assert_eq!(definition.status(), ParseStatus::XmlOutOfDate);
    assert!(definition.is_usable());
    assert_eq!(definition.token_name(1), Some("Ticket"));

    let newer = TICKET.replace("2020/06", "2021/01");
    let definition = parse(&newer, "en").unwrap();
    assert_eq!(definition.status(), ParseStatus::ParserOutOfDate);
    assert_eq!(definition.namespace(), None);
    assert!(definition.attribute_types().is_empty());

    let malformed = TICKET.replace("2020/06", "2020/6");
    let definition = parse(&malformed, "en").unwrap();
    assert_eq!(definition.status(), ParseStatus::ParseFailed);
    assert!(!definition.is_usable());
}

#[test]
fn test_attestation_namespace_fallback() {
    let xml = r#"<token xmlns="http://attestation.id/ns/tbml"><label><string>Pass</string></label></token>"#;
    let definition = parse(xml, "en").unwrap();
    assert_eq!(definition.status(), ParseStatus::Ok);
    assert_eq!(definition.namespace(), Some(tokenscript::ATTESTATION_NAMESPACE));
    assert_eq!(definition.token_name(1), Some("Pass"));
}

#[test]
fn test_unbound_document_is_empty() {
    let xml = r#"<token><label><string>X</string></label></token>"#;
    let definition = parse(xml, "en").unwrap();
    assert_eq!(definition.status(), ParseStatus::Ok);
    assert_eq!(definition.token_name(1), None);
    assert!(definition.contracts().is_empty());
}

#[test]
fn test_unknown_tag_in_token_card() {
    let xml = wrap(r#"<ts:cards><ts:card type="token"><ts:bogus/></ts:card></ts:cards>"#);
    match parse(&xml, "en") {
        Err(ParseError::SchemaViolation { tag, scope }) => {
            assert_eq!(tag, "bogus");
            assert_eq!(scope, "token card");
        }
        other => panic!("expected schema violation, got {other:?}"),
    }
}

#[test]
fn test_script_in_action_rejected() {
    let xml = wrap(
        r#"<ts:cards><ts:card type="action"><ts:label><ts:string>Burn</ts:string></ts:label><ts:script/></ts:card></ts:cards>"#,
    );
    let err = parse(&xml, "en").unwrap_err();
    assert_eq!(err.to_string(), "unknown tag <script> in action 'Burn'");
}

#[test]
fn test_duplicate_module_label_rejected() {
    let xml = wrap(
        r#"<ts:contract label="A"><ts:module label="Transfer"><ts:sequence/></ts:module></ts:contract>
           <ts:contract label="B"><ts:module label="Transfer"><ts:sequence/></ts:module></ts:contract>"#,
    );
    assert_eq!(
        parse(&xml, "en"),
        Err(ParseError::DuplicateModuleLabel {
            label: "Transfer".to_string()
        })
    );
}

#[test]
fn test_malformed_xml() {
    let err = parse(&wrap("<ts:label>"), "en").unwrap_err();
    assert!(matches!(err, ParseError::Malformed { .. }));
}

#[test]
fn test_depth_limit() {
    let options = ParseOptions::new(Locale::default()).max_depth(2);
    assert!(matches!(
        parse_definition(TICKET, &options),
        Err(ParseError::LimitExceeded { field: "element depth", .. })
    ));
}

#[test]
fn test_bytes_and_digest() {
    let options = ParseOptions::default();
    let from_bytes = parse_definition_bytes(TICKET.as_bytes(), &options).unwrap();
    let from_str = parse_definition(TICKET, &options).unwrap();
    assert_eq!(from_bytes, from_str);
    assert_ne!(from_bytes.digest(), &[0u8; 32]);
}
