//! Attribute types and their origins.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use tracing::debug;

use crate::error::ParseError;
use crate::model::{As, AttributeType, BitField, Origin, Syntax};
use crate::parse::context::ParseContext;
use crate::parse::contract::parse_event;
use crate::parse::function::parse_function;
use crate::parse::Locale;
use crate::xml::Element;

/// Parses an `attribute-type` element.
pub(crate) fn parse_attribute_type(
    element: &Element,
    ctx: &ParseContext<'_>,
) -> Result<AttributeType, ParseError> {
    let name = element
        .non_empty_attr("name")
        .or_else(|| element.non_empty_attr("id"))
        .unwrap_or_default()
        .to_string();

    let syntax = element
        .attr("syntax")
        .map(str::to_string)
        .or_else(|| element.elements_named("syntax").next().map(Element::text_content))
        .and_then(|oid| Syntax::from_oid(&oid))
        .unwrap_or_default();

    let label = attribute_label(element, ctx).unwrap_or_else(|| name.clone());

    let mut attribute = AttributeType {
        name,
        label,
        syntax,
        value_as: As::parse(element.attr("as").unwrap_or_default()),
        origin: Origin::Unresolved,
    };

    let origins = element.elements_named("origins").next().unwrap_or(element);
    for source in origins.elements() {
        if parse_origin(source, element, &mut attribute, ctx)? {
            return Ok(attribute);
        }
    }

    // Legacy form: bitmask or call declared on the attribute-type itself
    if element.attr("bitmask").is_some() {
        parse_token_id(element, element, &mut attribute, ctx.locale)?;
    } else if element.attr("function").is_some() {
        attribute.origin = Origin::Function(parse_function(
            element,
            ctx,
            attribute.syntax,
            attribute.value_as,
        ));
    }
    Ok(attribute)
}

/// Parses an attribute type for the global registry. Only attributes with
/// a bit mask or a function are kept.
pub(crate) fn register_global(element: &Element, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    let attribute = parse_attribute_type(element, ctx)?;
    if attribute.has_global_origin() {
        ctx.attribute_types.insert(attribute.name.clone(), attribute);
    } else {
        debug!(name = %attribute.name, "discarding attribute type without bitmask or function");
    }
    Ok(())
}

fn attribute_label(element: &Element, ctx: &ParseContext<'_>) -> Option<String> {
    ctx.locale
        .select(element.elements().filter(|e| e.local == "label" || e.local == "name"))
        .and_then(|label| ctx.locale.label_text(label))
}

/// Applies one origin element. Returns false if the element is not an
/// origin.
fn parse_origin(
    source: &Element,
    attribute_type: &Element,
    attribute: &mut AttributeType,
    ctx: &ParseContext<'_>,
) -> Result<bool, ParseError> {
    if let Some(value_as) = source.attr("as") {
        if matches!(source.local.as_str(), "token-id" | "call" | "user-entry") {
            attribute.value_as = As::parse(value_as);
        }
    }

    match source.local.as_str() {
        "token-id" => parse_token_id(source, attribute_type, attribute, ctx.locale)?,
        "call" => {
            attribute.origin = Origin::Function(parse_function(
                source,
                ctx,
                attribute.syntax,
                attribute.value_as,
            ));
        }
        "event" => attribute.origin = Origin::Event(parse_event(source, ctx)),
        "user-entry" => attribute.origin = Origin::UserEntry,
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_token_id(
    source: &Element,
    attribute_type: &Element,
    attribute: &mut AttributeType,
    locale: &Locale,
) -> Result<(), ParseError> {
    let Some(mask) = source.attr("bitmask") else {
        debug!(name = %attribute.name, "token-id origin without bitmask");
        return Ok(());
    };
    let field = BitField::parse_mask(mask).ok_or_else(|| ParseError::InvalidNumber {
        field: "bitmask",
        value: mask.to_string(),
    })?;

    let mapping = source
        .elements_named("mapping")
        .next()
        .or_else(|| attribute_type.elements_named("mapping").next());

    attribute.origin = match mapping {
        Some(mapping) => Origin::Mapping {
            field,
            members: parse_mapping(mapping, locale)?,
        },
        None if attribute.value_as == As::Mapping => Origin::Mapping {
            field,
            members: BTreeMap::new(),
        },
        None => Origin::TokenId(field),
    };
    Ok(())
}

fn parse_mapping(mapping: &Element, locale: &Locale) -> Result<BTreeMap<U256, String>, ParseError> {
    let mut members = BTreeMap::new();
    for option in mapping.elements_named("option") {
        let Some(key) = option.attr("key") else {
            continue;
        };
        let key_value = key.trim().parse::<U256>().map_err(|_| ParseError::InvalidNumber {
            field: "mapping key",
            value: key.to_string(),
        })?;
        let value = locale
            .localized_text(option, "value")
            .unwrap_or_else(|| option.text_content().trim().to_string());
        members.insert(key_value, value);
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn parse(xml: &str, language: &str) -> Result<AttributeType, ParseError> {
        let locale = Locale::new(language).unwrap();
        let ctx = ParseContext::new(&locale);
        let doc = parse_document(xml, 16).unwrap();
        parse_attribute_type(&doc.root, &ctx)
    }

    #[test]
    fn test_token_id_origin() {
        let attribute = parse(
            r#"<attribute-type name="seat" syntax="1.3.6.1.4.1.1466.115.121.1.27">
                 <label><string xml:lang="en">Seat</string><string xml:lang="de">Platz</string></label>
                 <origins><token-id bitmask="00000000000000000000000000000000000000000000000000000000FF000000" as="UNSIGNED"/></origins>
               </attribute-type>"#,
            "de",
        )
        .unwrap();

        assert_eq!(attribute.name, "seat");
        assert_eq!(attribute.label, "Platz");
        assert_eq!(attribute.syntax, Syntax::Integer);
        assert_eq!(attribute.value_as, As::Unsigned);
        let field = attribute.bit_field().unwrap();
        assert_eq!(field.shift, 24);
        assert!(attribute.has_global_origin());
    }

    #[test]
    fn test_mapping_origin() {
        let attribute = parse(
            r#"<attribute-type id="locality" syntax="1.3.6.1.4.1.1466.115.121.1.15">
                 <name><string>Locality</string></name>
                 <origins>
                   <token-id bitmask="00FF" as="mapping">
                     <mapping>
                       <option key="1"><value xml:lang="en">Moscow</value><value xml:lang="ru">Москва</value></option>
                       <option key="0x2"><value>Saint Petersburg</value></option>
                       <option><value>ignored</value></option>
                     </mapping>
                   </token-id>
                 </origins>
               </attribute-type>"#,
            "ru",
        )
        .unwrap();

        assert_eq!(attribute.name, "locality");
        assert_eq!(attribute.label, "Locality");
        assert_eq!(attribute.value_as, As::Mapping);
        let members = attribute.members().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[&U256::from(1u64)], "Москва");
        assert_eq!(members[&U256::from(2u64)], "Saint Petersburg");
    }

    #[test]
    fn test_call_origin() {
        let locale = Locale::default();
        let mut ctx = ParseContext::new(&locale);
        ctx.register_contract("Token".to_string(), crate::model::ContractInfo::new("erc20"));
        let doc = parse_document(
            r#"<attribute-type name="balance" syntax="1.3.6.1.4.1.1466.115.121.1.36">
                 <origins>
                   <ethereum:call xmlns:ethereum="urn:eth" contract="Token" function="balanceOf" as="uint">
                     <data><address ref="ownerAddress"/></data>
                   </ethereum:call>
                 </origins>
               </attribute-type>"#,
            16,
        )
        .unwrap();

        let attribute = parse_attribute_type(&doc.root, &ctx).unwrap();
        assert_eq!(attribute.label, "balance");
        let function = attribute.function().unwrap();
        assert!(function.is_resolved());
        assert_eq!(function.method, "balanceOf");
        assert_eq!(function.syntax, Syntax::NumericString);
        assert_eq!(function.value_as, As::Unsigned);
        assert_eq!(function.parameters.len(), 1);
    }

    #[test]
    fn test_local_only_origins() {
        let user = parse(
            r#"<attribute-type name="amount"><origins><user-entry as="e18"/></origins></attribute-type>"#,
            "en",
        )
        .unwrap();
        assert_eq!(user.origin, Origin::UserEntry);
        assert_eq!(user.value_as, As::E18);
        assert!(!user.has_global_origin());

        let event = parse(
            r#"<attribute-type name="owner"><origins><event event="Transfer" select="to"/></origins></attribute-type>"#,
            "en",
        )
        .unwrap();
        assert!(matches!(&event.origin, Origin::Event(e) if e.select.as_deref() == Some("to")));
        assert!(!event.has_global_origin());
    }

    #[test]
    fn test_legacy_bitmask_attribute() {
        let attribute = parse(r#"<attribute-type id="n" bitmask="F0" as="unsigned"/>"#, "en").unwrap();
        assert_eq!(attribute.bit_field().map(|f| f.shift), Some(4));
        assert_eq!(attribute.syntax, Syntax::DirectoryString);
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            parse(r#"<attribute-type name="x"><origins><token-id bitmask="zz"/></origins></attribute-type>"#, "en"),
            Err(ParseError::InvalidNumber { field: "bitmask", .. })
        ));
        assert!(matches!(
            parse(
                r#"<attribute-type name="x"><origins><token-id bitmask="FF"><mapping><option key="one"/></mapping></token-id></origins></attribute-type>"#,
                "en"
            ),
            Err(ParseError::InvalidNumber { field: "mapping key", .. })
        ));
    }

    #[test]
    fn test_global_registration_filters() {
        let locale = Locale::default();
        let mut ctx = ParseContext::new(&locale);
        let kept = parse_document(r#"<attribute-type name="a"><origins><token-id bitmask="FF"/></origins></attribute-type>"#, 8).unwrap();
        let dropped = parse_document(r#"<attribute-type name="b"><origins><user-entry/></origins></attribute-type>"#, 8).unwrap();
        let no_mask = parse_document(r#"<attribute-type name="c"><origins><token-id as="unsigned"/></origins></attribute-type>"#, 8).unwrap();

        register_global(&kept.root, &mut ctx).unwrap();
        register_global(&dropped.root, &mut ctx).unwrap();
        register_global(&no_mask.root, &mut ctx).unwrap();
        assert_eq!(ctx.attribute_types.len(), 1);
        assert!(ctx.attribute_types.contains_key("a"));
    }
}
