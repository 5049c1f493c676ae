//! Contract calls and transactions.

use tracing::debug;

use crate::model::{As, FunctionDefinition, MethodArg, Reference, Syntax, TransactionPayload};
use crate::parse::context::ParseContext;
use crate::xml::Element;

/// Builds a function from a `call` or `transaction` element.
///
/// The contract label is resolved against contracts declared so far; an
/// unknown label leaves the function unresolved.
pub(crate) fn parse_function(
    element: &Element,
    ctx: &ParseContext<'_>,
    syntax: Syntax,
    value_as: As,
) -> FunctionDefinition {
    let contract_label = element.attr("contract").unwrap_or_default().to_string();
    let contract = ctx.contracts.get(&contract_label).cloned();
    if contract.is_none() && !contract_label.is_empty() {
        debug!(contract = %contract_label, "function references an undeclared contract");
    }

    let mut function = FunctionDefinition {
        contract_label,
        contract,
        method: element.attr("function").unwrap_or_default().to_string(),
        syntax,
        value_as,
        parameters: Vec::new(),
        transaction: None,
    };

    for child in element.elements() {
        match child.local.as_str() {
            "data" => function.parameters.extend(child.elements().map(|arg| MethodArg {
                parameter_type: arg.local.clone(),
                element: parse_reference(arg),
            })),
            "to" => {
                function
                    .transaction
                    .get_or_insert_with(TransactionPayload::default)
                    .to = Some(parse_reference(child));
            }
            "value" => {
                function
                    .transaction
                    .get_or_insert_with(TransactionPayload::default)
                    .value = Some(parse_reference(child));
            }
            _ => {}
        }
    }

    function
}

pub(crate) fn parse_reference(element: &Element) -> Reference {
    let text = element.text_content();
    let text = text.trim();
    Reference {
        xml_ref: element.non_empty_attr("ref").map(str::to_string),
        value: (!text.is_empty()).then(|| text.to_string()),
        local_ref: element.non_empty_attr("local-ref").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContractInfo;
    use crate::parse::Locale;
    use crate::xml::parse_document;

    #[test]
    fn test_call_with_arguments() {
        let locale = Locale::default();
        let mut ctx = ParseContext::new(&locale);
        ctx.register_contract("Shop".to_string(), ContractInfo::new("erc20"));

        let doc = parse_document(
            r#"<ethereum:call xmlns:ethereum="urn:eth" contract="Shop" function="balanceOf">
                 <data>
                   <address ref="ownerAddress"/>
                   <uint256>42</uint256>
                   <bytes32 local-ref="code"/>
                 </data>
                 <ignored/>
               </ethereum:call>"#,
            8,
        )
        .unwrap();

        let function = parse_function(&doc.root, &ctx, Syntax::Integer, As::Unsigned);
        assert!(function.is_resolved());
        assert_eq!(function.method, "balanceOf");
        assert_eq!(function.value_as, As::Unsigned);
        assert_eq!(function.parameters.len(), 3);
        assert_eq!(function.parameters[0].parameter_type, "address");
        assert_eq!(function.parameters[0].element.xml_ref.as_deref(), Some("ownerAddress"));
        assert_eq!(function.parameters[1].element.value.as_deref(), Some("42"));
        assert_eq!(function.parameters[2].element.local_ref.as_deref(), Some("code"));
        assert!(function.transaction.is_none());
    }

    #[test]
    fn test_transaction_payload_and_unknown_contract() {
        let locale = Locale::default();
        let ctx = ParseContext::new(&locale);
        let doc = parse_document(
            r#"<transaction contract="Missing" function="">
                 <to ref="recipient"/>
                 <value>1000</value>
               </transaction>"#,
            8,
        )
        .unwrap();

        let function = parse_function(&doc.root, &ctx, Syntax::IA5String, As::Utf8);
        assert!(!function.is_resolved());
        assert_eq!(function.contract_label, "Missing");
        let payload = function.transaction.unwrap();
        assert_eq!(payload.to.unwrap().xml_ref.as_deref(), Some("recipient"));
        assert_eq!(payload.value.unwrap().value.as_deref(), Some("1000"));
    }
}
