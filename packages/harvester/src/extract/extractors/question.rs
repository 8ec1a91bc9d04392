//! Question extraction and response domain decoding.

use roxmltree::Node;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::{ddi_urn, empty_map_if_none, ItemType, Reference};

/// Decoded Question item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRecord {
    #[serde(rename = "QuestionURN")]
    pub urn: String,
    #[serde(rename = "QuestionUserID")]
    pub user_id: String,
    #[serde(rename = "QuestionLabel")]
    pub label: Option<String>,
    #[serde(rename = "QuestionItemName")]
    pub item_name: String,
    #[serde(rename = "QuestionLiteral")]
    pub literal: Option<String>,
    #[serde(rename = "ResponseCardinality")]
    pub cardinality: ResponseCardinality,
    #[serde(rename = "Response", serialize_with = "empty_map_if_none")]
    pub response: Option<ResponseDomain>,
    #[serde(rename = "Instruction", serialize_with = "empty_map_if_none")]
    pub instruction: Option<Reference>,
}

impl QuestionRecord {
    /// `response_type` of the response domain, if one was recognised.
    #[must_use]
    pub fn response_type(&self) -> Option<&'static str> {
        self.response.as_ref().map(ResponseDomain::response_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCardinality {
    pub minimum_responses: String,
    pub maximum_responses: String,
}

/// How a question is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "response_type")]
pub enum ResponseDomain {
    CodeList {
        #[serde(rename = "CodeList_Agency")]
        agency: String,
        #[serde(rename = "CodeList_ID")]
        id: String,
        #[serde(rename = "CodeList_version")]
        version: String,
        #[serde(rename = "code_list_URN")]
        urn: String,
    },
    Text {
        #[serde(rename = "response_label")]
        label: Option<String>,
    },
    Numeric {
        #[serde(rename = "response_label")]
        label: Option<String>,
        #[serde(rename = "response_NumericType")]
        numeric_type: String,
        #[serde(rename = "response_RangeLow")]
        range_low: Option<String>,
        #[serde(rename = "response_RangeHigh")]
        range_high: Option<String>,
    },
    DateTime {
        #[serde(rename = "DateTypeCode")]
        date_type_code: String,
        #[serde(rename = "Label")]
        label: Option<String>,
    },
}

impl ResponseDomain {
    #[must_use]
    pub fn response_type(&self) -> &'static str {
        match self {
            Self::CodeList { .. } => "CodeList",
            Self::Text { .. } => "Text",
            Self::Numeric { .. } => "Numeric",
            Self::DateTime { .. } => "DateTime",
        }
    }
}

pub struct QuestionExtractor;

impl Extractor for QuestionExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Question
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        extract_question(root).map(ExtractedRecord::Question)
    }
}

/// Extract a Question payload.
pub fn extract_question(root: Node<'_, '_>) -> Result<QuestionRecord> {
    let r = FieldReader::new(root, ItemType::Question.label());

    let raw_label = r.text(".//UserAttributePair/AttributeValue")?;
    let label = first_value(r.decode_json::<Map<String, Value>>(&raw_label)?);

    let cardinality = ResponseCardinality {
        minimum_responses: r.attribute(".//ResponseCardinality", "minimumResponses")?,
        maximum_responses: r.attribute(".//ResponseCardinality", "maximumResponses")?,
    };

    Ok(QuestionRecord {
        urn: r.text(".//URN")?,
        user_id: r.text(".//UserID")?,
        label,
        item_name: r.text(".//QuestionItemName/String")?,
        literal: r.optional_text(".//QuestionText/LiteralText/Text"),
        cardinality,
        response: extract_response_domain(&r)?,
        instruction: r.optional_reference(".//InterviewerInstructionReference"),
    })
}

/// First value of a language map such as `{"en-GB": "Age of child"}`.
fn first_value(map: Map<String, Value>) -> Option<String> {
    map.into_iter().next().map(|(_, value)| match value {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Decode the response domain; the first present of Code, Text, Numeric
/// and DateTime wins.
fn extract_response_domain(r: &FieldReader<'_, '_>) -> Result<Option<ResponseDomain>> {
    if let Some(node) = r.find(".//CodeDomain") {
        let d = r.within(node);
        let agency = d.text(".//CodeListReference/Agency")?;
        let id = d.text(".//CodeListReference/ID")?;
        let version = d.text(".//CodeListReference/Version")?;
        let urn = ddi_urn(&agency, &id, &version);
        return Ok(Some(ResponseDomain::CodeList {
            agency,
            id,
            version,
            urn,
        }));
    }

    if let Some(node) = r.find(".//TextDomain") {
        return Ok(Some(ResponseDomain::Text {
            label: r.within(node).optional_text(".//Label/Content"),
        }));
    }

    if let Some(node) = r.find(".//NumericDomain") {
        let d = r.within(node);
        return Ok(Some(ResponseDomain::Numeric {
            label: d.optional_text(".//Label/Content"),
            numeric_type: d.text(".//NumericTypeCode")?,
            range_low: d.optional_text(".//NumberRange/Low"),
            range_high: d.optional_text(".//NumberRange/High"),
        }));
    }

    if let Some(node) = r.find(".//DateTimeDomain") {
        let d = r.within(node);
        return Ok(Some(ResponseDomain::DateTime {
            date_type_code: d.text(".//DateTypeCode")?,
            label: d.optional_text(".//Label/Content"),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvesterError;
    use crate::xml::NormalizedTree;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn question_xml(label_json: &str, domain: &str, extra: &str) -> String {
        format!(
            r#"<Fragment xmlns:r="ddi:reusable:3_2" xmlns:d="ddi:datacollection:3_2"><d:QuestionItem>
                <r:URN>urn:ddi:uk.cls.nextsteps:q1:2</r:URN>
                <r:UserAttributePair>
                    <r:AttributeKey>extension:Label</r:AttributeKey>
                    <r:AttributeValue>{label_json}</r:AttributeValue>
                </r:UserAttributePair>
                <r:UserID typeOfUserID="colectica:sourceId">qc_W1OwnLive</r:UserID>
                <d:QuestionItemName><r:String>W1OwnLive</r:String></d:QuestionItemName>
                <d:QuestionText><d:LiteralText><d:Text>Do you own where you live?</d:Text></d:LiteralText></d:QuestionText>
                {domain}
                {extra}
            </d:QuestionItem></Fragment>"#
        )
    }

    const CODE_DOMAIN: &str = r#"<d:CodeDomain>
        <r:ResponseCardinality minimumResponses="1" maximumResponses="1"/>
        <r:CodeListReference><r:Agency>uk.cls.nextsteps</r:Agency><r:ID>cl1</r:ID><r:Version>4</r:Version><r:TypeOfObject>CodeList</r:TypeOfObject></r:CodeListReference>
    </d:CodeDomain>"#;

    const TEXT_DOMAIN: &str = r#"<d:TextDomain maxLength="255">
        <r:ResponseCardinality minimumResponses="0" maximumResponses="1"/>
        <r:Label><r:Content>Please specify</r:Content></r:Label>
    </d:TextDomain>"#;

    #[test]
    fn test_question_code_domain() {
        let xml = question_xml(r#"{"en-GB": "Own home"}"#, CODE_DOMAIN, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        let question = extract_question(tree.root()).unwrap();

        assert_eq!(question.urn, "urn:ddi:uk.cls.nextsteps:q1:2");
        assert_eq!(question.user_id, "qc_W1OwnLive");
        assert_eq!(question.label.as_deref(), Some("Own home"));
        assert_eq!(question.item_name, "W1OwnLive");
        assert_eq!(question.literal.as_deref(), Some("Do you own where you live?"));
        assert_eq!(question.response_type(), Some("CodeList"));
        assert_eq!(
            question.response,
            Some(ResponseDomain::CodeList {
                agency: "uk.cls.nextsteps".into(),
                id: "cl1".into(),
                version: "4".into(),
                urn: "urn:ddi:uk.cls.nextsteps:cl1:4".into(),
            })
        );
        assert_eq!(question.instruction, None);
    }

    #[test]
    fn test_question_serialized_keys() {
        let xml = question_xml(r#"{"en-GB": "Own home"}"#, TEXT_DOMAIN, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        let value = serde_json::to_value(QuestionExtractor.extract(tree.root()).unwrap()).unwrap();

        assert_eq!(
            value["Response"],
            json!({"response_type": "Text", "response_label": "Please specify"})
        );
        assert_eq!(
            value["ResponseCardinality"],
            json!({"minimumResponses": "0", "maximumResponses": "1"})
        );
        assert_eq!(value["Instruction"], json!({}));
    }

    #[test]
    fn test_question_numeric_domain() {
        let domain = r#"<d:NumericDomain>
            <r:ResponseCardinality minimumResponses="1" maximumResponses="1"/>
            <r:NumberRange><r:Low>0</r:Low></r:NumberRange>
            <r:NumericTypeCode>Integer</r:NumericTypeCode>
        </d:NumericDomain>"#;
        let xml = question_xml(r#"{"en-GB": "Age"}"#, domain, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        let question = extract_question(tree.root()).unwrap();

        assert_eq!(
            question.response,
            Some(ResponseDomain::Numeric {
                label: None,
                numeric_type: "Integer".into(),
                range_low: Some("0".into()),
                range_high: None,
            })
        );
    }

    #[test]
    fn test_question_domain_precedence() {
        let domains = format!("{TEXT_DOMAIN}{CODE_DOMAIN}");
        let xml = question_xml(r#"{"en-GB": "x"}"#, &domains, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        let question = extract_question(tree.root()).unwrap();
        assert_eq!(question.response_type(), Some("CodeList"));
    }

    #[test]
    fn test_question_without_domain() {
        let extra = r#"<r:ResponseCardinality minimumResponses="1" maximumResponses="1"/>"#;
        let xml = question_xml(r#"{"en-GB": "x"}"#, "", extra);
        let tree = NormalizedTree::parse(&xml).unwrap();
        let question = extract_question(tree.root()).unwrap();

        assert_eq!(question.response, None);
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["Response"], json!({}));
    }

    #[test]
    fn test_question_instruction_reference() {
        let extra = r#"<d:InterviewerInstructionReference>
            <r:Agency>uk.cls.nextsteps</r:Agency><r:ID>ii9</r:ID><r:Version>1</r:Version>
            <r:TypeOfObject>Instruction</r:TypeOfObject>
        </d:InterviewerInstructionReference>"#;
        let xml = question_xml(r#"{"en-GB": "x"}"#, CODE_DOMAIN, extra);
        let tree = NormalizedTree::parse(&xml).unwrap();
        let question = extract_question(tree.root()).unwrap();

        assert_eq!(
            question.instruction,
            Some(Reference::new("uk.cls.nextsteps", "ii9", "1", "Instruction"))
        );
    }

    #[test]
    fn test_question_label_is_strict_json() {
        let xml = question_xml("{'en-GB': 'x'}", CODE_DOMAIN, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        let err = extract_question(tree.root()).unwrap_err();

        assert!(matches!(err, HarvesterError::MalformedAttribute { .. }));
        assert!(err.is_malformed_xml());
    }

    #[test]
    fn test_question_empty_label_map() {
        let xml = question_xml("{}", CODE_DOMAIN, "");
        let tree = NormalizedTree::parse(&xml).unwrap();
        assert_eq!(extract_question(tree.root()).unwrap().label, None);
    }

    proptest! {
        #[test]
        fn code_list_urn_is_built_from_reference(
            agency in "[a-z]{2,6}(\\.[a-z0-9]{1,6}){0,2}",
            id in "[0-9a-f]{8}-[0-9a-f]{4}",
            version in 1u32..1000,
        ) {
            let domain = format!(
                "<d:CodeDomain><r:CodeListReference>\
                 <r:Agency>{agency}</r:Agency><r:ID>{id}</r:ID><r:Version>{version}</r:Version>\
                 <r:TypeOfObject>CodeList</r:TypeOfObject>\
                 </r:CodeListReference></d:CodeDomain>"
            );
            let xml = question_xml(r#"{"en-GB": "x"}"#, &domain, "");
            let tree = NormalizedTree::parse(&xml).unwrap();
            let question = extract_question(tree.root()).unwrap();

            let version = version.to_string();
            let expected = ResponseDomain::CodeList {
                urn: ddi_urn(&agency, &id, &version),
                agency,
                id,
                version,
            };
            prop_assert_eq!(question.response, Some(expected));
        }
    }
}
