//! Attribute selections and their XML form.
//!
//! A selection maps variant attribute ids to the chosen values (value ids for
//! discrete attributes, raw text for free-input ones). Combinations persist a
//! selection as XML:
//!
//! ```xml
//! <Attributes>
//!   <ProductVariantAttribute ID="7">
//!     <ProductVariantAttributeValue><Value>21</Value></ProductVariantAttributeValue>
//!   </ProductVariantAttribute>
//! </Attributes>
//! ```
//!
//! Serialization is canonical: attributes ascend by id and values ascend
//! lexically, so equal selections always produce identical XML. Parsing
//! accepts any order, which is why duplicate checks compare decoded
//! selections rather than raw strings.

use crate::ids::{AttributeValueId, VariantAttributeId};
use crate::CatalogError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

const ROOT: &str = "Attributes";
const ATTRIBUTE: &str = "ProductVariantAttribute";
const ATTRIBUTE_VALUE: &str = "ProductVariantAttributeValue";
const VALUE: &str = "Value";

/// A set of selected values per variant attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSelection {
    entries: BTreeMap<VariantAttributeId, BTreeSet<String>>,
}

impl AttributeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to an attribute. Blank values are ignored.
    pub fn add_value(&mut self, attribute_id: VariantAttributeId, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.entries
            .entry(attribute_id)
            .or_default()
            .insert(value.to_string());
    }

    /// Add a discrete value by id.
    pub fn add_value_id(&mut self, attribute_id: VariantAttributeId, value_id: AttributeValueId) {
        self.add_value(attribute_id, value_id.to_string());
    }

    /// Builder form of [`AttributeSelection::add_value_id`].
    pub fn with_value_id(mut self, attribute_id: VariantAttributeId, value_id: AttributeValueId) -> Self {
        self.add_value_id(attribute_id, value_id);
        self
    }

    /// Raw values selected for an attribute.
    pub fn values(&self, attribute_id: VariantAttributeId) -> impl Iterator<Item = &str> {
        self.entries
            .get(&attribute_id)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Attributes that have at least one value.
    pub fn attribute_ids(&self) -> impl Iterator<Item = VariantAttributeId> + '_ {
        self.entries.keys().copied()
    }

    pub fn contains(&self, attribute_id: VariantAttributeId) -> bool {
        self.entries.contains_key(&attribute_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attributes with a selection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize to canonical attribute XML.
    pub fn to_xml(&self) -> Result<String, CatalogError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        write(&mut writer, Event::Start(BytesStart::new(ROOT)))?;
        for (attribute_id, values) in &self.entries {
            let id = attribute_id.to_string();
            let mut start = BytesStart::new(ATTRIBUTE);
            start.push_attribute(("ID", id.as_str()));
            write(&mut writer, Event::Start(start))?;

            for value in values {
                write(&mut writer, Event::Start(BytesStart::new(ATTRIBUTE_VALUE)))?;
                write(&mut writer, Event::Start(BytesStart::new(VALUE)))?;
                write(&mut writer, Event::Text(BytesText::new(value)))?;
                write(&mut writer, Event::End(BytesEnd::new(VALUE)))?;
                write(&mut writer, Event::End(BytesEnd::new(ATTRIBUTE_VALUE)))?;
            }

            write(&mut writer, Event::End(BytesEnd::new(ATTRIBUTE)))?;
        }
        write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| CatalogError::AttributeXml(e.to_string()))
    }

    /// Parse attribute XML. An empty document is an empty selection.
    pub fn from_xml(xml: &str) -> Result<Self, CatalogError> {
        let mut selection = Self::new();
        if xml.trim().is_empty() {
            return Ok(selection);
        }

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut current: Option<VariantAttributeId> = None;
        let mut in_value = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"ProductVariantAttribute" => current = Some(attribute_id(&e)?),
                    b"Value" => in_value = true,
                    _ => {}
                },
                Event::Text(text) if in_value => {
                    let attribute = current.ok_or_else(|| {
                        CatalogError::AttributeXml("value outside of an attribute".to_string())
                    })?;
                    let value = text.unescape()?;
                    selection.add_value(attribute, value.as_ref());
                }
                Event::End(e) => match e.name().as_ref() {
                    b"Value" => in_value = false,
                    b"ProductVariantAttribute" => current = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(selection)
    }
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), CatalogError> {
    writer
        .write_event(event)
        .map_err(|e| CatalogError::AttributeXml(e.to_string()))
}

fn attribute_id(start: &BytesStart<'_>) -> Result<VariantAttributeId, CatalogError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CatalogError::AttributeXml(e.to_string()))?;
        if attr.key.as_ref() == b"ID" {
            return String::from_utf8_lossy(&attr.value).parse();
        }
    }
    Err(CatalogError::AttributeXml(format!(
        "{} element without ID",
        ATTRIBUTE
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(id: i64) -> VariantAttributeId {
        VariantAttributeId::new(id)
    }

    #[test]
    fn test_canonical_xml_orders_attributes_and_values() {
        let mut a = AttributeSelection::new();
        a.add_value(attr(9), "30");
        a.add_value(attr(2), "5");
        a.add_value(attr(2), "4");

        assert_eq!(
            a.to_xml().unwrap(),
            "<Attributes>\
             <ProductVariantAttribute ID=\"2\">\
             <ProductVariantAttributeValue><Value>4</Value></ProductVariantAttributeValue>\
             <ProductVariantAttributeValue><Value>5</Value></ProductVariantAttributeValue>\
             </ProductVariantAttribute>\
             <ProductVariantAttribute ID=\"9\">\
             <ProductVariantAttributeValue><Value>30</Value></ProductVariantAttributeValue>\
             </ProductVariantAttribute>\
             </Attributes>"
        );
    }

    #[test]
    fn test_parse_accepts_any_order_and_whitespace() {
        let xml = r#"
            <Attributes>
              <ProductVariantAttribute ID="9">
                <ProductVariantAttributeValue><Value> 30 </Value></ProductVariantAttributeValue>
              </ProductVariantAttribute>
              <ProductVariantAttribute ID="2">
                <ProductVariantAttributeValue><Value>4</Value></ProductVariantAttributeValue>
              </ProductVariantAttribute>
            </Attributes>"#;

        let parsed = AttributeSelection::from_xml(xml).unwrap();
        let expected = AttributeSelection::new()
            .with_value_id(attr(2), AttributeValueId::new(4))
            .with_value_id(attr(9), AttributeValueId::new(30));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_text_values_are_escaped() {
        let mut a = AttributeSelection::new();
        a.add_value(attr(1), "Tom & Jerry <3");
        let xml = a.to_xml().unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
        assert_eq!(AttributeSelection::from_xml(&xml).unwrap(), a);
    }

    #[test]
    fn test_empty_document_is_empty_selection() {
        assert!(AttributeSelection::from_xml("").unwrap().is_empty());
        assert!(AttributeSelection::from_xml("<Attributes></Attributes>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let xml = "<Attributes><ProductVariantAttribute><ProductVariantAttributeValue>\
                   <Value>1</Value></ProductVariantAttributeValue>\
                   </ProductVariantAttribute></Attributes>";
        assert!(matches!(
            AttributeSelection::from_xml(xml),
            Err(CatalogError::AttributeXml(_))
        ));
    }
}
