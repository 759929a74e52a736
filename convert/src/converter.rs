//! XML element to JSON conversion.

use dyncli_core::{
    ConversionSpec, DescendantsBy, MergeStrategy, ParseInfo, SpecContext, merge_objects,
};
use serde_json::{Map, Value};
use tracing::debug;
use xmltree::Element;

use crate::coercion::Coercer;
use crate::document::{child_elements, text_segments};
use crate::error::ConvertError;
use crate::selectors::select_by_id;
use crate::spec_service::SpecService;

/// Converts element subtrees into JSON objects according to a
/// [`ConversionSpec`] and a [`ParseInfo`].
///
/// # Examples
///
/// ```
/// use dyncli_convert::{Converter, XmlDocument};
/// use dyncli_core::{ConversionSpec, DescendantsBy, ElementInfo, ParseInfo};
/// use serde_json::json;
///
/// let doc = XmlDocument::parse(
///     r#"<Arguments><Argument name="count" type="number" default="3"/></Arguments>"#,
/// ).unwrap();
/// let info = ParseInfo::default().with_element(
///     "Arguments",
///     ElementInfo::default().with_descendants(DescendantsBy::Index, "name"),
/// );
///
/// let converter = Converter::new(ConversionSpec::default());
/// let value = converter.build(doc.root(), &info).unwrap();
/// assert_eq!(value["_children"]["count"]["default"], json!(3));
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    service: SpecService,
}

impl Converter {
    pub fn new(spec: ConversionSpec) -> Self {
        Self {
            service: SpecService::new(spec),
        }
    }

    pub fn spec_service(&self) -> &SpecService {
        &self.service
    }

    /// Converts `element` and its subtree.
    ///
    /// Inheritance cannot be resolved for `element` itself because its
    /// siblings are unknown; use [`Converter::build_within`] when the element
    /// may inherit.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] when a descendant policy or an inheritance
    /// reference fails.
    pub fn build(&self, element: &Element, parse_info: &ParseInfo) -> Result<Value, ConvertError> {
        self.build_within(element, None, parse_info)
    }

    /// Converts `element`, resolving its inheritance among the children of
    /// `parent`.
    pub fn build_within(
        &self,
        element: &Element,
        parent: Option<&Element>,
        parse_info: &ParseInfo,
    ) -> Result<Value, ConvertError> {
        let mut walk = Walk {
            service: &self.service,
            coercer: Coercer::new(&self.service),
            parse_info,
            chain: Vec::new(),
        };
        walk.element(element, parent).map(Value::Object)
    }
}

struct Walk<'c> {
    service: &'c SpecService,
    coercer: Coercer<'c>,
    parse_info: &'c ParseInfo,
    /// `Tag#id` of every element whose conversion is in progress.
    chain: Vec<String>,
}

impl Walk<'_> {
    fn element(
        &mut self,
        element: &Element,
        parent: Option<&Element>,
    ) -> Result<Map<String, Value>, ConvertError> {
        let info = self.parse_info.resolve(&element.name);
        let own_key = info
            .id
            .and_then(|id| element.attributes.get(id))
            .map(|value| format!("{}#{}", element.name, value));

        if let Some(key) = &own_key {
            if self.chain.contains(key) {
                let mut cycle = self.chain.clone();
                cycle.push(key.clone());
                return Err(ConvertError::InheritanceCycle(cycle.join(" -> ")));
            }
            self.chain.push(key.clone());
        }

        let result = self.convert(element, parent);

        if own_key.is_some() {
            self.chain.pop();
        }
        result
    }

    fn convert(
        &mut self,
        element: &Element,
        parent: Option<&Element>,
    ) -> Result<Map<String, Value>, ConvertError> {
        let parse_info = self.parse_info;
        let info = parse_info.resolve(&element.name);
        let mut object = Map::new();
        object.insert(
            self.service.element_label().to_string(),
            Value::String(element.name.clone()),
        );

        let mut names: Vec<&String> = element
            .attributes
            .keys()
            .filter(|name| !info.discards(name))
            .collect();
        names.sort();
        let attributes: Vec<(String, Value)> = names
            .into_iter()
            .map(|name| {
                let value = self
                    .coercer
                    .coerce(&element.attributes[name], SpecContext::Attributes);
                (name.clone(), value)
            })
            .collect();

        match self.service.attributes_label() {
            Some(label) if !attributes.is_empty() => {
                let captured = attributes
                    .into_iter()
                    .map(|(name, value)| {
                        let mut single = Map::new();
                        single.insert(name, value);
                        Value::Object(single)
                    })
                    .collect();
                object.insert(label.to_string(), Value::Array(captured));
            }
            Some(_) => {}
            None => {
                for (name, value) in attributes {
                    object.entry(name).or_insert(value);
                }
            }
        }

        if let Some(text) = self
            .coercer
            .coerce_segments(&text_segments(element), SpecContext::TextNodes)
        {
            object.insert(self.service.text_label().to_string(), text);
        }

        if let Some(descendants) = self.descendants(element)? {
            object.insert(self.service.descendants_label().to_string(), descendants);
        }

        match info.recurse.and_then(|attribute| element.attributes.get(attribute)) {
            Some(bases) => self.inherit(element, parent, bases, object),
            None => Ok(object),
        }
    }

    fn descendants(&mut self, element: &Element) -> Result<Option<Value>, ConvertError> {
        let parse_info = self.parse_info;
        let info = parse_info.resolve(&element.name);
        let children: Vec<&Element> = child_elements(element)
            .filter(|child| !info.discards(&child.name))
            .collect();
        if children.is_empty() {
            return Ok(None);
        }

        let Some(policy) = info.descendants.filter(|d| d.by.is_some()) else {
            let converted = children
                .into_iter()
                .map(|child| self.element(child, Some(element)).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(Value::Array(converted)));
        };

        let mut keyed = Map::new();
        for child in children {
            let attribute = info
                .descendants_id()
                .or_else(|| parse_info.resolve(&child.name).id);
            let Some(key) = attribute.and_then(|a| child.attributes.get(a)) else {
                if policy.throw_if_missing {
                    return Err(ConvertError::MissingId {
                        element: child.name.clone(),
                        parent: element.name.clone(),
                        attribute: attribute.unwrap_or_default().to_string(),
                    });
                }
                debug!(
                    element = %child.name,
                    parent = %element.name,
                    attribute = ?attribute,
                    "Skipping descendant without identifying attribute"
                );
                continue;
            };

            let converted = Value::Object(self.element(child, Some(element))?);
            match policy.by {
                Some(DescendantsBy::Group) => {
                    if let Value::Array(group) = keyed
                        .entry(key.clone())
                        .or_insert_with(|| Value::Array(Vec::new()))
                    {
                        group.push(converted);
                    }
                }
                _ => {
                    if keyed.contains_key(key) {
                        if policy.throw_if_collision {
                            return Err(ConvertError::Collision {
                                element: child.name.clone(),
                                parent: element.name.clone(),
                                attribute: attribute.unwrap_or_default().to_string(),
                                id: key.clone(),
                            });
                        }
                        debug!(
                            element = %child.name,
                            parent = %element.name,
                            id = %key,
                            "Overwriting descendant with duplicate key"
                        );
                    }
                    keyed.insert(key.clone(), converted);
                }
            }
        }

        Ok(Some(Value::Object(keyed)))
    }

    fn inherit(
        &mut self,
        element: &Element,
        parent: Option<&Element>,
        bases: &str,
        own: Map<String, Value>,
    ) -> Result<Map<String, Value>, ConvertError> {
        let unresolved = |id: &str, reason: &str| ConvertError::UnresolvedInheritance {
            element: element.name.clone(),
            id: id.to_string(),
            reason: reason.to_string(),
        };
        let id_attribute = self.parse_info.resolve(&element.name).id;

        let mut inherited = Map::new();
        for id in bases.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            let parent = parent.ok_or_else(|| unresolved(id, "element has no parent"))?;
            let id_attribute =
                id_attribute.ok_or_else(|| unresolved(id, "element has no identifying attribute"))?;
            let base = select_by_id(&element.name, id, id_attribute, parent)
                .ok_or_else(|| unresolved(id, "no sibling carries this id"))?;

            debug!(element = %element.name, base = id, "Resolving inheritance");
            let converted = self.element(base, Some(parent))?;
            inherited = merge_objects(&inherited, &converted, MergeStrategy::Union);
        }

        Ok(merge_objects(&inherited, &own, MergeStrategy::Union))
    }
}

#[cfg(test)]
mod tests {
    use dyncli_core::{ElementInfo, Matcher};
    use serde_json::json;

    use super::*;
    use crate::XmlDocument;

    fn convert(xml: &str, spec: ConversionSpec, info: &ParseInfo) -> Result<Value, ConvertError> {
        let doc = XmlDocument::parse(xml).unwrap();
        Converter::new(spec).build(doc.root(), info)
    }

    #[test]
    fn test_plain_conversion() {
        let value = convert(
            r#"<Command name="get" hidden="false"><Describe>Fetch it</Describe></Command>"#,
            ConversionSpec::default(),
            &ParseInfo::default(),
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "_": "Command",
                "hidden": false,
                "name": "get",
                "_children": [{"_": "Describe", "_text": "Fetch it"}]
            })
        );
    }

    #[test]
    fn test_attributes_label_captures_attributes() {
        let value = convert(
            r#"<Argument name="shape" type="string"/>"#,
            ConversionSpec::named("cli").with_attributes_label("_attributes"),
            &ParseInfo::default(),
        )
        .unwrap();

        assert_eq!(
            value["_attributes"],
            json!([{"name": "shape"}, {"type": "string"}])
        );
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_discards_attributes_and_children() {
        let info = ParseInfo::default().with_common(
            ElementInfo::default().with_discards(&["internal", "Notes"]),
        );
        let value = convert(
            r#"<Command name="get" internal="x"><Notes>skip</Notes><Describe>kept</Describe></Command>"#,
            ConversionSpec::named("cli"),
            &info,
        )
        .unwrap();

        assert!(value.get("internal").is_none());
        assert_eq!(value["_children"].as_array().unwrap().len(), 1);
        assert_eq!(value["_children"][0]["_"], json!("Describe"));
    }

    #[test]
    fn test_group_mode_accumulates() {
        let info = ParseInfo::default().with_element(
            "Shapes",
            ElementInfo::default().with_descendants(DescendantsBy::Group, "kind"),
        );
        let value = convert(
            r#"<Shapes><Shape kind="poly" n="3"/><Shape kind="round"/><Shape kind="poly" n="4"/></Shapes>"#,
            ConversionSpec::default(),
            &info,
        )
        .unwrap();

        let poly = value["_children"]["poly"].as_array().unwrap();
        assert_eq!(poly.len(), 2);
        assert_eq!(poly[1]["n"], json!(4));
        assert_eq!(value["_children"]["round"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_id_skips_or_fails() {
        let xml = r#"<Arguments><Argument name="a"/><Argument/></Arguments>"#;
        let lenient = ParseInfo::default().with_element(
            "Arguments",
            ElementInfo::default().with_descendants(DescendantsBy::Index, "name"),
        );
        let value = convert(xml, ConversionSpec::default(), &lenient).unwrap();
        assert_eq!(value["_children"].as_object().unwrap().len(), 1);

        let strict = ParseInfo::default().with_element(
            "Arguments",
            ElementInfo::default()
                .with_descendants(DescendantsBy::Index, "name")
                .throwing(false, true),
        );
        let err = convert(xml, ConversionSpec::default(), &strict).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingId {
                element: "Argument".to_string(),
                parent: "Arguments".to_string(),
                attribute: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_child_id_keys_descendants() {
        let info = ParseInfo::default()
            .with_element(
                "Arguments",
                ElementInfo {
                    descendants: Some(dyncli_core::DescendantsInfo {
                        by: Some(DescendantsBy::Index),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .with_element("Argument", ElementInfo::identified_by("name"));
        let value = convert(
            r#"<Arguments><Argument name="x"/></Arguments>"#,
            ConversionSpec::default(),
            &info,
        )
        .unwrap();
        assert_eq!(value["_children"]["x"]["_"], json!("Argument"));
    }

    #[test]
    fn test_inheritance_merges_bases() {
        let xml = r#"
            <Arguments>
              <Argument name="base" type="string" describe="Base"><Choice>a</Choice></Argument>
              <Argument name="derived" inherits="base" describe="Derived"><Choice>b</Choice></Argument>
            </Arguments>"#;
        let info = ParseInfo::default()
            .with_element(
                "Arguments",
                ElementInfo::default().with_descendants(DescendantsBy::Index, "name"),
            )
            .with_element(
                "Argument",
                ElementInfo::identified_by("name")
                    .with_recurse("inherits")
                    .with_discards(&["inherits"]),
            );

        let value = convert(xml, ConversionSpec::default(), &info).unwrap();
        let derived = &value["_children"]["derived"];
        assert_eq!(derived["type"], json!("string"));
        assert_eq!(derived["describe"], json!("Derived"));
        assert_eq!(derived["name"], json!("derived"));
        assert!(derived.get("inherits").is_none());
        assert_eq!(derived["_children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_inheritance_cycle_is_detected() {
        let xml = r#"
            <Arguments>
              <Argument name="a" inherits="b"/>
              <Argument name="b" inherits="a"/>
            </Arguments>"#;
        let info = ParseInfo::default()
            .with_element("Argument", ElementInfo::identified_by("name").with_recurse("inherits"));

        let err = convert(xml, ConversionSpec::default(), &info).unwrap_err();
        assert!(matches!(err, ConvertError::InheritanceCycle(_)));
    }

    #[test]
    fn test_unresolved_inheritance() {
        let xml = r#"<Arguments><Argument name="a" inherits="ghost"/></Arguments>"#;
        let info = ParseInfo::default()
            .with_element("Argument", ElementInfo::identified_by("name").with_recurse("inherits"));

        let err = convert(xml, ConversionSpec::default(), &info).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnresolvedInheritance { ref id, .. } if id == "ghost"
        ));
    }

    #[test]
    fn test_text_coercion_uses_text_matchers() {
        let spec = ConversionSpec::named("cli")
            .with_matchers(SpecContext::TextNodes, vec![Matcher::Number]);
        let value = convert(
            r#"<Limits max="10"><Max>10</Max></Limits>"#,
            spec,
            &ParseInfo::default(),
        )
        .unwrap();
        assert_eq!(value["max"], json!("10"));
        assert_eq!(value["_children"][0]["_text"], json!(10));
    }
}
