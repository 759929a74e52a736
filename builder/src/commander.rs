//! Command descriptors from the commands XML document.
//!
//! Each command element is converted with the [`Converter`], then
//! extended with two members named by the schema labels:
//!
//! - options: the argument definitions its argument refs point at, keyed by
//!   argument name. Attributes set on a ref override the definition.
//! - validation groups: `{"conflicts": [[..]], "implies": [[..]]}`, one
//!   inner array per group element.

use dyncli_convert::{Converter, Element, XmlDocument, child_elements, select_by_id};
use dyncli_core::{CliSchema, MergeStrategy, ParseInfo, merge_objects};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BuildError;

/// Builds command descriptors from one commands document.
///
/// # Examples
///
/// ```
/// use dyncli_builder::{CliSettings, CommandBuilder};
/// use dyncli_convert::{Converter, XmlDocument};
///
/// let doc = XmlDocument::parse(r#"
///     <Cli>
///       <Commands>
///         <Command name="get" describe="Get a shape">
///           <Arguments><ArgumentRef name="shape"/></Arguments>
///         </Command>
///       </Commands>
///       <Arguments>
///         <Argument name="shape" alias="s" describe="Shape name"/>
///       </Arguments>
///     </Cli>"#).unwrap();
///
/// let settings = CliSettings::named("shapes");
/// let converter = Converter::new(settings.spec.clone());
/// let builder = CommandBuilder::new(&converter, &settings.parse_info, &doc, &settings.schema);
///
/// let commands = builder.commands_node().unwrap();
/// let descriptors = builder.build_named_command("get", commands).unwrap();
/// assert_eq!(descriptors[0]["options"]["shape"]["alias"], "s");
/// assert!(builder.build_named_command("put", commands).unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    converter: &'a Converter,
    parse_info: &'a ParseInfo,
    document: &'a XmlDocument,
    schema: &'a CliSchema,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(
        converter: &'a Converter,
        parse_info: &'a ParseInfo,
        document: &'a XmlDocument,
        schema: &'a CliSchema,
    ) -> Self {
        Self {
            converter,
            parse_info,
            document,
            schema,
        }
    }

    /// The element at the schema's commands path.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingNode`] if the path selects nothing.
    pub fn commands_node(&self) -> Result<&'a Element, BuildError> {
        self.document
            .selectors()
            .select_single(&self.schema.commands_path, None)?
            .ok_or_else(|| BuildError::MissingNode(self.schema.commands_path.clone()))
    }

    /// Builds the descriptor of the command named `command_name`.
    ///
    /// Returns an empty vector when `commands_node` has no such command.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if conversion fails or an argument ref
    /// cannot be resolved.
    pub fn build_named_command(
        &self,
        command_name: &str,
        commands_node: &'a Element,
    ) -> Result<Vec<Value>, BuildError> {
        let Some(command) = select_by_id(
            &self.schema.command_element,
            command_name,
            &self.schema.command_id,
            commands_node,
        ) else {
            debug!(command = command_name, "Command not found");
            return Ok(Vec::new());
        };

        Ok(vec![self.describe(command, commands_node)?])
    }

    /// Builds the descriptors of every command under `commands_node`, in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if conversion fails or an argument ref
    /// cannot be resolved.
    pub fn build_commands(&self, commands_node: &'a Element) -> Result<Vec<Value>, BuildError> {
        child_elements(commands_node)
            .filter(|child| child.name == self.schema.command_element)
            .map(|command| self.describe(command, commands_node))
            .collect()
    }

    fn describe(&self, command: &'a Element, commands_node: &'a Element) -> Result<Value, BuildError> {
        let name = self.identify(command)?;
        debug!(command = name, "Building command descriptor");

        let mut descriptor = match self
            .converter
            .build_within(command, Some(commands_node), self.parse_info)?
        {
            Value::Object(map) => map,
            other => return Ok(other),
        };

        let options = self.options(command, name)?;
        let groups = self.validation_groups(command);
        descriptor.insert(self.schema.labels.options.clone(), Value::Object(options));
        descriptor.insert(self.schema.labels.validation_groups.clone(), groups);

        Ok(Value::Object(descriptor))
    }

    fn identify<'e>(&self, element: &'e Element) -> Result<&'e str, BuildError> {
        element
            .attributes
            .get(&self.schema.command_id)
            .map(String::as_str)
            .ok_or_else(|| BuildError::MissingAttribute {
                element: element.name.clone(),
                attribute: self.schema.command_id.clone(),
            })
    }

    /// Argument refs directly under the command or one level down, outside
    /// the validation groups element.
    fn argument_refs(&self, command: &'a Element) -> Vec<&'a Element> {
        let is_ref = |element: &&Element| element.name == self.schema.argument_ref;
        child_elements(command)
            .filter(is_ref)
            .chain(
                child_elements(command)
                    .filter(|child| child.name != self.schema.validation_groups_element)
                    .flat_map(|child| child_elements(child).filter(is_ref)),
            )
            .collect()
    }

    fn options(&self, command: &'a Element, command_name: &str) -> Result<Map<String, Value>, BuildError> {
        let refs = self.argument_refs(command);
        let mut options = Map::new();
        if refs.is_empty() {
            return Ok(options);
        }

        let arguments = self
            .document
            .selectors()
            .select_single(&self.schema.arguments_path, None)?;
        let element_label = self.converter.spec_service().element_label();

        for argument_ref in refs {
            let argument_name = self.identify(argument_ref)?;
            if self.schema.is_excluded(argument_name) {
                debug!(
                    command = command_name,
                    option = argument_name,
                    "Skipping excluded option"
                );
                continue;
            }

            let definition = arguments
                .and_then(|parent| {
                    select_by_id(
                        &self.schema.argument_element,
                        argument_name,
                        &self.schema.command_id,
                        parent,
                    )
                    .map(|definition| (definition, parent))
                })
                .ok_or_else(|| BuildError::UnknownArgument {
                    command: command_name.to_string(),
                    argument: argument_name.to_string(),
                })?;

            let converted = self
                .converter
                .build_within(definition.0, Some(definition.1), self.parse_info)?;
            let mut overrides = self.converter.build(argument_ref, self.parse_info)?;
            if let Value::Object(map) = &mut overrides {
                map.remove(element_label);
            }

            let option = match (converted, overrides) {
                (Value::Object(base), Value::Object(overlay)) => {
                    Value::Object(merge_objects(&base, &overlay, MergeStrategy::PreferOverlay))
                }
                (converted, _) => converted,
            };
            options.insert(argument_name.to_string(), option);
        }

        Ok(options)
    }

    fn validation_groups(&self, command: &Element) -> Value {
        let mut groups = Map::new();
        groups.insert("conflicts".to_string(), Value::Array(Vec::new()));
        groups.insert("implies".to_string(), Value::Array(Vec::new()));

        for container in child_elements(command)
            .filter(|child| child.name == self.schema.validation_groups_element)
        {
            for group in child_elements(container) {
                let members: Vec<Value> = child_elements(group)
                    .filter(|member| member.name == self.schema.argument_ref)
                    .filter_map(|member| member.attributes.get(&self.schema.command_id))
                    .map(|name| Value::String(name.clone()))
                    .collect();

                if let Value::Array(kind) = groups
                    .entry(group.name.to_lowercase())
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    kind.push(Value::Array(members));
                }
            }
        }

        Value::Object(groups)
    }
}
