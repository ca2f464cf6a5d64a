//! Parameters derived from a handler's declared payload descriptor.

use crate::handler::{FieldDescriptor, Handler};
use crate::operation::{AllowedValues, ParamLocation, Parameter};
use log::debug;

/// Parameters a handler's serializer contributes to an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldExtraction {
    /// The serializer itself as a single body parameter
    pub body_param: Option<Parameter>,
    /// One form parameter per writable field
    pub form_params: Vec<Parameter>,
}

/// Extract body and form parameters from the handler's serializer, if any
pub fn extract(handler: &dyn Handler) -> FieldExtraction {
    match handler.serializer() {
        Some(descriptor) => FieldExtraction {
            body_param: Some(body_parameter(descriptor.as_ref())),
            form_params: form_parameters(descriptor.as_ref()),
        },
        None => FieldExtraction::default(),
    }
}

/// Name of the handler's serializer, used as the default response type
pub fn serializer_name(handler: &dyn Handler) -> Option<String> {
    handler.serializer().map(|s| s.name().to_string())
}

pub fn body_parameter(descriptor: &dyn FieldDescriptor) -> Parameter {
    let name = descriptor.name();
    Parameter::new(name, name, ParamLocation::Body)
}

pub fn form_parameters(descriptor: &dyn FieldDescriptor) -> Vec<Parameter> {
    descriptor
        .fields()
        .into_iter()
        .filter_map(|(name, field)| {
            if field.read_only {
                debug!("Skipping read-only field {}.{}", descriptor.name(), name);
                return None;
            }

            let allowed_values = if field.min_length.is_some() || field.max_length.is_some() {
                Some(AllowedValues::range(field.min_length, field.max_length))
            } else {
                None
            };

            Some(Parameter {
                name,
                data_type: field.type_label,
                location: ParamLocation::Form,
                required: field.required,
                default_value: field.default.as_ref().map(|d| d.resolve()),
                allowed_values,
                description: Some(field.help_text.unwrap_or_default()),
            })
        })
        .collect()
}
