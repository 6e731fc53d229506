//! Declarative endpoint descriptions.
//!
//! An `EndpointDescriptor` is a plain record: path template, referer suffix, method,
//! the name of the response schema and whether a token is required. Request structs
//! implement `Endpoint` to supply the values bound into the template, the query and
//! the body; the executor in `crate::client` is generic over `Endpoint`.

use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FebosError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Short operation name used in logs and errors.
    pub name: &'static str,
    pub method: Method,
    /// Path below the api prefix, with `{name}` placeholders.
    pub path: &'static str,
    /// Suffix appended to `<base><app prefix>` to build the `Referer` header.
    pub referer: &'static str,
    /// Entity name reported by validation errors.
    pub schema: &'static str,
    pub authenticated: bool,
}

pub trait Endpoint {
    type Response: DeserializeOwned;

    const DESCRIPTOR: EndpointDescriptor;

    /// Values for the placeholders in `DESCRIPTOR.path`.
    fn path_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Result<Option<Value>> {
        Ok(None)
    }

    /// Argument checks that must fail before any request is issued.
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// Substitute every `{name}` in `template` with its bound value. A name may appear
/// more than once and bindings may be given in any order.
pub fn bind_path(template: &str, values: &[(&str, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| FebosError::TemplateBinding {
            placeholder: after.to_string(),
            template: template.to_string(),
        })?;
        let name = &after[..close];
        let value = values
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
            .ok_or_else(|| FebosError::TemplateBinding {
                placeholder: name.to_string(),
                template: template.to_string(),
            })?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Names of all placeholders in `template`, in order of appearance.
#[cfg(test)]
pub(crate) fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}
