//! Request resolution: metadata + runtime arguments → request descriptor.
//!
//! Resolution is a single synchronous pass over the arguments. Layers apply
//! in a fixed order, each overriding the previous one key by key:
//!
//! 1. API and endpoint static values (already merged in [`ResolvedCallMetadata`])
//! 2. Per-call path, query, header and attribute arguments
//! 3. Attributes-bag arguments (attributes only)
//! 4. The request override argument (headers, url params, path)

use crate::constants;
use crate::error::Error;
use crate::invocation::CallArg;
use crate::metadata::{ParameterMetadata, ParameterRole, ResolvedCallMetadata, UrlParams};
use crate::request::{AttributeBag, RequestDescriptor};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Output of one resolution.
#[derive(Debug)]
pub struct ResolvedRequest {
    pub descriptor: RequestDescriptor,
    pub attributes: AttributeBag,
}

/// Value of a request-override argument.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOverride {
    pub path: Option<String>,
    /// Header values follow header-argument rules: scalars are rendered as
    /// text and `null` is skipped.
    #[serde(default)]
    pub headers: IndexMap<String, Value>,
    #[serde(default, alias = "url_params")]
    pub url_params: UrlParams,
}

/// Resolves one call's arguments against its metadata.
///
/// # Errors
///
/// Returns [`Error::AttributesNotObject`] when an attributes-bag argument is
/// not a JSON object, and [`Error::InvalidRequestOverride`] when a request
/// override argument cannot be read. Both are raised before any dispatch.
pub fn resolve(metadata: &ResolvedCallMetadata, args: Vec<CallArg>) -> Result<ResolvedRequest, Error> {
    let mut headers = metadata.headers().clone();
    let mut url_params = metadata.url_params().clone();
    let mut call_attributes: IndexMap<String, Value> = IndexMap::new();
    let mut bag_attributes: IndexMap<String, Value> = IndexMap::new();
    let mut body = None;
    let mut signal = None;
    let mut controller = None;
    let mut request_override: Option<RequestOverride> = None;

    for (position, arg) in args.into_iter().enumerate() {
        let value = match arg {
            CallArg::Signal(s) => {
                signal = Some(s);
                continue;
            }
            CallArg::Controller(c) => {
                controller = Some(c);
                continue;
            }
            CallArg::Absent => continue,
            CallArg::Value(value) => value,
        };

        let Some(parameter) = metadata.parameters().get(position) else {
            continue;
        };

        match parameter.role {
            ParameterRole::Path => bind_value(&mut url_params.path, parameter, value),
            ParameterRole::Query => bind_value(&mut url_params.query, parameter, value),
            ParameterRole::Header => bind_header(&mut headers, parameter, value),
            ParameterRole::Body => {
                if !value.is_null() {
                    body = Some(value);
                }
            }
            ParameterRole::Request => {
                if !value.is_null() {
                    request_override = Some(read_override(position, value)?);
                }
            }
            ParameterRole::Attribute => {
                if let Some(name) = &parameter.name {
                    if !value.is_null() {
                        call_attributes.insert(name.clone(), value);
                    }
                }
            }
            ParameterRole::Attributes => match value {
                Value::Object(map) => bag_attributes.extend(map),
                other => return Err(Error::attributes_not_object(position, &other)),
            },
        }
    }

    let mut path_override = None;
    if let Some(RequestOverride {
        path,
        headers: override_headers,
        url_params: override_params,
    }) = request_override
    {
        for (name, value) in override_headers {
            if let Some(text) = header_text(value) {
                headers.insert(name, text);
            }
        }
        url_params.merge(&override_params);
        path_override = path;
    }

    let mut attributes = AttributeBag::new();
    attributes.extend_json(metadata.attributes());
    attributes.extend_json(&call_attributes);
    attributes.extend_json(&bag_attributes);

    let url = expand_placeholders(&metadata.url_for(path_override.as_deref()), &url_params.path);
    debug!(
        target: "tether::resolver",
        method = metadata.method_name(),
        http_method = %metadata.http_method(),
        url = %url,
        "resolved request"
    );

    Ok(ResolvedRequest {
        descriptor: RequestDescriptor {
            method: metadata.http_method().clone(),
            url,
            headers,
            url_params,
            body,
            timeout: metadata.timeout(),
            signal,
            controller,
        },
        attributes,
    })
}

/// Name a path/query value binds under: the declared name, else `param<position>`.
fn binding_name(parameter: &ParameterMetadata) -> String {
    parameter.name.clone().unwrap_or_else(|| {
        format!("{}{}", constants::UNNAMED_PARAM_PREFIX, parameter.position)
    })
}

/// Path and query binding: objects spread their keys, scalars bind by name.
fn bind_value(target: &mut IndexMap<String, Value>, parameter: &ParameterMetadata, value: Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => spread(target, map),
        scalar => {
            target.insert(binding_name(parameter), scalar);
        }
    }
}

fn spread(target: &mut IndexMap<String, Value>, map: Map<String, Value>) {
    for (key, value) in map {
        if !value.is_null() {
            target.insert(key, value);
        }
    }
}

/// Header binding: an unnamed parameter is dropped whatever its value;
/// otherwise objects spread their keys and scalars bind under the name.
fn bind_header(headers: &mut IndexMap<String, String>, parameter: &ParameterMetadata, value: Value) {
    let Some(name) = &parameter.name else {
        return;
    };
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(text) = header_text(value) {
                    headers.insert(key, text);
                }
            }
        }
        scalar => {
            if let Some(text) = header_text(scalar) {
                headers.insert(name.clone(), text);
            }
        }
    }
}

fn header_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Substitutes `{name}` placeholders that have a path value, percent-encoded.
/// Placeholders without a value are left for the transport to report.
fn expand_placeholders(template: &str, path: &IndexMap<String, Value>) -> String {
    let mut url = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        url.push_str(&rest[..open]);
        let name = &rest[open + 1..close];
        match path.get(name).and_then(|v| header_text(v.clone())) {
            Some(value) => url.push_str(&urlencoding::encode(&value)),
            None => url.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    url.push_str(rest);
    url
}

fn read_override(position: usize, value: Value) -> Result<RequestOverride, Error> {
    if !value.is_object() {
        return Err(Error::InvalidRequestOverride {
            position,
            reason: "expected an object".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidRequestOverride {
        position,
        reason: e.to_string(),
    })
}
