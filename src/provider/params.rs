//! Request-parameter helpers for the request and callback phases.
//!
//! Both helpers are pure: they work on plain maps and strings so hosts can wire them to any
//! HTTP framework.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Parameters sent to the provider's authorize endpoint.
pub type AuthorizeParams = BTreeMap<String, String>;

/// Parameter names stripped from callback query strings.
pub const PROTOCOL_PARAMS: [&str; 2] = ["code", "state"];

const REDIRECT_URI: &str = "redirect_uri";

/// Copies the inbound `redirect_uri`, when present, over the base authorize parameters.
///
/// The value is forwarded verbatim without validating its shape. When the inbound request has
/// no `redirect_uri`, `base` is returned untouched.
pub fn forward_redirect_uri(
	mut base: AuthorizeParams,
	request_params: &HashMap<String, String>,
) -> AuthorizeParams {
	if let Some(redirect_uri) = request_params.get(REDIRECT_URI) {
		base.insert(REDIRECT_URI.into(), redirect_uri.clone());
	}

	base
}

/// Removes the OAuth `code` and `state` parameters from a raw query string.
///
/// Pairs are separated by `&` or `;`. Values are grouped by key in first-occurrence order, only
/// exact (case-sensitive) matches of [`PROTOCOL_PARAMS`] are dropped, and the remainder is
/// form-encoded. Returns `""` when nothing remains, otherwise the encoded remainder prefixed
/// with `?`.
pub fn sanitized_query_string(raw: &str) -> String {
	let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
	let pairs =
		raw.split(['&', ';']).flat_map(|segment| form_urlencoded::parse(segment.as_bytes()));

	for (key, value) in pairs {
		if PROTOCOL_PARAMS.contains(&&*key) {
			continue;
		}

		match grouped.iter_mut().find(|(existing, _)| *existing == key) {
			Some((_, values)) => values.push(value.into_owned()),
			None => grouped.push((key.into_owned(), vec![value.into_owned()])),
		}
	}

	if grouped.is_empty() {
		return String::new();
	}

	// Start after the `?` so the first pair is not prefixed with `&`.
	let mut serializer = form_urlencoded::Serializer::for_suffix(String::from("?"), 1);

	for (key, values) in &grouped {
		for value in values {
			serializer.append_pair(key, value);
		}
	}

	serializer.finish()
}
