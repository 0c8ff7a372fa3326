//! Identity document model and the mappers that turn it into `uid`/`info`/`extra`.
//!
//! Two mappings exist in the wild for this provider: a contact-only shape
//! (`email`/`client_id`) and a profile shape that also derives `name` and `image`. They are
//! distinct public contracts, so each lives in its own [`IdentityMapper`] and configuration
//! picks one through [`IdentityVariant`].

// self
use crate::_prelude::*;

/// User-info document returned by the provider.
///
/// The document is kept as the raw JSON object so nothing the provider sends is lost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityDocument(JsonMap<String, JsonValue>);
impl IdentityDocument {
	/// Parses a JSON object body, reporting the failing path when the body is not an object.
	pub fn from_slice(body: &[u8]) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Returns the raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}

	/// Returns the value under `key` as a string.
	///
	/// Strings come back verbatim, `null` and missing keys yield `None`, and any other JSON
	/// value is rendered in its JSON form.
	pub fn string(&self, key: &str) -> Option<String> {
		match self.0.get(key)? {
			JsonValue::Null => None,
			JsonValue::String(value) => Some(value.clone()),
			other => Some(other.to_string()),
		}
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &JsonMap<String, JsonValue> {
		&self.0
	}

	/// Consumes the document, returning the underlying JSON object.
	pub fn into_map(self) -> JsonMap<String, JsonValue> {
		self.0
	}
}
impl From<JsonMap<String, JsonValue>> for IdentityDocument {
	fn from(map: JsonMap<String, JsonValue>) -> Self {
		Self(map)
	}
}

/// `info` section of the identity result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
	/// Contact email.
	pub email: Option<String>,
	/// Provider-specific client identifier.
	pub client_id: Option<String>,
	/// Display fields, present only for the profile mapping.
	#[serde(flatten)]
	pub profile: Option<ProfileInfo>,
}
impl IdentityInfo {
	/// Display name, when the profile mapping produced one.
	pub fn name(&self) -> Option<&str> {
		self.profile.as_ref().map(|profile| profile.name.as_str())
	}

	/// Avatar URL, when the profile mapping produced one.
	pub fn image(&self) -> Option<&str> {
		self.profile.as_ref().and_then(|profile| profile.image.as_deref())
	}
}

/// Display fields produced by [`ProfileIdentityMapper`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
	/// `first_name` and `last_name` joined by a space and trimmed.
	pub name: String,
	/// Avatar URL.
	pub image: Option<String>,
}

/// `extra` section of the identity result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityExtra {
	/// Full user-info document.
	pub raw_info: IdentityDocument,
}

/// Maps an identity document into the standard identity shapes.
pub trait IdentityMapper: Send + Sync {
	/// Returns the unique identifier.
	///
	/// The default reads `uid` verbatim and fails when it is absent.
	fn uid(&self, doc: &IdentityDocument) -> Result<String> {
		doc.string("uid").ok_or(Error::MissingUid)
	}

	/// Returns the `info` section.
	fn info(&self, doc: &IdentityDocument) -> IdentityInfo;

	/// Returns the `extra` section; the default wraps the full document.
	fn extra(&self, doc: &IdentityDocument) -> IdentityExtra {
		IdentityExtra { raw_info: doc.clone() }
	}
}

/// Mapping that exposes only `email` and `client_id`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactIdentityMapper;
impl IdentityMapper for ContactIdentityMapper {
	fn info(&self, doc: &IdentityDocument) -> IdentityInfo {
		IdentityInfo { email: doc.string("email"), client_id: doc.string("client_id"), profile: None }
	}
}

/// Mapping that adds the display `name` and avatar `image` to the contact fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileIdentityMapper;
impl IdentityMapper for ProfileIdentityMapper {
	fn info(&self, doc: &IdentityDocument) -> IdentityInfo {
		let first = doc.string("first_name").unwrap_or_default();
		let last = doc.string("last_name").unwrap_or_default();
		let name = format!("{first} {last}").trim().to_owned();
		let profile = ProfileInfo { name, image: doc.string("avatar_url") };

		IdentityInfo { profile: Some(profile), ..ContactIdentityMapper.info(doc) }
	}
}

/// Configuration switch between the shipped identity mappings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityVariant {
	/// `email` and `client_id` only.
	Contact,
	/// Contact fields plus `name` and `image`.
	#[default]
	Profile,
}
impl IdentityVariant {
	/// Returns the mapper implementing this variant.
	pub fn mapper(self) -> Arc<dyn IdentityMapper> {
		match self {
			Self::Contact => Arc::new(ContactIdentityMapper),
			Self::Profile => Arc::new(ProfileIdentityMapper),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn document(value: JsonValue) -> IdentityDocument {
		serde_json::from_value(value).expect("Identity fixture should be a JSON object.")
	}

	fn full_document() -> IdentityDocument {
		document(json!({
			"uid": "U",
			"email": "e@x.com",
			"client_id": "C",
			"first_name": "A",
			"last_name": "B",
			"avatar_url": "img"
		}))
	}

	#[test]
	fn profile_mapping_covers_every_field() {
		let doc = full_document();
		let mapper = ProfileIdentityMapper;

		assert_eq!(mapper.uid(&doc).expect("uid should be present."), "U");
		assert_eq!(
			mapper.info(&doc),
			IdentityInfo {
				email: Some("e@x.com".into()),
				client_id: Some("C".into()),
				profile: Some(ProfileInfo { name: "A B".into(), image: Some("img".into()) }),
			}
		);
		assert_eq!(mapper.extra(&doc).raw_info, doc);
	}

	#[test]
	fn contact_mapping_omits_profile_keys() {
		let doc = full_document();
		let info = ContactIdentityMapper.info(&doc);

		assert_eq!(info.name(), None);
		assert_eq!(info.image(), None);
		assert_eq!(
			serde_json::to_value(&info).expect("Info should serialize."),
			json!({ "email": "e@x.com", "client_id": "C" })
		);

		let profile = ProfileIdentityMapper.info(&doc);

		assert_eq!(
			serde_json::to_value(&profile).expect("Info should serialize."),
			json!({ "email": "e@x.com", "client_id": "C", "name": "A B", "image": "img" })
		);
	}

	#[test]
	fn name_trims_missing_parts() {
		let info = ProfileIdentityMapper.info(&document(json!({ "first_name": " Dummy" })));

		assert_eq!(info.name(), Some("Dummy"));

		let info = ProfileIdentityMapper.info(&document(json!({ "last_name": "User" })));

		assert_eq!(info.name(), Some("User"));

		let info = ProfileIdentityMapper.info(&document(json!({ "last_name": null })));

		assert_eq!(info.name(), Some(""));
		assert_eq!(info.image(), None);
	}

	#[test]
	fn uid_is_required_and_rendered_verbatim() {
		assert!(matches!(
			ProfileIdentityMapper.uid(&document(json!({ "email": "e@x.com" }))),
			Err(Error::MissingUid)
		));
		assert_eq!(
			ContactIdentityMapper
				.uid(&document(json!({ "uid": 42 })))
				.expect("Numeric uid should render."),
			"42"
		);
	}

	#[test]
	fn from_slice_rejects_non_objects() {
		assert!(IdentityDocument::from_slice(b"[1,2,3]").is_err());
		assert!(IdentityDocument::from_slice(b"not json").is_err());

		let doc = IdentityDocument::from_slice(br#"{"uid":"U"}"#)
			.expect("Object bodies should parse.");

		assert_eq!(doc.get("uid"), Some(&json!("U")));
	}

	#[test]
	fn variant_selects_mapper() {
		let doc = full_document();

		assert!(IdentityVariant::Contact.mapper().info(&doc).profile.is_none());
		assert!(IdentityVariant::Profile.mapper().info(&doc).profile.is_some());
		assert_eq!(IdentityVariant::default(), IdentityVariant::Profile);
	}
}
