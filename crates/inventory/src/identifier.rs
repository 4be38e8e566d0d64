//! Component identifier rules.
//!
//! An identifier is the short type name, optionally followed by an origin
//! suffix naming the discovery source the type comes from:
//! `ShortName@reversed.source.identifier`. Types from the primary module
//! carry no suffix.

/// Separates the short name from the origin suffix.
pub const ORIGIN_SEPARATOR: char = '@';

/// Returns the part of a qualified type name after its last namespace separator.
///
/// Both `::` and `.` are accepted as separators.
pub fn short_name(qualified: &str) -> &str {
	let tail = qualified.rsplit("::").next().unwrap_or(qualified);
	tail.rsplit('.').next().unwrap_or(tail)
}

/// Reverses the dot-separated components of a domain-style identifier.
///
/// The transformation is its own inverse.
pub fn reverse_domain(identifier: &str) -> String {
	identifier.split('.').rev().collect::<Vec<_>>().join(".")
}

/// Computes the identifier of a type.
///
/// `origin` is the identifier of the discovery source the type belongs to,
/// or `None` for the primary module.
pub fn identifier_for(qualified: &str, origin: Option<&str>) -> String {
	let name = short_name(qualified);
	match origin {
		Some(origin) => format!("{name}{ORIGIN_SEPARATOR}{}", reverse_domain(origin)),
		None => name.to_string(),
	}
}

/// Splits an identifier into its short name and origin suffix.
pub fn split_origin(identifier: &str) -> (&str, Option<&str>) {
	match identifier.split_once(ORIGIN_SEPARATOR) {
		Some((name, origin)) => (name, Some(origin)),
		None => (identifier, None),
	}
}

/// Returns the discovery source identifier an identifier's origin suffix names.
pub fn source_of(identifier: &str) -> Option<String> {
	split_origin(identifier).1.map(reverse_domain)
}
