//! Chunk keys: hierarchical byte-addresses for the durable chunk store (C1).

/// The delimiter joining key segments in their encoded storage form. A NUL
/// octet cannot appear inside a segment produced by any caller in this
/// crate, so this is safe as a separator.
const SEGMENT_DELIMITER: char = '\u{0}';

/// An ordered sequence of one or more string segments identifying a chunk.
///
/// `ChunkKey(["doc", "x"])` is distinct from, and never matched by a prefix
/// query for, `ChunkKey(["document"])` — segments are matched exactly, never
/// as string prefixes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkKey(pub Vec<Box<str>>);

impl ChunkKey {
	pub fn new(segments: impl IntoIterator<Item = impl Into<Box<str>>>) -> Self {
		ChunkKey(segments.into_iter().map(Into::into).collect())
	}

	/// Join segments with the reserved delimiter for on-disk storage.
	pub fn encode(&self) -> String {
		self.0.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(&SEGMENT_DELIMITER.to_string())
	}

	pub fn decode(encoded: &str) -> Self {
		if encoded.is_empty() {
			return ChunkKey(Vec::new());
		}
		ChunkKey(encoded.split(SEGMENT_DELIMITER).map(Box::from).collect())
	}

	/// True when `self` is the prefix itself, or `self` extends `prefix` by
	/// one or more whole segments.
	pub fn matches_prefix(&self, prefix: &ChunkKey) -> bool {
		if self.0.len() < prefix.0.len() {
			return false;
		}
		self.0[..prefix.0.len()] == prefix.0[..]
	}

	/// Lower bound for a redb range scan over every key beginning with this prefix.
	pub fn range_start(&self) -> String {
		self.encode()
	}

	/// String-level equivalent of [`Self::matches_prefix`], for adapters that
	/// iterate raw encoded keys during a range scan and want to avoid
	/// decoding every candidate before filtering.
	pub fn encoded_matches_prefix(stored: &str, encoded_prefix: &str) -> bool {
		if encoded_prefix.is_empty() {
			return true;
		}
		stored == encoded_prefix
			|| stored
				.strip_prefix(encoded_prefix)
				.is_some_and(|rest| rest.starts_with(SEGMENT_DELIMITER))
	}
}

impl From<&str> for ChunkKey {
	fn from(s: &str) -> Self {
		ChunkKey::new([s])
	}
}

impl<const N: usize> From<[&str; N]> for ChunkKey {
	fn from(segments: [&str; N]) -> Self {
		ChunkKey::new(segments)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encode_decode_round_trip() {
		let key = ChunkKey::new(["doc", "x"]);
		assert_eq!(ChunkKey::decode(&key.encode()), key);
	}

	#[test]
	fn empty_key_round_trips() {
		let key = ChunkKey(Vec::new());
		assert_eq!(key.encode(), "");
		assert_eq!(ChunkKey::decode(""), key);
	}

	#[test]
	fn prefix_matches_extension() {
		let prefix = ChunkKey::new(["doc"]);
		assert!(ChunkKey::new(["doc"]).matches_prefix(&prefix));
		assert!(ChunkKey::new(["doc", "x"]).matches_prefix(&prefix));
		assert!(!ChunkKey::new(["document"]).matches_prefix(&prefix));
		assert!(!ChunkKey::new(["do"]).matches_prefix(&prefix));
	}

	#[test]
	fn prefix_does_not_match_sibling_with_shared_characters() {
		let prefix = ChunkKey::new(["doc"]);
		assert!(!ChunkKey::new(["doc2"]).matches_prefix(&prefix));
	}

	#[test]
	fn encoded_prefix_matching_mirrors_segment_matching() {
		let prefix = ChunkKey::new(["doc"]).encode();
		assert!(ChunkKey::encoded_matches_prefix("doc", &prefix));
		assert!(ChunkKey::encoded_matches_prefix(&ChunkKey::new(["doc", "x"]).encode(), &prefix));
		assert!(!ChunkKey::encoded_matches_prefix("doc2", &prefix));
		assert!(!ChunkKey::encoded_matches_prefix("document", &prefix));
	}

	#[test]
	fn empty_prefix_matches_everything() {
		assert!(ChunkKey::encoded_matches_prefix("anything", ""));
	}
}

// vim: ts=4
