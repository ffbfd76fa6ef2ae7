//! Signature classification for signing submissions
//!
//! A signing submission carries (public-key-prefix, signature) pairs that may
//! target either the payer's key structure or the scheduled transaction's key
//! structure. Each submitted prefix is classified against both, and the whole
//! submission is rejected as soon as any prefix resolves to a
//! cryptographically invalid signature over the scheduled payload.

use alloc::vec::Vec;
use qp_schedule::{RawKey, RawSignaturePair, ScheduleKey, VerifiedSignature};

/// Classification of one submitted signature prefix.
///
/// The declaration order is the total priority order: when a prefix matches
/// several ways, it is classified as the highest-priority match observed.
/// `InvalidScheduledMatch` outranks `ValidScheduledMatch` so that an invalid
/// signature can never be masked by another key sharing the prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum SigClassification {
	/// The prefix matches neither key structure.
	NoMatch,
	/// The prefix only matches a leaf of the payer's key structure.
	PayerMatch,
	/// The prefix matches a key that validly signed the scheduled payload.
	ValidScheduledMatch,
	/// The prefix matches a key whose signature over the scheduled payload
	/// failed verification.
	InvalidScheduledMatch,
}

/// Classify a single prefix against the payer key structure and the verified
/// signatures over the scheduled payload.
pub fn classify_prefix(
	prefix: &[u8],
	payer_key: Option<&ScheduleKey>,
	verified: &[VerifiedSignature],
) -> SigClassification {
	let mut classification = SigClassification::NoMatch;
	if payer_key.is_some_and(|key| key.any_leaf_matches_prefix(prefix)) {
		classification = classification.max(SigClassification::PayerMatch);
	}
	for signature in verified.iter().filter(|s| s.key.starts_with(prefix)) {
		let observed = if signature.valid {
			SigClassification::ValidScheduledMatch
		} else {
			SigClassification::InvalidScheduledMatch
		};
		classification = classification.max(observed);
	}
	classification
}

/// Classify a whole submission.
///
/// Returns the deduplicated full keys that validly signed the scheduled
/// payload, in submission order, or `Err(())` when any prefix resolved to an
/// invalid signature over the scheduled payload — in which case the caller
/// must reject the submission without merging anything.
pub fn classify_submission(
	pairs: &[RawSignaturePair],
	payer_key: Option<&ScheduleKey>,
	verified: &[VerifiedSignature],
) -> Result<Vec<RawKey>, ()> {
	let mut valid_keys: Vec<RawKey> = Vec::new();
	for pair in pairs {
		match classify_prefix(&pair.prefix, payer_key, verified) {
			SigClassification::InvalidScheduledMatch => return Err(()),
			SigClassification::ValidScheduledMatch => {
				for signature in
					verified.iter().filter(|s| s.valid && s.key.starts_with(pair.prefix.as_slice()))
				{
					if !valid_keys.contains(&signature.key) {
						valid_keys.push(signature.key);
					}
				}
			},
			SigClassification::NoMatch | SigClassification::PayerMatch => {},
		}
	}
	Ok(valid_keys)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloc::vec;

	fn raw(byte: u8) -> RawKey {
		[byte; 32]
	}

	fn pair(prefix: &[u8]) -> RawSignaturePair {
		RawSignaturePair { prefix: prefix.to_vec(), signature: vec![0u8; 64] }
	}

	#[test]
	fn classification_order_is_total() {
		use SigClassification::*;
		let all = [NoMatch, PayerMatch, ValidScheduledMatch, InvalidScheduledMatch];
		// Every pair is strictly ordered by declaration position.
		for (i, a) in all.iter().enumerate() {
			for (j, b) in all.iter().enumerate() {
				assert_eq!(a.cmp(b), i.cmp(&j), "{a:?} vs {b:?}");
				assert_eq!(a.max(b), if i >= j { a } else { b });
			}
		}
	}

	#[test]
	fn prefix_with_no_match_classifies_no_match() {
		assert_eq!(classify_prefix(&[1], None, &[]), SigClassification::NoMatch);
	}

	#[test]
	fn payer_leaf_prefix_classifies_payer_match() {
		let payer = ScheduleKey::Single(raw(5));
		assert_eq!(classify_prefix(&[5, 5], Some(&payer), &[]), SigClassification::PayerMatch);
	}

	#[test]
	fn valid_scheduled_signature_outranks_payer_match() {
		// One prefix addressing both structures resolves to the
		// scheduled-transaction classification.
		let payer = ScheduleKey::Single(raw(5));
		let verified = [VerifiedSignature { key: raw(5), valid: true }];
		assert_eq!(
			classify_prefix(&[5], Some(&payer), &verified),
			SigClassification::ValidScheduledMatch
		);
	}

	#[test]
	fn invalid_scheduled_signature_outranks_everything() {
		let payer = ScheduleKey::Single(raw(5));
		let verified = [
			VerifiedSignature { key: raw(5), valid: true },
			VerifiedSignature { key: raw(5), valid: false },
		];
		assert_eq!(
			classify_prefix(&[5], Some(&payer), &verified),
			SigClassification::InvalidScheduledMatch
		);
	}

	#[test]
	fn submission_collects_valid_keys_in_order() {
		let verified = [
			VerifiedSignature { key: raw(2), valid: true },
			VerifiedSignature { key: raw(1), valid: true },
		];
		let keys =
			classify_submission(&[pair(&[2]), pair(&[1])], None, &verified).expect("no invalid sigs");
		assert_eq!(keys, vec![raw(2), raw(1)]);
	}

	#[test]
	fn submission_deduplicates_keys_matched_twice() {
		let verified = [VerifiedSignature { key: raw(3), valid: true }];
		// Two prefixes of different length resolving to the same key.
		let keys = classify_submission(&[pair(&[3]), pair(&[3, 3])], None, &verified)
			.expect("no invalid sigs");
		assert_eq!(keys, vec![raw(3)]);
	}

	#[test]
	fn one_invalid_signature_rejects_the_whole_submission() {
		let verified = [
			VerifiedSignature { key: raw(1), valid: true },
			VerifiedSignature { key: raw(2), valid: false },
		];
		assert_eq!(classify_submission(&[pair(&[1]), pair(&[2])], None, &verified), Err(()));
	}

	#[test]
	fn payer_only_prefixes_contribute_no_keys() {
		let payer = ScheduleKey::List(vec![ScheduleKey::Single(raw(7))]);
		let keys = classify_submission(&[pair(&[7])], Some(&payer), &[]).expect("payer-only is ok");
		assert!(keys.is_empty());
	}
}
