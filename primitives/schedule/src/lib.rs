//! Scheduled-Transaction Primitives
//!
//! This crate provides the shared abstractions between
//! `pallet-scheduled-transactions` and the runtime-level collaborators it
//! consumes as black boxes:
//!
//! - **Key structures**: the recursive [`ScheduleKey`] type (single keys, key
//!   lists, threshold keys) together with structural validation, prefix
//!   matching and the recursive activation test used to decide whether a
//!   scheduled transaction has collected every required signature.
//! - **Signing-requirements resolution**: [`SigningRequirements`], the engine
//!   that computes which keys must sign a given wrapped transaction.
//! - **Signature verification**: [`SignatureVerifier`], the cryptographic
//!   layer that expands a raw signature map into per-key validity records.
//! - **Capacity accounting**: [`ScheduleCapacity`], the resettable usage
//!   counter used to simulate future network load at schedule-creation time.
//! - **Admin-key checks**: [`AdminKeyWitness`], consulted when a schedule is
//!   deleted before resolution.
//!
//! All traits follow the runtime-bridge pattern: they are implemented at the
//! runtime level and passed into the pallet through its `Config`, breaking
//! any dependency between the scheduler and the concrete key/crypto/throttle
//! machinery. Every trait has a `()` implementation that disables the
//! corresponding check, for test environments and gradual rollout.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode};
use scale_info::TypeInfo;

/// Raw bytes of a primitive (leaf) public key.
pub type RawKey = [u8; 32];

/// Maximum nesting depth accepted for composite keys.
///
/// Keys deeper than this fail structural validation; the bound keeps the
/// recursive activation test stack-safe on every replica.
pub const MAX_KEY_DEPTH: u32 = 15;

/// A key structure that can authorize a scheduled transaction.
///
/// Composite variants nest arbitrarily (up to [`MAX_KEY_DEPTH`]): a threshold
/// key of key lists of single keys is a perfectly normal requirement for an
/// institutional account.
#[derive(Encode, Decode, DecodeWithMemTracking, Clone, PartialEq, Eq, TypeInfo, Debug)]
pub enum ScheduleKey {
	/// A primitive public key.
	Single(RawKey),
	/// Every member key must activate.
	List(Vec<ScheduleKey>),
	/// At least `required` member keys must activate.
	Threshold { required: u32, keys: Vec<ScheduleKey> },
}

/// Structural defects detectable without any cryptography.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyError {
	/// A list or threshold key with no members.
	EmptyKeyList,
	/// A threshold of zero, or one exceeding the member count.
	InvalidThreshold,
	/// Nesting beyond [`MAX_KEY_DEPTH`].
	TooDeeplyNested,
}

impl ScheduleKey {
	/// Validate the key structure (threshold math, emptiness, nesting depth).
	pub fn validate(&self) -> Result<(), KeyError> {
		self.validate_at_depth(0)
	}

	fn validate_at_depth(&self, depth: u32) -> Result<(), KeyError> {
		if depth > MAX_KEY_DEPTH {
			return Err(KeyError::TooDeeplyNested);
		}
		match self {
			ScheduleKey::Single(_) => Ok(()),
			ScheduleKey::List(keys) => {
				if keys.is_empty() {
					return Err(KeyError::EmptyKeyList);
				}
				for key in keys {
					key.validate_at_depth(depth + 1)?;
				}
				Ok(())
			},
			ScheduleKey::Threshold { required, keys } => {
				if keys.is_empty() {
					return Err(KeyError::EmptyKeyList);
				}
				if *required == 0 || *required as usize > keys.len() {
					return Err(KeyError::InvalidThreshold);
				}
				for key in keys {
					key.validate_at_depth(depth + 1)?;
				}
				Ok(())
			},
		}
	}

	/// Recursive activation test.
	///
	/// `is_valid` is the per-leaf validity predicate (typically membership in
	/// a schedule's signatory set). A list activates when every member does;
	/// a threshold key when at least `required` members do.
	pub fn is_active(&self, is_valid: &impl Fn(&RawKey) -> bool) -> bool {
		match self {
			ScheduleKey::Single(raw) => is_valid(raw),
			ScheduleKey::List(keys) => keys.iter().all(|k| k.is_active(is_valid)),
			ScheduleKey::Threshold { required, keys } => {
				let active = keys.iter().filter(|k| k.is_active(is_valid)).count();
				active as u32 >= *required
			},
		}
	}

	/// Whether any leaf key of this structure starts with `prefix`.
	///
	/// An empty prefix matches every leaf, mirroring the transport-layer
	/// convention that an omitted prefix addresses all candidate keys.
	pub fn any_leaf_matches_prefix(&self, prefix: &[u8]) -> bool {
		match self {
			ScheduleKey::Single(raw) => raw.starts_with(prefix),
			ScheduleKey::List(keys) | ScheduleKey::Threshold { keys, .. } =>
				keys.iter().any(|k| k.any_leaf_matches_prefix(prefix)),
		}
	}

	/// Collect all leaf keys, depth-first, left to right.
	pub fn leaves(&self) -> Vec<RawKey> {
		let mut out = Vec::new();
		self.collect_leaves(&mut out);
		out
	}

	fn collect_leaves(&self, out: &mut Vec<RawKey>) {
		match self {
			ScheduleKey::Single(raw) => out.push(*raw),
			ScheduleKey::List(keys) | ScheduleKey::Threshold { keys, .. } =>
				keys.iter().for_each(|k| k.collect_leaves(out)),
		}
	}
}

/// One cryptographically checked signature over a scheduled payload: the full
/// key it resolved to, and whether the signature actually verified.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VerifiedSignature {
	pub key: RawKey,
	pub valid: bool,
}

/// A (key-prefix, signature) pair exactly as submitted, before any
/// verification.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawSignaturePair {
	pub prefix: Vec<u8>,
	pub signature: Vec<u8>,
}

/// Why the signing-requirements resolver could not produce a key list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RequirementsError {
	/// The wrapped transaction is malformed or its signers cannot be
	/// determined.
	Unresolvable,
	/// The wrapped transaction type is not allowed to be scheduled.
	Unschedulable,
}

/// The general signing-requirements engine, consumed as a black box.
///
/// Implemented at the runtime level where account keys and transaction
/// parsing live; the scheduler only needs the ordered key list for a wrapped
/// transaction and the key structure of an account.
pub trait SigningRequirements<AccountId> {
	/// Ordered list of keys that must sign the wrapped transaction, excluding
	/// the payer (whose own requirement is satisfied by the top-level
	/// transaction).
	fn required_signers(body: &[u8]) -> Result<Vec<ScheduleKey>, RequirementsError>;

	/// The key structure controlling `who`, if the account exists.
	fn account_key(who: &AccountId) -> Option<ScheduleKey>;
}

/// No signing requirements: every schedule is trivially fully authorized.
impl<AccountId> SigningRequirements<AccountId> for () {
	fn required_signers(_body: &[u8]) -> Result<Vec<ScheduleKey>, RequirementsError> {
		Ok(Vec::new())
	}

	fn account_key(_who: &AccountId) -> Option<ScheduleKey> {
		None
	}
}

/// The cryptographic verification layer.
///
/// Expands a raw signature map against a scheduled payload into per-key
/// validity records. Pairs whose prefix resolves to no candidate key are
/// simply absent from the output; the classifier treats them as no-match.
pub trait SignatureVerifier {
	fn verify(body: &[u8], pairs: &[RawSignaturePair]) -> Vec<VerifiedSignature>;
}

/// No verification: every submission expands to nothing.
impl SignatureVerifier for () {
	fn verify(_body: &[u8], _pairs: &[RawSignaturePair]) -> Vec<VerifiedSignature> {
		Vec::new()
	}
}

/// A resettable usage accountant approximating network capacity consumption.
///
/// The scheduler uses it exclusively for the future-congestion simulation run
/// at schedule-creation time: `reset` is called at the start of every
/// simulation and accumulated usage is never persisted. Persisting simulated
/// usage would double-count capacity when the transactions actually execute.
pub trait ScheduleCapacity {
	/// Clear all accumulated usage.
	fn reset();

	/// Account for executing `body` at `at_nanos` and report whether any
	/// capacity budget is exceeded.
	fn should_throttle(body: &[u8], at_nanos: u64) -> bool;

	/// Whether the most recent `should_throttle` hit was caused by the
	/// execution-gas budget rather than a general rate limit.
	fn last_throttle_was_gas() -> bool;
}

/// Unlimited capacity: nothing ever throttles.
impl ScheduleCapacity for () {
	fn reset() {}

	fn should_throttle(_body: &[u8], _at_nanos: u64) -> bool {
		false
	}

	fn last_throttle_was_gas() -> bool {
		false
	}
}

/// Admin-key possession check for schedule deletion.
///
/// Implemented at the runtime level against whatever account/key machinery
/// the chain uses.
pub trait AdminKeyWitness<AccountId> {
	/// Whether `who` is authorized under `key`.
	fn holds_key(who: &AccountId, key: &ScheduleKey) -> bool;
}

/// Disables admin-key enforcement: any caller may delete.
impl<AccountId> AdminKeyWitness<AccountId> for () {
	fn holds_key(_who: &AccountId, _key: &ScheduleKey) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloc::vec;

	fn raw(byte: u8) -> RawKey {
		[byte; 32]
	}

	#[test]
	fn validates_threshold_math() {
		let key = ScheduleKey::Threshold {
			required: 2,
			keys: vec![ScheduleKey::Single(raw(1)), ScheduleKey::Single(raw(2))],
		};
		assert_eq!(key.validate(), Ok(()));

		let zero = ScheduleKey::Threshold { required: 0, keys: vec![ScheduleKey::Single(raw(1))] };
		assert_eq!(zero.validate(), Err(KeyError::InvalidThreshold));

		let over = ScheduleKey::Threshold {
			required: 3,
			keys: vec![ScheduleKey::Single(raw(1)), ScheduleKey::Single(raw(2))],
		};
		assert_eq!(over.validate(), Err(KeyError::InvalidThreshold));

		let empty = ScheduleKey::List(vec![]);
		assert_eq!(empty.validate(), Err(KeyError::EmptyKeyList));
	}

	#[test]
	fn rejects_over_deep_nesting() {
		let mut key = ScheduleKey::Single(raw(1));
		for _ in 0..(MAX_KEY_DEPTH + 1) {
			key = ScheduleKey::List(vec![key]);
		}
		assert_eq!(key.validate(), Err(KeyError::TooDeeplyNested));
	}

	#[test]
	fn threshold_activation_counts_members() {
		let key = ScheduleKey::Threshold {
			required: 2,
			keys: vec![
				ScheduleKey::Single(raw(1)),
				ScheduleKey::Single(raw(2)),
				ScheduleKey::Single(raw(3)),
			],
		};
		assert!(!key.is_active(&|k| k == &raw(1)));
		assert!(key.is_active(&|k| k == &raw(1) || k == &raw(3)));
	}

	#[test]
	fn list_activation_requires_all_members() {
		let key = ScheduleKey::List(vec![ScheduleKey::Single(raw(1)), ScheduleKey::Single(raw(2))]);
		assert!(!key.is_active(&|k| k == &raw(1)));
		assert!(key.is_active(&|_| true));
	}

	#[test]
	fn nested_activation_recurses() {
		let inner = ScheduleKey::Threshold {
			required: 1,
			keys: vec![ScheduleKey::Single(raw(1)), ScheduleKey::Single(raw(2))],
		};
		let key = ScheduleKey::List(vec![inner, ScheduleKey::Single(raw(3))]);
		assert!(key.is_active(&|k| k == &raw(2) || k == &raw(3)));
		assert!(!key.is_active(&|k| k == &raw(2)));
	}

	#[test]
	fn prefix_matching_walks_leaves() {
		let key = ScheduleKey::List(vec![ScheduleKey::Single(raw(7)), ScheduleKey::Single(raw(9))]);
		assert!(key.any_leaf_matches_prefix(&[7, 7]));
		assert!(!key.any_leaf_matches_prefix(&[8]));
		// An empty prefix addresses every leaf.
		assert!(key.any_leaf_matches_prefix(&[]));
	}

	#[test]
	fn leaves_are_depth_first() {
		let key = ScheduleKey::Threshold {
			required: 1,
			keys: vec![
				ScheduleKey::List(vec![ScheduleKey::Single(raw(1)), ScheduleKey::Single(raw(2))]),
				ScheduleKey::Single(raw(3)),
			],
		};
		assert_eq!(key.leaves(), vec![raw(1), raw(2), raw(3)]);
	}
}
