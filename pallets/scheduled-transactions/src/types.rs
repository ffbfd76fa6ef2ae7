//! Type definitions for the scheduled-transactions pallet

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame_support::{traits::ConstU32, BoundedVec};
use scale_info::TypeInfo;
use sp_runtime::RuntimeDebug;

use alloc::vec::Vec;

/// Unique, monotonically assigned schedule identifier (ledger entity number).
pub type ScheduleId = u64;

/// A whole consensus second since the unix epoch.
pub type UnixSeconds = u64;

/// A consensus instant in nanoseconds since the unix epoch.
pub type UnixNanos = u64;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub const NANOS_PER_MILLISECOND: u64 = 1_000_000;

/// The persisted record of a deferred transaction.
///
/// Mutable while pending; logically frozen once `executed` or `deleted` is
/// set, except for being removed from the indices.
#[derive(Encode, Decode, MaxEncodedLen, Clone, TypeInfo, RuntimeDebug, PartialEq, Eq)]
pub struct Schedule<AccountId, BoundedKey, BoundedMemo, BoundedBody, BoundedSignatories> {
	/// Explicit fee payer; the creator pays when absent.
	pub payer: Option<AccountId>,
	/// Account that created the schedule.
	pub creator: AccountId,
	/// Consensus time of the creating transaction, in nanoseconds. Together
	/// with `creator` it identifies the synthetic transaction the eventual
	/// execution is recorded under.
	pub valid_start: UnixNanos,
	/// SCALE-encoded `ScheduleKey` authorized to delete the schedule before
	/// resolution. Schedules without one are immutable.
	pub admin_key: Option<BoundedKey>,
	/// Semantically meaningful short text; part of the equality digest.
	pub memo: BoundedMemo,
	/// When true the schedule never executes early, only at expiry.
	pub wait_for_expiry: bool,
	/// Expiry second as submitted by the creator, if any; part of the
	/// equality digest.
	pub provided_expiry: Option<UnixSeconds>,
	/// Calculated consensus second at which the schedule becomes due.
	pub expiry_second: UnixSeconds,
	/// SCALE-encoded wrapped call, opaque to this pallet beyond
	/// required-signer resolution and decode-at-dispatch.
	pub body: BoundedBody,
	/// Raw public keys that presented a valid signature over the wrapped
	/// transaction. Set semantics: re-adding an existing key is a no-op.
	pub signatories: BoundedSignatories,
	/// Terminal flag: the wrapped transaction was dispatched.
	pub executed: bool,
	/// Terminal flag: deleted by the admin key, or force-expired.
	pub deleted: bool,
	/// Consensus time at which a terminal flag was set.
	pub resolution_time: Option<UnixNanos>,
	/// Cached content digest of the defining fields, kept so the equality
	/// index can be maintained without re-encoding on resolution.
	pub equality_digest: [u8; 32],
}

impl<AccountId, BoundedKey, BoundedMemo, BoundedBody, BoundedSignatories>
	Schedule<AccountId, BoundedKey, BoundedMemo, BoundedBody, BoundedSignatories>
{
	pub fn is_pending(&self) -> bool {
		!self.executed && !self.deleted
	}

	/// The account the eventual execution is dispatched as.
	pub fn effective_payer(&self) -> &AccountId {
		self.payer.as_ref().unwrap_or(&self.creator)
	}
}

/// One entry of a signing submission: a public-key prefix and the signature
/// claimed to come from a key starting with that prefix.
#[derive(
	Encode, Decode, DecodeWithMemTracking, MaxEncodedLen, Clone, TypeInfo, RuntimeDebug, PartialEq, Eq,
)]
pub struct SignaturePair {
	pub prefix: BoundedVec<u8, ConstU32<32>>,
	pub signature: BoundedVec<u8, ConstU32<64>>,
}

/// A schedule the engine selected for execution in the current round.
///
/// By the time the caller sees this value the schedule is already marked
/// executed and removed from the indices, so dropping it cannot lead to a
/// second execution.
#[derive(Clone, PartialEq, Eq, RuntimeDebug)]
pub struct TriggeredSchedule<AccountId, Call> {
	pub id: ScheduleId,
	/// Effective payer; the call is dispatched with this signed origin.
	pub payer: AccountId,
	pub creator: AccountId,
	pub valid_start: UnixNanos,
	pub call: Call,
}

/// Content digest over a schedule's defining fields.
///
/// Covers exactly `memo`, the encoded admin key, the wrapped body, the
/// expiry second as provided (not as calculated) and the wait-for-expiry
/// flag. Payer, creator and signatories are deliberately excluded so that
/// functionally identical requests from different payers collide and can be
/// deduplicated.
pub fn equality_digest(
	memo: &[u8],
	admin_key: Option<&[u8]>,
	body: &[u8],
	provided_expiry: Option<UnixSeconds>,
	wait_for_expiry: bool,
) -> [u8; 32] {
	let mut data = Vec::new();
	memo.encode_to(&mut data);
	admin_key.encode_to(&mut data);
	body.encode_to(&mut data);
	provided_expiry.encode_to(&mut data);
	wait_for_expiry.encode_to(&mut data);
	sp_io::hashing::blake2_256(&data)
}

/// The 64-bit equality-index bucket for a digest: its first eight bytes,
/// little endian. Bucket collisions are expected and survived by keying the
/// bucket contents with the full digest.
pub fn equality_bucket(digest: &[u8; 32]) -> u64 {
	u64::from_le_bytes(digest[0..8].try_into().expect("digest is 32 bytes; qed"))
}
