//! Mock runtime for testing pallet-scheduled-transactions.
//!
//! The external collaborators (signing-requirements resolver, signature
//! verifier, capacity accountant, admin witness, consensus clock) are all
//! thread-local mocks so each test configures exactly the world it needs.

use core::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate as pallet_scheduled_transactions;
use frame_support::{
	derive_impl, parameter_types,
	traits::{ConstBool, ConstU32, Time},
};
use qp_schedule::{
	AdminKeyWitness, RawKey, RawSignaturePair, RequirementsError, ScheduleCapacity, ScheduleKey,
	SignatureVerifier, SigningRequirements, VerifiedSignature,
};
use sp_runtime::BuildStorage;

type Block = frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;

#[frame_support::runtime]
mod runtime {
	use super::*;

	#[runtime::runtime]
	#[runtime::derive(
		RuntimeCall,
		RuntimeEvent,
		RuntimeError,
		RuntimeOrigin,
		RuntimeFreezeReason,
		RuntimeHoldReason,
		RuntimeSlashReason,
		RuntimeLockId,
		RuntimeTask
	)]
	pub struct Test;

	#[runtime::pallet_index(0)]
	pub type System = frame_system::Pallet<Test>;

	#[runtime::pallet_index(1)]
	pub type ScheduledTransactions = pallet_scheduled_transactions::Pallet<Test>;
}

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
	type Block = Block;
}

type Moment = u64;

thread_local! {
	// Consensus clock, in milliseconds.
	static MOCKED_TIME: RefCell<Moment> = const { RefCell::new(0) };
	// body -> resolver verdict; unknown bodies resolve to "no requirements".
	static REQUIREMENTS: RefCell<BTreeMap<Vec<u8>, Result<Vec<ScheduleKey>, RequirementsError>>> =
		RefCell::new(BTreeMap::new());
	static ACCOUNT_KEYS: RefCell<BTreeMap<AccountId, ScheduleKey>> = RefCell::new(BTreeMap::new());
	// signature bytes -> verification outcome.
	static SIGNATURE_DICT: RefCell<BTreeMap<Vec<u8>, VerifiedSignature>> =
		RefCell::new(BTreeMap::new());
	// None = unlimited capacity; Some(n) = throttle past n replays.
	static CAPACITY_LIMIT: RefCell<Option<u64>> = const { RefCell::new(None) };
	static CAPACITY_GAS: RefCell<bool> = const { RefCell::new(false) };
	static CAPACITY_USED: RefCell<u64> = const { RefCell::new(0) };
	static CAPACITY_REPLAYS: RefCell<Vec<(Vec<u8>, u64)>> = RefCell::new(Vec::new());
	// None = admin enforcement disabled; Some(set) = only these accounts.
	static ADMIN_ACCOUNTS: RefCell<Option<BTreeSet<AccountId>>> = const { RefCell::new(None) };
}

pub struct MockTimestamp;

impl MockTimestamp {
	pub fn set_millis(now: Moment) {
		MOCKED_TIME.with(|v| *v.borrow_mut() = now);
	}

	pub fn set_seconds(now: u64) {
		Self::set_millis(now * 1000);
	}
}

impl Time for MockTimestamp {
	type Moment = Moment;
	fn now() -> Self::Moment {
		MOCKED_TIME.with(|v| *v.borrow())
	}
}

pub struct MockRequirements;

impl MockRequirements {
	pub fn require(body: &[u8], keys: Vec<ScheduleKey>) {
		REQUIREMENTS.with(|m| m.borrow_mut().insert(body.to_vec(), Ok(keys)));
	}

	pub fn fail(body: &[u8], error: RequirementsError) {
		REQUIREMENTS.with(|m| m.borrow_mut().insert(body.to_vec(), Err(error)));
	}

	pub fn set_account_key(who: AccountId, key: ScheduleKey) {
		ACCOUNT_KEYS.with(|m| m.borrow_mut().insert(who, key));
	}
}

impl SigningRequirements<AccountId> for MockRequirements {
	fn required_signers(body: &[u8]) -> Result<Vec<ScheduleKey>, RequirementsError> {
		REQUIREMENTS.with(|m| m.borrow().get(body).cloned().unwrap_or(Ok(Vec::new())))
	}

	fn account_key(who: &AccountId) -> Option<ScheduleKey> {
		ACCOUNT_KEYS.with(|m| m.borrow().get(who).cloned())
	}
}

pub struct MockVerifier;

impl MockVerifier {
	pub fn register_signature(signature: &[u8], key: RawKey, valid: bool) {
		SIGNATURE_DICT
			.with(|m| m.borrow_mut().insert(signature.to_vec(), VerifiedSignature { key, valid }));
	}
}

impl SignatureVerifier for MockVerifier {
	fn verify(_body: &[u8], pairs: &[RawSignaturePair]) -> Vec<VerifiedSignature> {
		SIGNATURE_DICT.with(|m| {
			let dict = m.borrow();
			pairs.iter().filter_map(|pair| dict.get(&pair.signature).cloned()).collect()
		})
	}
}

pub struct MockCapacity;

impl MockCapacity {
	pub fn set_limit(limit: Option<u64>) {
		CAPACITY_LIMIT.with(|v| *v.borrow_mut() = limit);
	}

	pub fn set_gas_throttled(gas: bool) {
		CAPACITY_GAS.with(|v| *v.borrow_mut() = gas);
	}

	/// Drain the replay log recorded since the last call.
	pub fn take_replays() -> Vec<(Vec<u8>, u64)> {
		CAPACITY_REPLAYS.with(|v| core::mem::take(&mut *v.borrow_mut()))
	}
}

impl ScheduleCapacity for MockCapacity {
	fn reset() {
		CAPACITY_USED.with(|v| *v.borrow_mut() = 0);
	}

	fn should_throttle(body: &[u8], at_nanos: u64) -> bool {
		CAPACITY_REPLAYS.with(|v| v.borrow_mut().push((body.to_vec(), at_nanos)));
		let used = CAPACITY_USED.with(|v| {
			let mut used = v.borrow_mut();
			*used += 1;
			*used
		});
		CAPACITY_LIMIT.with(|v| v.borrow().map_or(false, |limit| used > limit))
	}

	fn last_throttle_was_gas() -> bool {
		CAPACITY_GAS.with(|v| *v.borrow())
	}
}

pub struct MockAdminWitness;

impl MockAdminWitness {
	/// Restrict admin-key possession to the given accounts. Until called,
	/// enforcement is disabled and every caller passes.
	pub fn restrict_to(accounts: &[AccountId]) {
		ADMIN_ACCOUNTS.with(|v| *v.borrow_mut() = Some(accounts.iter().copied().collect()));
	}
}

impl AdminKeyWitness<AccountId> for MockAdminWitness {
	fn holds_key(who: &AccountId, _key: &ScheduleKey) -> bool {
		ADMIN_ACCOUNTS.with(|v| v.borrow().as_ref().map_or(true, |set| set.contains(who)))
	}
}

parameter_types! {
	pub const DefaultExpirySecondsParam: u64 = 1800;
	// 62 days, the production default for how far ahead a schedule may expire.
	pub const MaxExpirationFutureParam: u64 = 5_356_800;
}

impl pallet_scheduled_transactions::Config for Test {
	type RuntimeCall = RuntimeCall;
	type TimeProvider = MockTimestamp;
	type SigningRequirements = MockRequirements;
	type SignatureVerifier = MockVerifier;
	type Capacity = MockCapacity;
	type AdminWitness = MockAdminWitness;
	type DedupOnCreate = ConstBool<true>;
	type DefaultExpirySeconds = DefaultExpirySecondsParam;
	type MaxExpirationFuture = MaxExpirationFutureParam;
	type MaxMemoLen = ConstU32<100>;
	type MaxKeyLen = ConstU32<1024>;
	type MaxBodyLen = ConstU32<1024>;
	type MaxSignatories = ConstU32<10>;
	type MaxSchedulesPerSecond = ConstU32<5>;
	type MaxPendingSeconds = ConstU32<16>;
	type MaxReadyQueue = ConstU32<8>;
	type MaxDigestCollisions = ConstU32<4>;
	type WeightInfo = ();
}

pub fn new_test_ext() -> sp_io::TestExternalities {
	let t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();
	let mut ext: sp_io::TestExternalities = t.into();
	ext.execute_with(|| {
		System::set_block_number(1);
		MockTimestamp::set_seconds(100);
		// Autonomous execution is opt-in network-wide; almost every test
		// wants it on.
		pallet_scheduled_transactions::LongTermSchedulingEnabled::<Test>::put(true);
	});
	ext
}

/// Externalities with autonomous execution left at its genesis default (off).
pub fn new_test_ext_long_term_disabled() -> sp_io::TestExternalities {
	let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();
	pallet_scheduled_transactions::GenesisConfig::<Test> {
		long_term_scheduling_enabled: false,
		..Default::default()
	}
	.assimilate_storage(&mut t)
	.unwrap();
	let mut ext: sp_io::TestExternalities = t.into();
	ext.execute_with(|| {
		System::set_block_number(1);
		MockTimestamp::set_seconds(100);
	});
	ext
}
