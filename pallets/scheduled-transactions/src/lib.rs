//! # Quantus Scheduled Transactions Pallet
//!
//! This pallet is the deferred/conditional transaction scheduler of the
//! chain: a transaction is registered once, collects authorizing signatures
//! over time, and is executed autonomously — exactly once, deterministically,
//! on every replica — once it is fully authorized or its expiry second is
//! reached.
//!
//! ## Features
//!
//! - Register a wrapped call with an optional admin key, memo, explicit payer
//!   and expiry
//! - Content-addressed duplicate detection (identical pending schedules are
//!   deduplicated across payers)
//! - Collect signatures over the wrapped transaction; a schedule that becomes
//!   fully authorized executes early unless it opted to wait for expiry
//! - Per-round engine drive: expire due schedules, execute at most one ready
//!   schedule per round, in deterministic `(second, id)` order
//! - Future-congestion simulation at creation time, so a schedule is only
//!   accepted if the network can absorb its execution second
//!
//! ## Data Structures
//!
//! - **Schedule**: payload, authorization requirements, signatory set and
//!   resolution state of one deferred transaction
//! - **ByEquality**: 64-bit content-hash buckets keyed by full digest, for
//!   duplicate detection resistant to hash collisions
//! - **ExpiryBuckets / ExpiryQueue**: schedule ids bucketed by expiry second,
//!   plus the ordered list of non-empty seconds the engine scans
//! - **ReadyQueue**: schedules that became fully authorized early and await
//!   pickup by the engine

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
use alloc::vec::Vec;
pub use pallet::*;
pub use weights::*;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

#[cfg(test)]
mod mock;


mod classify;
mod engine;
mod types;
pub mod weights;

pub use classify::SigClassification;
pub use types::*;

pub(crate) const LOG_TARGET: &str = "scheduled-transactions";

#[frame_support::pallet]
pub mod pallet {
	use super::*;
	use codec::Decode;
	use frame_support::{
		dispatch::{GetDispatchInfo, PostDispatchInfo},
		pallet_prelude::*,
		traits::{Get, Time},
	};
	use frame_system::pallet_prelude::*;
	use qp_schedule::{
		AdminKeyWitness, RawSignaturePair, RequirementsError, ScheduleCapacity, ScheduleKey,
		SignatureVerifier, SigningRequirements,
	};
	use sp_runtime::traits::{Dispatchable, SaturatedConversion};

	#[pallet::pallet]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
		/// The overarching call type wrapped calls decode into
		type RuntimeCall: Parameter
			+ Dispatchable<RuntimeOrigin = Self::RuntimeOrigin, PostInfo = PostDispatchInfo>
			+ GetDispatchInfo
			+ From<frame_system::Call<Self>>
			+ codec::Decode;

		/// Consensus clock, in milliseconds since the unix epoch. Every
		/// replica observes the identical value for a given round.
		type TimeProvider: Time;

		/// The signing-requirements resolver: which keys must sign a wrapped
		/// transaction, and the key structure of an account
		type SigningRequirements: SigningRequirements<Self::AccountId>;

		/// Cryptographic verification of signing submissions
		type SignatureVerifier: SignatureVerifier;

		/// Resettable usage accountant for the future-congestion simulation
		type Capacity: ScheduleCapacity;

		/// Admin-key possession check for schedule deletion
		type AdminWitness: AdminKeyWitness<Self::AccountId>;

		/// Whether creation of a schedule identical to a pending one returns
		/// the existing id instead of registering a duplicate
		#[pallet::constant]
		type DedupOnCreate: Get<bool>;

		/// Expiry applied when the creator provides none, in seconds
		#[pallet::constant]
		type DefaultExpirySeconds: Get<u64>;

		/// Maximum distance of an explicit expiry from the current consensus
		/// second
		#[pallet::constant]
		type MaxExpirationFuture: Get<u64>;

		/// Maximum memo length in bytes
		#[pallet::constant]
		type MaxMemoLen: Get<u32>;

		/// Maximum size of an encoded admin key
		#[pallet::constant]
		type MaxKeyLen: Get<u32>;

		/// Maximum size of an encoded wrapped call
		#[pallet::constant]
		type MaxBodyLen: Get<u32>;

		/// Maximum number of signatories one schedule can accumulate
		#[pallet::constant]
		type MaxSignatories: Get<u32>;

		/// Maximum number of schedules due at the same second. Also bounds
		/// the engine's per-round processing loop (ten times this value).
		#[pallet::constant]
		type MaxSchedulesPerSecond: Get<u32>;

		/// Maximum number of distinct seconds with pending schedules
		#[pallet::constant]
		type MaxPendingSeconds: Get<u32>;

		/// Maximum number of schedules awaiting early execution
		#[pallet::constant]
		type MaxReadyQueue: Get<u32>;

		/// Maximum number of full digests sharing one 64-bit equality bucket
		#[pallet::constant]
		type MaxDigestCollisions: Get<u32>;

		/// Weight information for extrinsics
		type WeightInfo: WeightInfo;
	}

	/// Type alias for an encoded admin key
	pub type BoundedKeyOf<T> = BoundedVec<u8, <T as Config>::MaxKeyLen>;

	/// Type alias for a schedule memo
	pub type BoundedMemoOf<T> = BoundedVec<u8, <T as Config>::MaxMemoLen>;

	/// Type alias for an encoded wrapped call
	pub type BoundedBodyOf<T> = BoundedVec<u8, <T as Config>::MaxBodyLen>;

	/// Type alias for a signatory set
	pub type BoundedSignatoriesOf<T> =
		BoundedVec<qp_schedule::RawKey, <T as Config>::MaxSignatories>;

	/// Type alias for the schedule entity with proper bounds
	pub type ScheduleOf<T> = Schedule<
		<T as frame_system::Config>::AccountId,
		BoundedKeyOf<T>,
		BoundedMemoOf<T>,
		BoundedBodyOf<T>,
		BoundedSignatoriesOf<T>,
	>;

	/// Type alias for a schedule selected for execution
	pub type TriggeredScheduleOf<T> =
		TriggeredSchedule<<T as frame_system::Config>::AccountId, <T as Config>::RuntimeCall>;

	/// Schedule entities by id
	#[pallet::storage]
	#[pallet::getter(fn schedules)]
	pub type Schedules<T: Config> =
		StorageMap<_, Twox64Concat, ScheduleId, ScheduleOf<T>, OptionQuery>;

	/// Next schedule id to assign
	#[pallet::storage]
	pub type NextScheduleId<T: Config> = StorageValue<_, ScheduleId, ValueQuery>;

	/// Equality index: 64-bit content-hash bucket -> full digest -> id.
	/// Entries live exactly as long as the owning entity is pending.
	#[pallet::storage]
	pub type ByEquality<T: Config> = StorageMap<
		_,
		Twox64Concat,
		u64,
		BoundedBTreeMap<[u8; 32], ScheduleId, T::MaxDigestCollisions>,
		OptionQuery,
	>;

	/// Expiry index: second -> ids due at that second, ascending
	#[pallet::storage]
	pub type ExpiryBuckets<T: Config> = StorageMap<
		_,
		Twox64Concat,
		UnixSeconds,
		BoundedVec<ScheduleId, T::MaxSchedulesPerSecond>,
		OptionQuery,
	>;

	/// Sorted distinct seconds that currently have a non-empty expiry bucket.
	/// The head is the engine's floor pointer.
	#[pallet::storage]
	pub type ExpiryQueue<T: Config> =
		StorageValue<_, BoundedVec<UnixSeconds, T::MaxPendingSeconds>, ValueQuery>;

	/// Fully authorized schedules awaiting early execution, ascending by id
	#[pallet::storage]
	pub type ReadyQueue<T: Config> =
		StorageValue<_, BoundedVec<ScheduleId, T::MaxReadyQueue>, ValueQuery>;

	/// Network-wide opt-in for autonomous execution. While disabled, due
	/// schedules only ever expire and fully signed schedules execute inline
	/// at signing time.
	#[pallet::storage]
	pub type LongTermSchedulingEnabled<T: Config> = StorageValue<_, bool, ValueQuery>;

	#[pallet::genesis_config]
	pub struct GenesisConfig<T: Config> {
		pub long_term_scheduling_enabled: bool,
		#[serde(skip)]
		pub _config: core::marker::PhantomData<T>,
	}

	impl<T: Config> Default for GenesisConfig<T> {
		fn default() -> Self {
			Self { long_term_scheduling_enabled: false, _config: Default::default() }
		}
	}

	#[pallet::genesis_build]
	impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
		fn build(&self) {
			LongTermSchedulingEnabled::<T>::put(self.long_term_scheduling_enabled);
		}
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config> {
		/// A new schedule was registered
		ScheduleCreated {
			id: ScheduleId,
			creator: T::AccountId,
			effective_payer: T::AccountId,
			expiry_second: UnixSeconds,
		},
		/// Creation matched an identical pending schedule; no new entity was
		/// registered and `id` is the existing one
		ScheduleAlreadyExists { id: ScheduleId },
		/// A signing submission was merged
		ScheduleSigned { id: ScheduleId, newly_fully_authorized: bool },
		/// A schedule was deleted by its admin key
		ScheduleDeleted { id: ScheduleId },
		/// A schedule reached its expiry second without executing
		ScheduleExpired { id: ScheduleId },
		/// A schedule's wrapped transaction was dispatched.
		/// `creator` and `valid_start` identify the synthetic transaction the
		/// execution is recorded under.
		ScheduleExecuted {
			id: ScheduleId,
			creator: T::AccountId,
			valid_start: UnixNanos,
			result: DispatchResult,
		},
		/// The autonomous-execution policy was changed
		LongTermSchedulingSet { enabled: bool },
	}

	#[pallet::error]
	pub enum Error<T> {
		/// No schedule with the given id
		ScheduleNotFound,
		/// The schedule already executed
		ScheduleAlreadyExecuted,
		/// The schedule was already deleted
		ScheduleAlreadyDeleted,
		/// The schedule's expiry second has passed; it awaits the engine's
		/// expire pass and can no longer be signed or deleted
		SchedulePendingExpiration,
		/// The schedule has no admin key and cannot be deleted
		ScheduleImmutable,
		/// The caller does not hold the schedule's admin key
		Unauthorized,
		/// Explicit expiry is not strictly in the future
		ExpiryInPast,
		/// Explicit expiry exceeds MaxExpirationFuture
		ExpiryTooFar,
		/// The wrapped call is empty
		EmptyScheduledBody,
		/// The wrapped call exceeds MaxBodyLen
		BodyTooLarge,
		/// Memo exceeds MaxMemoLen
		MemoTooLong,
		/// Admin key fails structural validation (threshold math, emptiness,
		/// nesting) or exceeds MaxKeyLen when encoded
		InvalidAdminKey,
		/// The required signers of the wrapped transaction cannot be
		/// determined
		UnresolvableRequiredSigners,
		/// The wrapped transaction type may not be scheduled
		UnschedulableTransaction,
		/// A signing submission must carry at least one signature
		EmptySignatureMap,
		/// A signature over the scheduled payload failed verification; the
		/// whole submission is rejected
		InvalidScheduledSignature,
		/// The schedule cannot accept further signatories
		TooManySignatories,
		/// The expiry bucket for the target second is full
		TooManySchedulesPerSecond,
		/// Too many distinct seconds with pending schedules
		TooManyPendingSeconds,
		/// The 64-bit equality bucket cannot hold another digest
		TooManyHashCollisions,
		/// Executing the schedule at its expiry second would exceed network
		/// throughput limits
		ScheduleFutureThrottleExceeded,
		/// Executing the schedule at its expiry second would exceed the
		/// execution-gas budget
		ScheduleFutureGasLimitExceeded,
	}

	#[pallet::hooks]
	impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
		/// Per-round drive: expire due schedules and execute at most one
		/// ready schedule, before any other side effect of the round.
		fn on_initialize(_n: BlockNumberFor<T>) -> Weight {
			let now = Self::now_nanos();
			if let Some(triggered) = Self::advance(now) {
				Self::dispatch_triggered(triggered);
			}
			T::WeightInfo::on_initialize()
		}
	}

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		/// Register a deferred transaction.
		///
		/// Parameters:
		/// - `body`: the SCALE-encoded wrapped call
		/// - `payer`: explicit fee payer; the caller pays when absent
		/// - `admin_key`: key authorized to delete the schedule early;
		///   omitting it makes the schedule immutable
		/// - `memo`: short semantically meaningful text
		/// - `expiry_second`: explicit expiry; defaults to
		///   `now + DefaultExpirySeconds`
		/// - `wait_for_expiry`: never execute early, only at expiry
		///
		/// If an identical schedule (same memo, admin key, body, provided
		/// expiry and wait flag — payer and creator excluded) is already
		/// pending and `DedupOnCreate` is active, nothing is registered and
		/// `ScheduleAlreadyExists` reports the existing id.
		#[pallet::call_index(0)]
		#[pallet::weight(<T as Config>::WeightInfo::create_schedule(body.len() as u32))]
		pub fn create_schedule(
			origin: OriginFor<T>,
			body: Vec<u8>,
			payer: Option<T::AccountId>,
			admin_key: Option<ScheduleKey>,
			memo: Vec<u8>,
			expiry_second: Option<UnixSeconds>,
			wait_for_expiry: bool,
		) -> DispatchResult {
			let creator = ensure_signed(origin)?;

			ensure!(!body.is_empty(), Error::<T>::EmptyScheduledBody);
			let body: BoundedBodyOf<T> = body.try_into().map_err(|_| Error::<T>::BodyTooLarge)?;
			let memo: BoundedMemoOf<T> = memo.try_into().map_err(|_| Error::<T>::MemoTooLong)?;

			if let Some(key) = &admin_key {
				key.validate().map_err(|_| Error::<T>::InvalidAdminKey)?;
			}
			let admin_key: Option<BoundedKeyOf<T>> = admin_key
				.map(|key| key.encode().try_into().map_err(|_| Error::<T>::InvalidAdminKey))
				.transpose()?;

			// The wrapped transaction must be schedulable at all; the key
			// list itself is re-resolved at every activation check.
			T::SigningRequirements::required_signers(&body).map_err(|e| match e {
				RequirementsError::Unresolvable => Error::<T>::UnresolvableRequiredSigners,
				RequirementsError::Unschedulable => Error::<T>::UnschedulableTransaction,
			})?;

			let now = Self::now_nanos();
			let now_second = now / NANOS_PER_SECOND;
			let calculated_expiry = match expiry_second {
				Some(second) => {
					ensure!(second > now_second, Error::<T>::ExpiryInPast);
					ensure!(
						second <= now_second.saturating_add(T::MaxExpirationFuture::get()),
						Error::<T>::ExpiryTooFar
					);
					second
				},
				None => now_second.saturating_add(T::DefaultExpirySeconds::get()),
			};

			let digest = equality_digest(
				&memo,
				admin_key.as_ref().map(|key| key.as_slice()),
				&body,
				expiry_second,
				wait_for_expiry,
			);
			if let Some(existing) = Self::find_identical(&digest) {
				if T::DedupOnCreate::get() {
					Self::deposit_event(Event::ScheduleAlreadyExists { id: existing });
					return Ok(());
				}
			}

			Self::check_future_capacity(&body, calculated_expiry)?;

			let id = NextScheduleId::<T>::mutate(|next| {
				let id = *next;
				*next = next.saturating_add(1);
				id
			});

			let schedule = ScheduleOf::<T> {
				payer,
				creator: creator.clone(),
				valid_start: now,
				admin_key,
				memo,
				wait_for_expiry,
				provided_expiry: expiry_second,
				expiry_second: calculated_expiry,
				body,
				signatories: BoundedSignatoriesOf::<T>::default(),
				executed: false,
				deleted: false,
				resolution_time: None,
				equality_digest: digest,
			};

			Self::index_expiry(id, calculated_expiry)?;
			Self::index_equality(&digest, id)?;
			let effective_payer = schedule.effective_payer().clone();
			Schedules::<T>::insert(id, &schedule);

			Self::deposit_event(Event::ScheduleCreated {
				id,
				creator,
				effective_payer,
				expiry_second: calculated_expiry,
			});

			// A schedule with no outstanding requirements is authorized from
			// birth and routed exactly like one completed by signing.
			if Self::is_fully_authorized(&schedule) {
				Self::note_fully_authorized(id, &schedule, now);
			}

			Ok(())
		}

		/// Present signatures over a schedule's wrapped transaction.
		///
		/// Every submitted prefix is classified against the payer's key
		/// structure and the scheduled transaction's verified signatures; one
		/// invalid signature over the scheduled payload rejects the whole
		/// submission. Valid keys merge into the signatory set idempotently:
		/// re-presenting a known key is a no-op, not an error.
		#[pallet::call_index(1)]
		#[pallet::weight(<T as Config>::WeightInfo::sign_schedule(signatures.len() as u32))]
		pub fn sign_schedule(
			origin: OriginFor<T>,
			id: ScheduleId,
			signatures: Vec<SignaturePair>,
		) -> DispatchResult {
			// Anyone may carry signatures; authorization comes from the
			// signatures themselves.
			let _who = ensure_signed(origin)?;

			ensure!(!signatures.is_empty(), Error::<T>::EmptySignatureMap);

			let mut schedule = Schedules::<T>::get(id).ok_or(Error::<T>::ScheduleNotFound)?;
			ensure!(!schedule.executed, Error::<T>::ScheduleAlreadyExecuted);
			ensure!(!schedule.deleted, Error::<T>::ScheduleAlreadyDeleted);

			let now = Self::now_nanos();
			let now_second = now / NANOS_PER_SECOND;
			ensure!(schedule.expiry_second >= now_second, Error::<T>::SchedulePendingExpiration);

			let pairs: Vec<RawSignaturePair> = signatures
				.iter()
				.map(|pair| RawSignaturePair {
					prefix: pair.prefix.to_vec(),
					signature: pair.signature.to_vec(),
				})
				.collect();
			let verified = T::SignatureVerifier::verify(&schedule.body, &pairs);
			let payer_key = T::SigningRequirements::account_key(schedule.effective_payer());

			let valid_keys = classify::classify_submission(&pairs, payer_key.as_ref(), &verified)
				.map_err(|()| Error::<T>::InvalidScheduledSignature)?;

			let was_authorized = Self::is_fully_authorized(&schedule);
			let mut grew = false;
			for key in valid_keys {
				if !schedule.signatories.contains(&key) {
					schedule
						.signatories
						.try_push(key)
						.map_err(|_| Error::<T>::TooManySignatories)?;
					grew = true;
				}
			}

			let newly_fully_authorized =
				grew && !was_authorized && Self::is_fully_authorized(&schedule);

			if grew {
				Schedules::<T>::insert(id, &schedule);
			}
			if newly_fully_authorized {
				Self::note_fully_authorized(id, &schedule, now);
			}

			Self::deposit_event(Event::ScheduleSigned { id, newly_fully_authorized });

			Ok(())
		}

		/// Delete a pending schedule. Requires the schedule to carry an admin
		/// key and the caller to hold it.
		#[pallet::call_index(2)]
		#[pallet::weight(<T as Config>::WeightInfo::delete_schedule())]
		pub fn delete_schedule(origin: OriginFor<T>, id: ScheduleId) -> DispatchResult {
			let who = ensure_signed(origin)?;

			let mut schedule = Schedules::<T>::get(id).ok_or(Error::<T>::ScheduleNotFound)?;
			ensure!(!schedule.executed, Error::<T>::ScheduleAlreadyExecuted);
			ensure!(!schedule.deleted, Error::<T>::ScheduleAlreadyDeleted);

			let now = Self::now_nanos();
			ensure!(
				schedule.expiry_second >= now / NANOS_PER_SECOND,
				Error::<T>::SchedulePendingExpiration
			);

			let encoded = schedule.admin_key.as_ref().ok_or(Error::<T>::ScheduleImmutable)?;
			let admin_key = ScheduleKey::decode(&mut &encoded[..])
				.map_err(|_| Error::<T>::InvalidAdminKey)?;
			ensure!(T::AdminWitness::holds_key(&who, &admin_key), Error::<T>::Unauthorized);

			schedule.deleted = true;
			schedule.resolution_time = Some(now);
			Self::unindex(id, &schedule);
			Schedules::<T>::insert(id, &schedule);

			Self::deposit_event(Event::ScheduleDeleted { id });

			Ok(())
		}

		/// Enable or disable autonomous execution network-wide.
		#[pallet::call_index(3)]
		#[pallet::weight(<T as Config>::WeightInfo::set_long_term_scheduling())]
		pub fn set_long_term_scheduling(origin: OriginFor<T>, enabled: bool) -> DispatchResult {
			ensure_root(origin)?;
			LongTermSchedulingEnabled::<T>::put(enabled);
			Self::deposit_event(Event::LongTermSchedulingSet { enabled });
			Ok(())
		}
	}

	impl<T: Config> Pallet<T> {
		/// Current consensus time in nanoseconds since the unix epoch.
		pub(crate) fn now_nanos() -> UnixNanos {
			let now_ms: u64 = T::TimeProvider::now().saturated_into();
			now_ms.saturating_mul(NANOS_PER_MILLISECOND)
		}

		/// Look up a pending schedule with the given content digest.
		fn find_identical(digest: &[u8; 32]) -> Option<ScheduleId> {
			let bucket = ByEquality::<T>::get(equality_bucket(digest))?;
			let id = *bucket.get(digest)?;
			match Schedules::<T>::get(id) {
				Some(schedule) if schedule.is_pending() => Some(id),
				_ => {
					// A resolved entity removes its own entry, so a stale one
					// points at corruption elsewhere; it only costs us a
					// duplicate id here.
					log::warn!(
						target: LOG_TARGET,
						"stale equality entry for schedule {id}; ignoring"
					);
					None
				},
			}
		}

		/// Insert a schedule into the equality index.
		fn index_equality(digest: &[u8; 32], id: ScheduleId) -> DispatchResult {
			ByEquality::<T>::try_mutate(equality_bucket(digest), |maybe| {
				let bucket = maybe.get_or_insert_with(Default::default);
				match bucket.try_insert(*digest, id) {
					Ok(Some(previous)) if previous != id => {
						// Content is immutable, so two live ids should never
						// share a digest; the overwrite mirrors the virtual
						// map the index replaced.
						log::warn!(
							target: LOG_TARGET,
							"equality conflict: digest owned by schedule {previous} reassigned to {id}"
						);
						Ok(())
					},
					Ok(_) => Ok(()),
					Err(_) => Err(Error::<T>::TooManyHashCollisions.into()),
				}
			})
		}

		/// Insert a schedule into the expiry index (bucket plus ordered
		/// seconds queue).
		fn index_expiry(id: ScheduleId, second: UnixSeconds) -> DispatchResult {
			ExpiryBuckets::<T>::try_mutate(second, |maybe| {
				let bucket = maybe.get_or_insert_with(Default::default);
				bucket.try_push(id).map_err(|_| Error::<T>::TooManySchedulesPerSecond)
			})?;
			ExpiryQueue::<T>::try_mutate(|seconds| match seconds.binary_search(&second) {
				Ok(_) => Ok(()),
				Err(position) => seconds
					.try_insert(position, second)
					.map_err(|_| Error::<T>::TooManyPendingSeconds.into()),
			})
		}

		/// Remove a schedule from every index. Tolerates entries already
		/// being absent so cleanup after forced expiry is always safe.
		pub(crate) fn unindex(id: ScheduleId, schedule: &ScheduleOf<T>) {
			let second = schedule.expiry_second;
			let mut bucket_drained = false;
			ExpiryBuckets::<T>::mutate_exists(second, |maybe| {
				if let Some(bucket) = maybe {
					bucket.retain(|entry| *entry != id);
					if bucket.is_empty() {
						*maybe = None;
						bucket_drained = true;
					}
				}
			});
			if bucket_drained {
				ExpiryQueue::<T>::mutate(|seconds| {
					if let Ok(position) = seconds.binary_search(&second) {
						seconds.remove(position);
					}
				});
			}

			ByEquality::<T>::mutate_exists(equality_bucket(&schedule.equality_digest), |maybe| {
				if let Some(bucket) = maybe {
					// Only drop the entry while it still belongs to this id;
					// a conflicting overwrite must not be clobbered.
					if bucket.get(&schedule.equality_digest) == Some(&id) {
						bucket.remove(&schedule.equality_digest);
					}
					if bucket.is_empty() {
						*maybe = None;
					}
				}
			});

			ReadyQueue::<T>::mutate(|queue| {
				if let Ok(position) = queue.binary_search(&id) {
					queue.remove(position);
				}
			});
		}

		/// Route a schedule that just became fully authorized.
		///
		/// Waiting schedules stay put until expiry. Non-waiting ones are
		/// handed to the engine when autonomous execution is enabled, and
		/// executed inline right here when it is not.
		fn note_fully_authorized(id: ScheduleId, schedule: &ScheduleOf<T>, now: UnixNanos) {
			if schedule.wait_for_expiry {
				return;
			}
			if LongTermSchedulingEnabled::<T>::get() {
				let enqueued = ReadyQueue::<T>::mutate(|queue| {
					match queue.binary_search(&id) {
						Ok(_) => true,
						Err(position) => queue.try_insert(position, id).is_ok(),
					}
				});
				if !enqueued {
					// Stays pending and is picked up (or expired) at its
					// expiry second instead.
					log::warn!(
						target: LOG_TARGET,
						"ready queue full; schedule {id} executes at expiry"
					);
				}
			} else if let Some(triggered) = Self::try_trigger(id, now) {
				Self::dispatch_triggered(triggered);
			}
		}

		/// Decode and dispatch a triggered schedule's wrapped call as its
		/// effective payer, recording the nested result.
		pub(crate) fn dispatch_triggered(triggered: TriggeredScheduleOf<T>) {
			let TriggeredSchedule { id, payer, creator, valid_start, call } = triggered;
			let result = call
				.dispatch(frame_system::RawOrigin::Signed(payer).into())
				.map(|_| ())
				.map_err(|e| e.error);
			Self::deposit_event(Event::ScheduleExecuted { id, creator, valid_start, result });
		}
	}
}
