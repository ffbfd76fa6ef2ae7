//! Per-round schedule engine
//!
//! Invoked once per consensus round from `on_initialize` (and directly by the
//! surrounding dispatch machinery through [`Pallet::advance`] /
//! [`Pallet::expire_only`]). Every replica runs the identical sequence of
//! rounds with identical consensus times, so everything here must be
//! deterministic: the floor over the expiry index advances in ascending
//! second order, buckets are scanned in ascending id order, and the ready
//! queue ahead of both.

use super::*;
use alloc::{collections::btree_set::BTreeSet, vec::Vec};
use codec::Decode;
use frame_support::ensure;
use frame_support::traits::Get;
use qp_schedule::{ScheduleCapacity, SigningRequirements};

/// Where a candidate id was drawn from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Candidate {
	/// Fully authorized ahead of expiry, queued for early execution.
	Ready,
	/// Drawn from a due expiry bucket.
	Due,
}

impl<T: Config> Pallet<T> {
	/// Drive one consensus round at `now`: expire everything past due, then
	/// return at most one transaction to execute.
	pub fn advance(now: UnixNanos) -> Option<TriggeredScheduleOf<T>> {
		Self::drive(now, false)
	}

	/// Expire-only mode: identical to [`Self::advance`] except that no
	/// candidate is ever consumed for execution. Used while replaying rounds
	/// in which execution must not occur.
	pub fn expire_only(now: UnixNanos) {
		Self::drive(now, true);
	}

	/// Upper bound on entities touched per invocation; the backlog carries
	/// over to the next round.
	fn max_processing_loop_iterations() -> u32 {
		T::MaxSchedulesPerSecond::get().saturating_mul(10)
	}

	fn drive(now: UnixNanos, expire_only: bool) -> Option<TriggeredScheduleOf<T>> {
		let now_second = now / NANOS_PER_SECOND;
		let long_term = LongTermSchedulingEnabled::<T>::get();

		Self::expire_pass(now, now_second, long_term);

		// Ids already evaluated in this invocation. A candidate coming back
		// means the indices no longer shrink under resolution, which breaks
		// replay safety network-wide; halting is the only option that cannot
		// diverge.
		let mut seen: BTreeSet<ScheduleId> = BTreeSet::new();

		for _ in 0..Self::max_processing_loop_iterations() {
			let (source, id) = match Self::next_candidate(now_second, long_term) {
				Some(candidate) => candidate,
				None => return None,
			};
			if !seen.insert(id) {
				log::error!(
					target: LOG_TARGET,
					"schedule {id} selected twice in one round; expiry index corrupted"
				);
				panic!("scheduled-transactions: repeated candidate {id}; halting round processing");
			}

			let schedule = Schedules::<T>::get(id).unwrap_or_else(|| {
				panic!("scheduled-transactions: indexed schedule {id} missing; halting")
			});
			assert!(
				schedule.is_pending(),
				"scheduled-transactions: terminal schedule {id} still indexed; halting"
			);

			match source {
				Candidate::Due => {
					// Autonomous execution is opt-in; while the policy is off
					// a due schedule can only expire.
					if !long_term || !Self::is_fully_authorized(&schedule) {
						Self::force_expire(id, schedule, now);
						continue;
					}
				},
				Candidate::Ready => {
					if !Self::is_fully_authorized(&schedule) {
						// Requirements changed under it; it waits for expiry.
						Self::dequeue_ready(id);
						continue;
					}
				},
			}

			if expire_only {
				// The candidate stays untouched for the next execution round.
				return None;
			}

			if let Some(triggered) = Self::try_trigger(id, now) {
				return Some(triggered);
			}
			// Build failure already force-expired the entity; keep going so
			// one corrupt schedule cannot block the pending set.
		}
		None
	}

	/// Drain every past-due bucket of the entities whose resolution needs no
	/// evaluation, before any execution decision is made. With autonomous
	/// execution enabled, only waiting schedules survive to the selection
	/// pass; with it disabled, nothing does.
	fn expire_pass(now: UnixNanos, now_second: UnixSeconds, long_term: bool) {
		let limit = Self::max_processing_loop_iterations();
		let mut handled: u32 = 0;

		let due: Vec<UnixSeconds> =
			ExpiryQueue::<T>::get().iter().copied().take_while(|s| *s < now_second).collect();
		for second in due {
			let bucket = ExpiryBuckets::<T>::get(second).unwrap_or_else(|| {
				panic!("scheduled-transactions: queued second {second} has no bucket; halting")
			});
			for id in bucket {
				if handled >= limit {
					return;
				}
				handled = handled.saturating_add(1);

				let schedule = Schedules::<T>::get(id).unwrap_or_else(|| {
					panic!("scheduled-transactions: indexed schedule {id} missing; halting")
				});
				assert!(
					schedule.is_pending(),
					"scheduled-transactions: terminal schedule {id} still indexed; halting"
				);
				if !long_term || !schedule.wait_for_expiry {
					Self::force_expire(id, schedule, now);
				}
			}
		}
	}

	/// The next candidate in deterministic order: lowest ready id first, then
	/// the lowest `(second, id)` among due buckets.
	fn next_candidate(
		now_second: UnixSeconds,
		long_term: bool,
	) -> Option<(Candidate, ScheduleId)> {
		if long_term {
			if let Some(&id) = ReadyQueue::<T>::get().first() {
				return Some((Candidate::Ready, id));
			}
		}
		for &second in ExpiryQueue::<T>::get().iter() {
			if second >= now_second {
				break;
			}
			if let Some(&id) = ExpiryBuckets::<T>::get(second).as_ref().and_then(|b| b.first()) {
				return Some((Candidate::Due, id));
			}
		}
		None
	}

	/// Mark a schedule executed and detach it from every index, then hand the
	/// decoded call back for dispatch. Failing to build the triggerable
	/// transaction force-expires the entity instead: one corrupt schedule
	/// must never block the rest of the pending set.
	pub(crate) fn try_trigger(id: ScheduleId, now: UnixNanos) -> Option<TriggeredScheduleOf<T>> {
		let mut schedule = Schedules::<T>::get(id)?;
		match <T as Config>::RuntimeCall::decode(&mut &schedule.body[..]) {
			Ok(call) => {
				schedule.executed = true;
				schedule.resolution_time = Some(now);
				Self::unindex(id, &schedule);
				let payer = schedule.effective_payer().clone();
				let creator = schedule.creator.clone();
				let valid_start = schedule.valid_start;
				Schedules::<T>::insert(id, &schedule);
				Some(TriggeredSchedule { id, payer, creator, valid_start, call })
			},
			Err(_) => {
				log::warn!(
					target: LOG_TARGET,
					"schedule {id} has an undecodable body; force-expiring"
				);
				Self::force_expire(id, schedule, now);
				None
			},
		}
	}

	/// Resolve an entity as expired: terminal, removed from the indices,
	/// frozen in storage.
	pub(crate) fn force_expire(id: ScheduleId, mut schedule: ScheduleOf<T>, now: UnixNanos) {
		schedule.deleted = true;
		schedule.resolution_time = Some(now);
		Self::unindex(id, &schedule);
		Schedules::<T>::insert(id, &schedule);
		Self::deposit_event(Event::ScheduleExpired { id });
	}

	fn dequeue_ready(id: ScheduleId) {
		ReadyQueue::<T>::mutate(|queue| {
			if let Ok(position) = queue.binary_search(&id) {
				queue.remove(position);
			}
		});
	}

	/// Whether every key required by the wrapped transaction activates under
	/// the current signatory set. Resolver failure means "not authorized",
	/// never an error: the entity simply expires when its time comes.
	pub(crate) fn is_fully_authorized(schedule: &ScheduleOf<T>) -> bool {
		match T::SigningRequirements::required_signers(&schedule.body) {
			Ok(required) => required
				.iter()
				.all(|key| key.is_active(&|raw| schedule.signatories.contains(raw))),
			Err(_) => false,
		}
	}

	/// Future-congestion simulation run at creation time.
	///
	/// Replays every still-pending schedule already due at the candidate's
	/// expiry second, in insertion order with the candidate last, through the
	/// capacity accountant at one-nanosecond-separated synthetic timestamps.
	/// Reads only; the accountant is reset per simulation and never
	/// persisted.
	pub(crate) fn check_future_capacity(
		candidate_body: &[u8],
		expiry_second: UnixSeconds,
	) -> frame_support::dispatch::DispatchResult {
		if !LongTermSchedulingEnabled::<T>::get() {
			return Ok(());
		}
		T::Capacity::reset();

		let mut slot: u64 = 0;
		let mut replay = |body: &[u8]| -> frame_support::dispatch::DispatchResult {
			let at = expiry_second.saturating_mul(NANOS_PER_SECOND).saturating_add(slot);
			slot = slot.saturating_add(1);
			if T::Capacity::should_throttle(body, at) {
				ensure!(
					!T::Capacity::last_throttle_was_gas(),
					Error::<T>::ScheduleFutureGasLimitExceeded
				);
				return Err(Error::<T>::ScheduleFutureThrottleExceeded.into());
			}
			Ok(())
		};

		for id in ExpiryBuckets::<T>::get(expiry_second).unwrap_or_default() {
			let Some(other) = Schedules::<T>::get(id) else { continue };
			if !other.is_pending() || other.expiry_second != expiry_second {
				continue;
			}
			replay(&other.body)?;
		}
		replay(candidate_body)
	}
}
