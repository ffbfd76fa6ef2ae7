//! Benchmarking setup for pallet-scheduled-transactions

use super::*;

#[allow(unused)]
use crate::Pallet as ScheduledTransactions;
use alloc::vec;
use codec::Encode;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

fn remark_body<T: Config>(len: u32) -> Vec<u8> {
	let call: <T as Config>::RuntimeCall =
		frame_system::Call::<T>::remark { remark: vec![0u8; len as usize] }.into();
	call.encode()
}

#[benchmarks]
mod benchmarks {
	use super::*;

	#[benchmark]
	fn create_schedule(b: Linear<1, 512>) {
		let caller: T::AccountId = whitelisted_caller();
		let body = remark_body::<T>(b);
		let id = NextScheduleId::<T>::get();

		#[extrinsic_call]
		create_schedule(
			RawOrigin::Signed(caller),
			body,
			None,
			None,
			vec![],
			None,
			true,
		);

		assert!(Schedules::<T>::contains_key(id));
	}

	#[benchmark]
	fn sign_schedule(s: Linear<1, 10>) {
		let caller: T::AccountId = whitelisted_caller();
		let body = remark_body::<T>(32);
		let id = NextScheduleId::<T>::get();
		ScheduledTransactions::<T>::create_schedule(
			RawOrigin::Signed(caller.clone()).into(),
			body,
			None,
			None,
			vec![],
			None,
			true,
		)
		.expect("schedule creation succeeds");

		let signatures: Vec<SignaturePair> = (0..s)
			.map(|i| SignaturePair {
				prefix: vec![i as u8].try_into().expect("one byte fits"),
				signature: vec![i as u8; 64].try_into().expect("64 bytes fit"),
			})
			.collect();

		#[extrinsic_call]
		sign_schedule(RawOrigin::Signed(caller), id, signatures);
	}

	#[benchmark]
	fn delete_schedule() {
		let caller: T::AccountId = whitelisted_caller();
		let body = remark_body::<T>(32);
		let admin_key = qp_schedule::ScheduleKey::Single([7u8; 32]);
		let id = NextScheduleId::<T>::get();
		ScheduledTransactions::<T>::create_schedule(
			RawOrigin::Signed(caller.clone()).into(),
			body,
			None,
			Some(admin_key),
			vec![],
			None,
			true,
		)
		.expect("schedule creation succeeds");

		#[extrinsic_call]
		delete_schedule(RawOrigin::Signed(caller), id);

		assert!(Schedules::<T>::get(id).expect("schedule kept").deleted);
	}

	#[benchmark]
	fn set_long_term_scheduling() {
		#[extrinsic_call]
		set_long_term_scheduling(RawOrigin::Root, true);

		assert!(LongTermSchedulingEnabled::<T>::get());
	}

	impl_benchmark_test_suite!(
		ScheduledTransactions,
		crate::mock::new_test_ext(),
		crate::mock::Test
	);
}
