#![no_main]
use augur_core::stake::{max_stake_amount_for_outcome, required_stake};
use augur_core::{Address, LastCompletedCrowdSourcer, OutcomeStake, OutcomeStatus};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u128, u128, bool, bool, u128, u128, Option<u128>)| {
    let (total, own, winning, slow, preemptive, threshold, last_size) = input;

    let required = required_stake(total, own);
    assert!(required <= total);
    if let Some(next) = own.checked_add(1) {
        assert!(required_stake(total, next) <= required);
    }

    let outcome = OutcomeStake {
        outcome_name: "Yes".into(),
        rep_stake: own,
        status: if winning { OutcomeStatus::Winning } else { OutcomeStatus::Losing },
        payout_numerators: vec![],
        already_contributed_to_outcome: None,
    };
    let last = last_size.map(|size| LastCompletedCrowdSourcer {
        participant_address: Address::zero(),
        payout_numerators: vec![],
        stake: size,
        size,
    });
    let max = max_stake_amount_for_outcome(&outcome, total, slow, preemptive, threshold, last.as_ref());
    if winning {
        if slow || total >= threshold {
            assert_eq!(max, 0);
        } else {
            assert!(max <= threshold - total);
        }
    } else {
        assert_eq!(max, required);
    }
});
