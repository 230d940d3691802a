//! Property tests for sizing invariants.
//!
//! 1. Kelly bounds: the sizing fraction always lands in [1%, 25%]
//! 2. Gates: a returned plan never breaks the margin or risk limits
//! 3. Kelly rescale keeps the reward/risk ratio
//! 4. Validation is total: it never panics, and a failure list is never empty
//! 5. Validation is complete: k violated rules yield exactly those k failures

use proptest::prelude::*;
use riskdesk_core::domain::{AssetClass, RawTradeSetup, SizingMethod};
use riskdesk_core::sizers::kelly::{kelly_percentage, sizing_fraction};
use riskdesk_core::sizers::{MAX_MARGIN_SHARE, MAX_RISK_PERCENTAGE};
use riskdesk_core::validation::ValidationFailure as F;
use riskdesk_core::{size_from_catalog, validate, InstrumentCatalog};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_win_rate() -> impl Strategy<Value = f64> {
    0.0..=1.0_f64
}

fn arb_payoff() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.01..20.0_f64]
}

fn arb_futures_symbol() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["ES", "NQ", "YM", "RTY", "CL", "GC", "MES", "MNQ"])
        .prop_map(String::from)
}

fn arb_futures_setup() -> impl Strategy<Value = RawTradeSetup> {
    (
        arb_futures_symbol(),
        5_000.0..2_000_000.0_f64,
        100.0..20_000.0_f64,
        0.001..0.05_f64,
        0.5..4.0_f64,
        1u32..20,
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(symbol, balance, entry, stop_pct, ratio, qty, long, kelly)| {
            let dist = entry * stop_pct;
            let (stop, target) = if long {
                (entry - dist, entry + dist * ratio)
            } else {
                (entry + dist, entry - dist * ratio)
            };
            RawTradeSetup {
                asset_class: AssetClass::Futures,
                symbol,
                account_balance: format!("{balance:.2}"),
                entry_price: format!("{entry:.4}"),
                stop_loss: format!("{stop:.4}"),
                take_profit: format!("{target:.4}"),
                quantity: qty.to_string(),
                commission: "2.50".into(),
                sizing_method: if kelly {
                    SizingMethod::Kelly
                } else {
                    SizingMethod::FixedRisk
                },
                ..RawTradeSetup::default()
            }
        })
}

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("abc".to_string()),
        Just("-5".to_string()),
        Just("0".to_string()),
        Just("NaN".to_string()),
        (-1.0e6..1.0e6_f64).prop_map(|v| format!("{v}")),
    ]
}

fn arb_unparsable_price() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", "abc", "NaN", "inf", "4500x"])
}

/// A default setup with a random subset of rules broken, plus the failures
/// those rules must produce in report order. The ratio rule only fires when
/// all three prices parse.
fn arb_violations() -> impl Strategy<Value = (RawTradeSetup, Vec<F>)> {
    (
        prop::option::of(prop_oneof![
            Just(("999.99", F::BalanceBelowMinimum)),
            Just(("abc", F::BalanceNotPositive)),
        ]),
        prop::option::of(arb_unparsable_price()),
        prop::option::of(arb_unparsable_price()),
        prop::option::of(arb_unparsable_price()),
        prop::option::of(prop::sample::select(vec!["0", "-1", "1.5", "two"])),
        prop::option::of(prop::sample::select(vec!["-0.01", "-2.50", "-100"])),
        prop::bool::ANY,
    )
        .prop_map(|(balance, entry, stop, target, qty, commission, low_ratio)| {
            let mut raw = RawTradeSetup::default();
            let mut expected = Vec::new();

            if let Some((value, failure)) = balance {
                raw.account_balance = value.into();
                expected.push(failure);
            }
            if let Some(v) = entry {
                raw.entry_price = v.into();
                expected.push(F::EntryNotPositive);
            }
            if let Some(v) = stop {
                raw.stop_loss = v.into();
                expected.push(F::StopNotPositive);
            }
            if let Some(v) = target {
                raw.take_profit = v.into();
                expected.push(F::TakeProfitNotPositive);
            }
            if let Some(v) = qty {
                raw.quantity = v.into();
                expected.push(F::QuantityNotPositive);
            }
            if let Some(v) = commission {
                raw.commission = v.into();
                expected.push(F::CommissionNegative);
            }
            if low_ratio && target.is_none() {
                // 5 points of reward against 20 of risk
                raw.take_profit = "4505".into();
                if entry.is_none() && stop.is_none() {
                    expected.push(F::RatioTooLow);
                }
            }
            (raw, expected)
        })
}

// ── 1. Kelly bounds ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn sizing_fraction_is_bounded(p in arb_win_rate(), b in arb_payoff()) {
        let f = sizing_fraction(p, b);
        prop_assert!((0.01..=0.25).contains(&f));
    }

    #[test]
    fn kelly_percentage_is_bounded(p in arb_win_rate(), b in arb_payoff()) {
        let k = kelly_percentage(p, b);
        prop_assert!((0.0..=25.0).contains(&k));
    }
}

// ── 2. Gates hold on every returned plan ─────────────────────────────

proptest! {
    #[test]
    fn returned_plans_respect_gates(raw in arb_futures_setup()) {
        let Ok(setup) = validate(&raw) else { return Ok(()); };
        if let Ok(plan) = size_from_catalog(&setup, InstrumentCatalog::builtin()) {
            prop_assert!(plan.margin_required <= plan.account_balance * MAX_MARGIN_SHARE);
            prop_assert!(plan.risk_percentage <= MAX_RISK_PERCENTAGE);
            prop_assert!(plan.risk_amount > 0.0);
        }
    }
}

// ── 3. Kelly rescale keeps the ratio ─────────────────────────────────

proptest! {
    #[test]
    fn kelly_keeps_reward_risk_ratio(raw in arb_futures_setup()) {
        let mut fixed_raw = raw.clone();
        fixed_raw.sizing_method = SizingMethod::FixedRisk;
        let mut kelly_raw = raw;
        kelly_raw.sizing_method = SizingMethod::Kelly;

        let (Ok(fixed_setup), Ok(kelly_setup)) = (validate(&fixed_raw), validate(&kelly_raw)) else {
            return Ok(());
        };
        let catalog = InstrumentCatalog::builtin();
        if let (Ok(fixed), Ok(kelly)) = (
            size_from_catalog(&fixed_setup, catalog),
            size_from_catalog(&kelly_setup, catalog),
        ) {
            let after = kelly.reward_amount / kelly.risk_amount;
            prop_assert!((after - fixed.risk_reward_ratio).abs() < 1e-6);
            let fraction = kelly.risk_amount / kelly.account_balance;
            prop_assert!(fraction >= 0.01 - 1e-12 && fraction <= 0.25 + 1e-12);
        }
    }
}

// ── 4. Validation is total ───────────────────────────────────────────

proptest! {
    #[test]
    fn validation_never_panics(
        balance in arb_field(),
        entry in arb_field(),
        stop in arb_field(),
        target in arb_field(),
        qty in arb_field(),
        commission in arb_field(),
    ) {
        let raw = RawTradeSetup {
            account_balance: balance,
            entry_price: entry,
            stop_loss: stop,
            take_profit: target,
            quantity: qty,
            commission,
            ..RawTradeSetup::default()
        };
        match validate(&raw) {
            Ok(setup) => {
                prop_assert!(setup.account_balance() >= 1000.0);
                prop_assert!(setup.risk_distance() > 0.0);
                prop_assert!(setup.reward_distance() > 0.0);
            }
            Err(errors) => prop_assert!(!errors.is_empty()),
        }
    }
}

// ── 5. Validation is complete ────────────────────────────────────────

proptest! {
    #[test]
    fn validator_reports_exactly_the_violated_rules((raw, expected) in arb_violations()) {
        match validate(&raw) {
            Ok(_) => prop_assert!(expected.is_empty()),
            Err(errors) => prop_assert_eq!(errors.failures(), expected.as_slice()),
        }
    }
}
