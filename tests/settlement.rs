//! Settlement scenario table and invariants.

use proptest::prelude::*;
use rstest::rstest;

use gridflex::settlement::{settle_ptu, FlexDelivery};

#[rstest]
// Ordered 1000 down, realized exactly: fully delivered.
#[case(2000, 3000, -1000, -1000, 0)]
// Ordered 1000 down, moved 1000 up instead: full deficiency.
#[case(4000, 3000, -1000, 0, 1000)]
// Nothing ordered: nothing to settle, whatever the deviation.
#[case(4000, 3000, 0, 0, 0)]
#[case(2000, 3000, 0, 0, 0)]
// Partial delivery in the ordered direction.
#[case(2600, 3000, -1000, -400, 600)]
#[case(3400, 3000, 1000, 400, 600)]
// Over-delivery is capped at the order.
#[case(500, 3000, -1000, -1000, 0)]
#[case(5500, 3000, 1000, 1000, 0)]
// No deviation at all: the full order is deficient.
#[case(3000, 3000, 700, 0, 700)]
fn settlement_scenarios(
    #[case] actual: i64,
    #[case] prognosis: i64,
    #[case] ordered: i64,
    #[case] delivered: i64,
    #[case] deficiency: i64,
) {
    assert_eq!(
        settle_ptu(actual, prognosis, ordered),
        FlexDelivery { delivered_flex_power: delivered, power_deficiency: deficiency }
    );
}

proptest! {
    #[test]
    fn delivered_never_exceeds_the_order(
        actual in -1_000_000_000i64..1_000_000_000,
        prognosis in -1_000_000_000i64..1_000_000_000,
        ordered in -1_000_000_000i64..1_000_000_000,
    ) {
        let delivery = settle_ptu(actual, prognosis, ordered);
        prop_assert!(delivery.delivered_flex_power.abs() <= ordered.abs());
        prop_assert!(delivery.power_deficiency >= 0);
    }

    #[test]
    fn deficiency_complements_delivery(
        actual in -1_000_000_000i64..1_000_000_000,
        prognosis in -1_000_000_000i64..1_000_000_000,
        ordered in -1_000_000_000i64..1_000_000_000,
    ) {
        let delivery = settle_ptu(actual, prognosis, ordered);
        let deviation = actual - prognosis;
        if ordered == 0 {
            prop_assert_eq!(delivery, FlexDelivery { delivered_flex_power: 0, power_deficiency: 0 });
        } else if deviation == 0 || deviation.signum() != ordered.signum() {
            prop_assert_eq!(delivery.delivered_flex_power, 0);
            prop_assert_eq!(delivery.power_deficiency, ordered.abs());
        } else {
            // Signs match: delivered flex carries the order's sign and the
            // deficiency is exactly the shortfall.
            prop_assert_eq!(delivery.delivered_flex_power.signum(), ordered.signum());
            prop_assert_eq!(
                delivery.power_deficiency,
                ordered.abs() - delivery.delivered_flex_power.abs()
            );
        }
    }

    #[test]
    fn settlement_is_idempotent(
        actual in -1_000_000_000i64..1_000_000_000,
        prognosis in -1_000_000_000i64..1_000_000_000,
        ordered in -1_000_000_000i64..1_000_000_000,
    ) {
        prop_assert_eq!(
            settle_ptu(actual, prognosis, ordered),
            settle_ptu(actual, prognosis, ordered)
        );
    }
}
