// Unit of measure conversion
//
// Both quantities and prices are divided by the selected unit's factor;
// a missing unit leaves values unchanged, a non-positive factor is rejected.

use billtrust::core::money::round_display;
use billtrust::core::AppError;
use billtrust::products::{UnitConversion, Uom};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_dozen_displayed_rounded() {
    let conversion = UnitConversion::new();
    let dozen = Uom::new(2, "Dozens", 1, dec!(12));

    let quantity = conversion.to_base_quantity(Some(&dozen), dec!(1)).unwrap();

    assert!(quantity > dec!(0.0833) && quantity < dec!(0.0834));
    assert_eq!(round_display(quantity), dec!(0.08));
}

#[test]
fn test_invalid_factors() {
    let conversion = UnitConversion::new();

    for factor in [Decimal::ZERO, dec!(-1)] {
        let uom = Uom::new(9, "Broken", 1, factor);
        let err = conversion.to_base_unit_price(Some(&uom), dec!(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidUnit(_)));
    }
}

proptest! {
    #[test]
    fn test_no_unit_is_identity(value in -1_000_000_000i64..1_000_000_000i64) {
        let value = Decimal::new(value, 3);
        let conversion = UnitConversion::new();

        prop_assert_eq!(conversion.to_base_quantity(None, value).unwrap(), value);
        prop_assert_eq!(conversion.to_base_unit_price(None, value).unwrap(), value);
    }

    #[test]
    fn test_unit_factor_is_identity(value in 0i64..1_000_000_000i64) {
        let value = Decimal::new(value, 2);
        let unit = Uom::new(1, "Units", 1, Decimal::ONE);

        prop_assert_eq!(UnitConversion::new().to_base_quantity(Some(&unit), value).unwrap(), value);
    }

    #[test]
    fn test_quantity_and_price_scale_alike(
        value in 1i64..1_000_000i64,
        factor in 1i64..10_000i64,
    ) {
        let value = Decimal::new(value, 2);
        let uom = Uom::new(3, "Custom", 1, Decimal::new(factor, 2));
        let conversion = UnitConversion::new();

        prop_assert_eq!(
            conversion.to_base_quantity(Some(&uom), value).unwrap(),
            conversion.to_base_unit_price(Some(&uom), value).unwrap()
        );
    }
}
