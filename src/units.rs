#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

// ISQ with f32 storage, milliampere as the base current unit
ISQ!(
    uom::si,
    f32,
    (
        millimeter,
        kilogram,
        second,
        milliampere,
        kelvin,
        mole,
        candela
    )
);
