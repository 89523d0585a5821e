//! Commonly used units.

use alloc::vec;

use crate::{BaseScale, BaseUnit, Unit};

pub const SECOND: Unit = Unit::Base(BaseUnit::Second);
pub const MINUTE: Unit = Unit::Base(BaseUnit::Minute);
pub const HOUR: Unit = Unit::Base(BaseUnit::Hour);
pub const DAY: Unit = Unit::Base(BaseUnit::Day);
pub const WEEK: Unit = Unit::Base(BaseUnit::Week);

pub const NANOSECOND: Unit = Unit::scaled(BaseUnit::Second, BaseScale::Nano);
pub const MICROSECOND: Unit = Unit::scaled(BaseUnit::Second, BaseScale::Micro);
pub const MILLISECOND: Unit = Unit::scaled(BaseUnit::Second, BaseScale::Milli);

pub const BIT: Unit = Unit::Base(BaseUnit::Bit);
pub const KILOBIT: Unit = Unit::scaled(BaseUnit::Bit, BaseScale::Kilo);
pub const MEGABIT: Unit = Unit::scaled(BaseUnit::Bit, BaseScale::Mega);
pub const GIGABIT: Unit = Unit::scaled(BaseUnit::Bit, BaseScale::Giga);

pub const BYTE: Unit = Unit::Base(BaseUnit::Byte);
pub const KILOBYTE: Unit = Unit::scaled(BaseUnit::Byte, BaseScale::Kilo);
pub const MEGABYTE: Unit = Unit::scaled(BaseUnit::Byte, BaseScale::Mega);
pub const GIGABYTE: Unit = Unit::scaled(BaseUnit::Byte, BaseScale::Giga);

pub const KELVIN: Unit = Unit::Base(BaseUnit::Kelvin);
pub const CELSIUS: Unit = Unit::Base(BaseUnit::Celsius);
pub const FAHRENHEIT: Unit = Unit::Base(BaseUnit::Fahrenheit);

/// `BIT / SECOND`
pub fn bits_per_second() -> Unit {
    Unit::compound(vec![BIT], vec![SECOND])
}

/// `BYTE / SECOND`
pub fn bytes_per_second() -> Unit {
    Unit::compound(vec![BYTE], vec![SECOND])
}
