use std::fmt;

use jiff::{
    civil::{date, Date},
    ToSpan,
};

/// A calendar month, kept as the date of its first day.
#[derive(PartialEq, Debug, Clone, Copy, Hash, Eq, PartialOrd, Ord)]
pub struct Month(Date);

pub fn month(year: i16, month: i8) -> Month {
    Month::new(year, month)
}

impl Month {
    pub fn new(year: i16, month: i8) -> Month {
        Month(date(year, month, 1))
    }

    /// Return the month that contains this date.
    pub fn containing(day: Date) -> Month {
        Month(day.first_of_month())
    }

    pub fn start_date(&self) -> Date {
        self.0
    }

    pub fn end_date(&self) -> Date {
        self.0.last_of_month()
    }

    pub fn year(&self) -> i16 {
        self.0.year()
    }

    pub fn month(&self) -> i8 {
        self.0.month()
    }

    pub fn next(&self) -> Month {
        Month(self.0.saturating_add(1.month()))
    }

    /// All months from `self` through `end`, both inclusive.  Return `None`
    /// if `end` is before `self`.
    pub fn up_to(&self, end: Month) -> Option<Vec<Month>> {
        if end < *self {
            return None;
        }
        let mut months = Vec::new();
        let mut current = *self;
        while current <= end {
            months.push(current);
            current = current.next();
        }
        Some(months)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.strftime("%Y-%m"))
    }
}
