use chrono::NaiveDate;
use std::cmp::Ordering;

/// Compare records by date, then symbol.
pub fn compare_date_symbol(
    left_date: NaiveDate,
    left_symbol: &str,
    right_date: NaiveDate,
    right_symbol: &str,
) -> Ordering {
    left_date
        .cmp(&right_date)
        .then_with(|| left_symbol.cmp(right_symbol))
}

/// Sort records by date, then symbol.
pub fn sort_by_date_symbol<T, F, G>(items: &mut [T], get_date: F, get_symbol: G)
where
    F: Fn(&T) -> NaiveDate,
    G: Fn(&T) -> &str,
{
    items.sort_by(|left, right| {
        compare_date_symbol(
            get_date(left),
            get_symbol(left),
            get_date(right),
            get_symbol(right),
        )
    });
}
