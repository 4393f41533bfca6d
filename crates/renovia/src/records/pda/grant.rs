/// Grant awarded for a renovation: `estimated_cost × ratio`, rounded to the cent.
pub fn grant_amount(estimated_cost: f64, ratio: f64) -> f64 {
    round_cents(estimated_cost * ratio)
}

pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
