use serde::Serialize;

pub const DEFAULT_DEPOSIT_PERCENT: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deposit {
    pub deposit: f64,
    pub remainder: f64,
}

/// Split a total into the upfront deposit (sinal) and the remaining
/// balance. Both values are rounded to cents. Inputs are not validated.
pub fn compute_deposit(total: f64, percent: Option<i64>) -> Deposit {
    let percent = percent.unwrap_or(DEFAULT_DEPOSIT_PERCENT) as f64;
    let deposit = round2(total * percent / 100.0);
    let remainder = round2(total - deposit);
    Deposit { deposit, remainder }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(
            compute_deposit(1000.0, Some(40)),
            Deposit {
                deposit: 400.0,
                remainder: 600.0
            }
        );
    }

    #[test]
    fn test_rounding_to_cents() {
        // 333.33 * 0.4 = 133.332
        let result = compute_deposit(333.33, Some(40));
        assert_eq!(result.deposit, 133.33);
        assert_eq!(result.remainder, 200.0);
    }

    #[test]
    fn test_default_percent() {
        assert_eq!(compute_deposit(250.0, None), compute_deposit(250.0, Some(40)));
    }

    #[test]
    fn test_out_of_range_passes_through() {
        let result = compute_deposit(100.0, Some(150));
        assert_eq!(result.deposit, 150.0);
        assert_eq!(result.remainder, -50.0);
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(10.0), 10.0);
    }
}
