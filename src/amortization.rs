//! Annuity amortization: fixed monthly payment and the month-by-month split
//! between interest and principal.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::blockchain::Ledger;
use crate::error::{LedgerError, Result};
use crate::payment::PaymentRecord;

pub const MAX_TERM_YEARS: u32 = 50;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Loan parameters as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    /// Nominal annual rate in percent, e.g. `6.5`.
    pub annual_rate_percent: f64,
    pub years: u32,
}

impl LoanTerms {
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(LedgerError::InvalidLoanTerms(format!(
                "principal must be a positive amount, got {}",
                self.principal
            )));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(LedgerError::InvalidLoanTerms(format!(
                "annual rate must be zero or positive, got {}",
                self.annual_rate_percent
            )));
        }
        if self.years == 0 || self.years > MAX_TERM_YEARS {
            return Err(LedgerError::InvalidLoanTerms(format!(
                "term must be between 1 and {} years, got {}",
                MAX_TERM_YEARS, self.years
            )));
        }
        if !self.monthly_payment().is_finite() {
            return Err(LedgerError::InvalidLoanTerms(format!(
                "monthly payment overflows for principal {}",
                self.principal
            )));
        }
        Ok(())
    }

    pub fn months(&self) -> u32 {
        self.years * MONTHS_PER_YEAR
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / f64::from(MONTHS_PER_YEAR)
    }

    /// Fixed annuity payment `P·r(1+r)^n / ((1+r)^n − 1)`, or `P/n` at 0%.
    pub fn monthly_payment(&self) -> f64 {
        let r = self.monthly_rate();
        let n = self.months();
        if r == 0.0 {
            return self.principal / f64::from(n);
        }
        let growth = (1.0 + r).powi(n as i32);
        self.principal * (r * growth) / (growth - 1.0)
    }
}

/// Round to cents from the exact binary value, ties to even, so `2.675`
/// (stored as 2.67499...) gives `2.67` and `0.125` gives `0.12`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Full schedule for `terms`. Figures are rounded to cents per row while the
/// running balance is carried unrounded.
pub fn schedule(terms: &LoanTerms) -> Result<Vec<PaymentRecord>> {
    terms.validate()?;

    let payment = terms.monthly_payment();
    let rate = terms.monthly_rate();
    let mut balance = terms.principal;

    let rows = (1..=terms.months())
        .map(|month| {
            let interest = balance * rate;
            let principal = payment - interest;
            balance -= principal;

            PaymentRecord {
                month,
                payment: round2(payment),
                principal_paid: round2(principal),
                interest_paid: round2(interest),
                remaining_balance: round2(balance.max(0.0)),
            }
        })
        .collect();

    Ok(rows)
}

/// Headline figures of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    pub months: u32,
}

impl LoanSummary {
    pub fn new(terms: &LoanTerms, rows: &[PaymentRecord]) -> Self {
        let monthly_payment = terms.monthly_payment();
        LoanSummary {
            monthly_payment,
            total_interest: rows.iter().map(|r| r.interest_paid).sum(),
            total_cost: monthly_payment * f64::from(terms.months()),
            months: terms.months(),
        }
    }
}

/// Seal every row of a schedule into `ledger`, in order.
pub fn seal_schedule(ledger: &mut Ledger, rows: &[PaymentRecord]) -> Result<()> {
    for row in rows {
        ledger.append_record(row)?;
    }
    Ok(())
}

/// Amortize `terms` and record the schedule in a fresh ledger.
pub fn build_ledger(terms: &LoanTerms) -> Result<(Ledger, LoanSummary)> {
    let rows = schedule(terms)?;
    let mut ledger = Ledger::new();
    seal_schedule(&mut ledger, &rows)?;

    let summary = LoanSummary::new(terms, &rows);
    info!(
        principal = terms.principal,
        rate = terms.annual_rate_percent,
        years = terms.years,
        blocks = ledger.len(),
        tip = %ledger.tip().hash(),
        "ledger.sealed"
    );
    Ok((ledger, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mortgage() -> LoanTerms {
        LoanTerms {
            principal: 250_000.0,
            annual_rate_percent: 6.5,
            years: 30,
        }
    }

    #[test]
    fn test_monthly_payment_formula() {
        assert_eq!(round2(mortgage().monthly_payment()), 1580.17);
    }

    #[test]
    fn test_round2_uses_exact_decimal_value() {
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1354.166666), 1354.17);
        assert_eq!(round2(226.0), 226.0);
    }

    #[test]
    fn test_first_month_split() {
        let rows = schedule(&mortgage()).unwrap();
        let first = rows[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.payment, 1580.17);
        assert_eq!(first.interest_paid, 1354.17);
        assert_eq!(first.principal_paid, 226.0);
        assert_eq!(first.remaining_balance, 249774.0);
    }

    #[test]
    fn test_schedule_pays_off_the_loan() {
        let rows = schedule(&mortgage()).unwrap();
        assert_eq!(rows.len(), 360);
        assert_eq!(rows.last().unwrap().month, 360);
        assert!(rows.last().unwrap().remaining_balance.abs() < 0.01);
        let principal: f64 = rows.iter().map(|r| r.principal_paid).sum();
        assert!((principal - 250_000.0).abs() < 1.0);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms {
            principal: 12_000.0,
            annual_rate_percent: 0.0,
            years: 1,
        };
        let rows = schedule(&terms).unwrap();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.payment == 1000.0 && r.interest_paid == 0.0));
        assert_eq!(rows[5].remaining_balance, 6000.0);
        assert_eq!(LoanSummary::new(&terms, &rows).total_interest, 0.0);
    }

    #[test]
    fn test_invalid_terms_are_rejected() {
        let bad = [
            LoanTerms { principal: 0.0, ..mortgage() },
            LoanTerms { principal: f64::NAN, ..mortgage() },
            LoanTerms { annual_rate_percent: -1.0, ..mortgage() },
            LoanTerms { years: 0, ..mortgage() },
            LoanTerms { years: 51, ..mortgage() },
            LoanTerms {
                principal: 1e308,
                annual_rate_percent: 15.0,
                years: 50,
            },
        ];
        for terms in bad {
            assert!(matches!(
                schedule(&terms),
                Err(LedgerError::InvalidLoanTerms(_))
            ));
        }
    }

    #[test]
    fn test_build_ledger_seals_every_month() {
        let (ledger, summary) = build_ledger(&mortgage()).unwrap();
        assert_eq!(ledger.len(), 361);
        assert_eq!(summary.months, 360);
        assert!((summary.total_cost - summary.monthly_payment * 360.0).abs() < 1e-6);
        assert!(summary.total_interest > 0.0);
        assert_eq!(ledger.verify().unwrap(), 361);
    }
}
