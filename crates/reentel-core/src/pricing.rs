//! # Pricing Engine
//!
//! Discount, missing-amount and price computation for one purchase.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pricing Pipeline                                 │
//! │                                                                         │
//! │  CalculationInput ──validate()──► ValidatedInput                       │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  compute_discount_percent(balance, tier) → Standard 20% / Premium 30%  │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  base_price  = quantity × token_price × multiplier                     │
//! │  final_price = base_price × (100 − discount) / 100                     │
//! │  discount    = base_price − final_price                                │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  display currency conversion (USDT/USD 1:1, EUR × rate)                │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                               CalculationResult                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Decimal?
//! `0.183 × 1000 × 0.7` is exactly `128.1` here. With `f64` it is
//! `128.09999999999999`, which the receipt would then have to hide.

use rust_decimal::Decimal;

use crate::error::{ValidationError, ValidationErrors};
use crate::rules::PricingRules;
use crate::types::{
    CalculationInput, CalculationResult, DiscountTier, DisplayCurrency, RateSnapshot, StatusTier,
    ValidatedInput,
};
use crate::validation::{validate_balance, validate_payment_method, validate_purchase_quantity};

/// Stateless pricing engine bound to one set of rules.
///
/// ## Example
/// ```rust
/// use reentel_core::{PricingEngine, PricingRules, RateSnapshot, StatusTier};
/// use rust_decimal_macros::dec;
///
/// let engine = PricingEngine::new(PricingRules::current());
/// let discount = engine.compute_discount_percent(Some(dec!(8000)), StatusTier::SuperReentel);
/// assert_eq!(discount.percent(), 30);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingEngine {
    rules: PricingRules,
}

impl PricingEngine {
    pub fn new(rules: PricingRules) -> Self {
        PricingEngine { rules }
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    // =========================================================================
    // Discount & Missing Amount
    // =========================================================================

    /// Picks the discount tier for a buyer.
    ///
    /// Premium only for SuperReentel with at least
    /// `premium_discount_min_balance` xRNT. Absent or negative balances count
    /// as zero.
    pub fn compute_discount_percent(
        &self,
        current_balance: Option<Decimal>,
        tier: StatusTier,
    ) -> DiscountTier {
        let balance = effective_balance(current_balance);

        match tier {
            StatusTier::SuperReentel if balance >= self.rules.premium_discount_min_balance => {
                DiscountTier::Premium
            }
            _ => DiscountTier::Standard,
        }
    }

    /// xRNT still needed to reach `tier`. Never negative.
    ///
    /// ## Example
    /// ```rust
    /// use reentel_core::{PricingEngine, StatusTier};
    /// use rust_decimal_macros::dec;
    ///
    /// let engine = PricingEngine::default();
    /// assert_eq!(engine.compute_missing_amount(Some(dec!(10000)), StatusTier::ReentelPro), dec!(4000));
    /// assert_eq!(engine.compute_missing_amount(None, StatusTier::SuperReentel), dec!(28000));
    /// ```
    pub fn compute_missing_amount(
        &self,
        current_balance: Option<Decimal>,
        tier: StatusTier,
    ) -> Decimal {
        let needed = self.rules.status_threshold(tier);
        let balance = effective_balance(current_balance);

        (needed - balance).max(Decimal::ZERO)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates every form field and collects all failures.
    ///
    /// Each field is checked independently so the UI can mark all invalid
    /// fields after a single submit.
    pub fn validate(&self, input: &CalculationInput) -> Result<ValidatedInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let current_balance = keep_ok(
            validate_balance(input.current_balance.as_deref()),
            &mut errors,
        );
        let purchase_quantity = keep_ok(
            validate_purchase_quantity(input.purchase_quantity.as_deref()),
            &mut errors,
        );
        let payment_method = keep_ok(
            validate_payment_method(input.payment_method, self.rules.payment_methods),
            &mut errors,
        );

        match (current_balance, purchase_quantity, payment_method) {
            (Some(current_balance), Some(purchase_quantity), Some(payment_method)) => errors
                .into_result(ValidatedInput {
                    current_balance,
                    tier: input.tier,
                    purchase_quantity,
                    payment_method,
                }),
            _ => Err(errors),
        }
    }

    // =========================================================================
    // Result
    // =========================================================================

    /// Prices a validated purchase against one rate snapshot.
    ///
    /// Pure and deterministic: the same input and snapshot always give an
    /// identical result. The loading placeholder (token price 0) yields an
    /// all-zero result. Products saturate at `Decimal::MAX` instead of
    /// overflowing.
    pub fn compute_result(&self, input: &ValidatedInput, rates: &RateSnapshot) -> CalculationResult {
        let discount = self.compute_discount_percent(input.current_balance, input.tier);

        let base_price = input
            .purchase_quantity
            .saturating_mul(rates.token_price_usdt())
            .saturating_mul(self.rules.price_multiplier);

        // The factor is below 1, so this never exceeds base_price.
        let final_price = base_price.saturating_mul(discount.price_factor());
        let discount_amount = base_price - final_price;

        let display_currency = input.payment_method.display_currency();

        CalculationResult {
            discount_percent: discount.percent(),
            base_price,
            discount_amount,
            final_price,
            display_currency,
            final_price_in_display_currency: display_currency.convert_from_usdt(final_price, rates),
            savings: display_currency.convert_from_usdt(discount_amount, rates),
            eur_equivalent: DisplayCurrency::Eur.convert_from_usdt(final_price, rates),
        }
    }

    /// Validates then prices in one step.
    pub fn calculate(
        &self,
        input: &CalculationInput,
        rates: &RateSnapshot,
    ) -> Result<(ValidatedInput, CalculationResult), ValidationErrors> {
        let validated = self.validate(input)?;
        let result = self.compute_result(&validated, rates);
        Ok((validated, result))
    }
}

/// Balance used by the tier rules: absent or negative counts as zero.
fn effective_balance(current_balance: Option<Decimal>) -> Decimal {
    current_balance.unwrap_or_default().max(Decimal::ZERO)
}

fn keep_ok<T>(result: Result<T, ValidationError>, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
