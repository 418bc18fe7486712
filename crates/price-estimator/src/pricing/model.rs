use super::features::FeatureVector;

/// Capability shared by every price model: one price per row, same order.
pub trait PriceModel: Send + Sync {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError>;

    /// Short label surfaced in logs and health output.
    fn name(&self) -> &str;

    /// Predict from untyped rows, rejecting any row that is not exactly six values wide.
    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let vectors = rows
            .iter()
            .map(|row| FeatureVector::try_from(row.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;
        self.predict(&vectors)
    }
}

/// Errors raised by a model's prediction capability.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(
        "malformed feature row: expected {expected} values \
         [bedrooms, bathrooms, size_sqft, school_rating, commute_time, property_age], found {found}"
    )]
    MalformedFeatureRow { expected: usize, found: usize },
    #[error("model produced a non-finite price ({value}) for row {row}")]
    NonFiniteOutput { row: usize, value: f64 },
}

/// Weights applied by [`HeuristicModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicCoefficients {
    pub base_price: f64,
    pub per_bedroom: f64,
    pub per_bathroom: f64,
    pub per_sqft: f64,
    /// Premium for a perfect school rating; scaled by `rating / 10`.
    pub school_premium: f64,
    pub commute_penalty_per_minute: f64,
    pub age_penalty_per_year: f64,
    pub rounding_step: f64,
    pub minimum_price: f64,
}

impl HeuristicCoefficients {
    pub const STANDARD: Self = Self {
        base_price: 200_000.0,
        per_bedroom: 60_000.0,
        per_bathroom: 40_000.0,
        per_sqft: 120.0,
        school_premium: 30_000.0,
        commute_penalty_per_minute: 1_000.0,
        age_penalty_per_year: 800.0,
        rounding_step: 100.0,
        minimum_price: 50_000.0,
    };
}

impl Default for HeuristicCoefficients {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Deterministic closed-form pricing used whenever no trusted artifact is available.
#[derive(Debug, Clone, Default)]
pub struct HeuristicModel {
    coefficients: HeuristicCoefficients,
}

impl HeuristicModel {
    pub fn new(coefficients: HeuristicCoefficients) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &HeuristicCoefficients {
        &self.coefficients
    }

    pub fn price(&self, features: &FeatureVector) -> f64 {
        let c = &self.coefficients;
        let [bedrooms, bathrooms, size_sqft, school_rating, commute_time, property_age] =
            features.as_array();

        let raw = c.base_price
            + bedrooms * c.per_bedroom
            + bathrooms * c.per_bathroom
            + size_sqft * c.per_sqft
            + (school_rating / 10.0) * c.school_premium
            - commute_time * c.commute_penalty_per_minute
            - property_age * c.age_penalty_per_year;

        let rounded = if c.rounding_step > 0.0 {
            (raw / c.rounding_step).round() * c.rounding_step
        } else {
            raw
        };

        // `f64::max` also maps NaN onto the floor.
        rounded.max(c.minimum_price)
    }
}

impl PriceModel for HeuristicModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        rows.iter()
            .enumerate()
            .map(|(row, features)| match self.price(features) {
                value if value.is_finite() => Ok(value),
                value => Err(ModelError::NonFiniteOutput { row, value }),
            })
            .collect()
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
