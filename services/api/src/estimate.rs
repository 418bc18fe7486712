use crate::cli::ModelArgs;
use crate::infra::resolve_pricing;
use clap::Args;
use price_estimator::config::AppConfig;
use price_estimator::error::AppError;
use price_estimator::pricing::service::current_year;
use price_estimator::pricing::{BatchResponse, PricingService, PropertyFeatures, ResolveError};
use price_estimator::telemetry;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Number of bedrooms
    #[arg(long)]
    pub(crate) bedrooms: u32,
    /// Number of bathrooms
    #[arg(long)]
    pub(crate) bathrooms: u32,
    /// Built-up area in square feet
    #[arg(long, value_parser = parse_positive)]
    pub(crate) size_sqft: f64,
    /// School rating on a 0-10 scale
    #[arg(long, value_parser = parse_rating)]
    pub(crate) school_rating: f64,
    /// Approximate commute time in minutes
    #[arg(long, value_parser = parse_non_negative)]
    pub(crate) commute_time: f64,
    /// Age of the property in years
    #[arg(long, value_parser = parse_non_negative)]
    pub(crate) property_age: f64,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

impl PredictArgs {
    fn features(&self) -> PropertyFeatures {
        PropertyFeatures {
            bedrooms: Some(f64::from(self.bedrooms)),
            bathrooms: Some(f64::from(self.bathrooms)),
            size_sqft: Some(self.size_sqft),
            school_rating: Some(self.school_rating),
            commute_time: Some(self.commute_time),
            property_age: Some(self.property_age),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding `{"properties": [...]}` or a bare array of records
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Year used to derive ages from `year_built` (defaults to the current year)
    #[arg(long)]
    pub(crate) as_of_year: Option<i32>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Wrapped { properties: Vec<Value> },
    Bare(Vec<Value>),
}

impl BatchFile {
    fn into_properties(self) -> Vec<Value> {
        match self {
            BatchFile::Wrapped { properties } | BatchFile::Bare(properties) => properties,
        }
    }
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let (service, cause) = resolve_pricing(&mut config, &args.model);

    let price = service.predict(&args.features())?;

    println!("Predicted price: {price:.2}");
    render_model_source(&service, cause.as_ref());
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let (service, cause) = resolve_pricing(&mut config, &args.model);

    let raw = std::fs::read(&args.input)?;
    let properties = serde_json::from_slice::<BatchFile>(&raw)?.into_properties();
    let year = args.as_of_year.unwrap_or_else(current_year);

    let batch = service.score_batch(&properties, year);
    let skipped = batch.skipped;
    let response = BatchResponse::from(batch);

    println!("{}", serde_json::to_string_pretty(&response)?);
    eprintln!(
        "Scored {} of {} records ({} skipped)",
        response.predictions.len(),
        properties.len(),
        skipped
    );
    render_model_source(&service, cause.as_ref());
    Ok(())
}

fn render_model_source(service: &PricingService, cause: Option<&ResolveError>) {
    let name = service.model().name();
    match cause {
        None if service.provenance().ml_used => eprintln!("Model: {name} (artifact)"),
        None => eprintln!("Model: {name} (fallback)"),
        Some(cause) => eprintln!("Model: {name} (fallback: {cause})"),
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{raw}' is not a finite number"))
}

fn parse_positive(raw: &str) -> Result<f64, String> {
    let value = parse_number(raw)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be greater than 0"))
    }
}

fn parse_non_negative(raw: &str) -> Result<f64, String> {
    let value = parse_number(raw)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be 0 or greater"))
    }
}

fn parse_rating(raw: &str) -> Result<f64, String> {
    let value = parse_number(raw)?;
    if (0.0..=10.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} must be between 0 and 10"))
    }
}
