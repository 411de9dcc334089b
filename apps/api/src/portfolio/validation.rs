use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::portfolio::Portfolio;

pub const MAX_BIO_CHARS: usize = 200;
pub const MAX_SLUG_LEN: usize = 64;

/// Trims text fields and drops the blank rows and tags the dashboard form leaves behind.
pub fn normalize(mut portfolio: Portfolio) -> Portfolio {
    portfolio.slug = portfolio.slug.trim().to_string();
    portfolio.name = portfolio.name.trim().to_string();
    portfolio.title = portfolio.title.trim().to_string();
    portfolio.bio = portfolio.bio.trim().to_string();
    portfolio.image = portfolio
        .image
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    portfolio.skills = trimmed_non_empty(portfolio.skills);
    portfolio.projects = trimmed_non_empty(portfolio.projects);
    portfolio.experience.retain(|entry| !entry.is_blank());
    portfolio.education.retain(|entry| !entry.is_blank());
    for url in portfolio.social_links.values_mut() {
        *url = url.trim().to_string();
    }
    portfolio.background_color = portfolio.background_color.trim().to_string();
    portfolio.gradient_start = portfolio.gradient_start.trim().to_string();
    portfolio.gradient_end = portfolio.gradient_end.trim().to_string();
    portfolio
}

fn trimmed_non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Validates a normalized portfolio before it is written.
pub fn validate(portfolio: &Portfolio) -> Result<(), AppError> {
    if portfolio.slug.is_empty() || portfolio.name.is_empty() {
        return Err(AppError::Validation("Slug and name are required".to_string()));
    }

    validate_slug(&portfolio.slug)?;

    let bio_len = portfolio.bio.chars().count();
    if bio_len > MAX_BIO_CHARS {
        return Err(AppError::Validation(format!(
            "Bio must be at most {MAX_BIO_CHARS} characters (got {bio_len})"
        )));
    }

    for (i, entry) in portfolio.experience.iter().enumerate() {
        check_date_range(&format!("experience[{i}]"), entry.start_date, entry.end_date)?;
    }
    for (i, entry) in portfolio.education.iter().enumerate() {
        check_date_range(&format!("education[{i}]"), entry.start_date, entry.end_date)?;
    }

    for (field, value) in [
        ("backgroundColor", &portfolio.background_color),
        ("gradientStart", &portfolio.gradient_start),
        ("gradientEnd", &portfolio.gradient_end),
    ] {
        if !is_hex_color(value) {
            return Err(AppError::Validation(format!(
                "{field} must be a hex color like #4F46E5 (got '{value}')"
            )));
        }
    }

    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() > MAX_SLUG_LEN {
        return Err(AppError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "Slug may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

fn check_date_range(
    entry: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(format!(
            "{entry}: end date {end} is before start date {start}"
        ))),
        _ => Ok(()),
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
