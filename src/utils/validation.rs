use validator::Validate;

use crate::error::Result;
use crate::models::template::Template;
use crate::utils::csv::ValidRow;

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate()?;
    Ok(())
}

/// Index of the first recipient whose variable count differs from the template's.
pub fn first_arity_mismatch(template: &Template, recipients: &[ValidRow]) -> Option<usize> {
    recipients
        .iter()
        .position(|r| r.dynamic_variables.len() != template.variable_count)
}
