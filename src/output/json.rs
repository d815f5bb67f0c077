use crate::model::Advisory;
use anyhow::Result;

pub fn generate_json_string(advisories: &[Advisory]) -> Result<String> {
    Ok(serde_json::to_string_pretty(advisories)?)
}

pub fn print_json(advisories: &[Advisory]) -> Result<()> {
    println!("{}", generate_json_string(advisories)?);
    Ok(())
}
