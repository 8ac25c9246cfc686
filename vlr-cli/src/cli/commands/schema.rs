use anyhow::Result;
use colored::*;

use crate::forms::rules::{Condition, FieldRule};
use crate::forms::schema::FormCheck;
use crate::forms::ContentKind;

fn describe_rule(rule: &FieldRule) -> String {
    match rule {
        FieldRule::Required(_) => "required".to_string(),
        FieldRule::Length { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("length {}..{}", min, max),
            (Some(min), None) => format!("length >= {}", min),
            (None, Some(max)) => format!("length <= {}", max),
            (None, None) => "any length".to_string(),
        },
        FieldRule::NumberRange { min, max } => match max {
            Some(max) => format!("number {}..{}", min, max),
            None => format!("number >= {}", min),
        },
        FieldRule::Pattern(p) => format!("{:?}", p).to_lowercase(),
        FieldRule::NotInPast => "not in the past".to_string(),
        FieldRule::File { constraint, required } => format!(
            "{}file {} up to {}",
            if *required { "required " } else { "" },
            constraint.allowed_label,
            constraint.max_label()
        ),
    }
}

fn describe_condition(condition: &Condition) -> String {
    match condition {
        Condition::Equals(field, value) => format!("{} = {}", field, value),
        Condition::HasValue(field) => format!("{} is set", field),
    }
}

fn describe_check(check: &FormCheck) -> String {
    match check {
        FormCheck::TagsRequired => "at least one tag".to_string(),
        FormCheck::DateRange { start, end } => format!("{} before {}", start, end),
        FormCheck::AtLeastOneChecked { fields, .. } => {
            format!("one of {} checked", fields.join(", "))
        }
        FormCheck::QuestionsSelected { min } => format!("at least {} question(s) picked", min),
    }
}

pub fn handle_schema_command(kind: ContentKind) -> Result<()> {
    let schema = kind.schema();
    let endpoints = schema.endpoints;
    println!("{} ({})", kind.to_string().bold(), schema.payload_attr.dimmed());
    println!(
        "  add {}/{}  edit {}/{}  delete {}/{}",
        endpoints.controller,
        endpoints.add,
        endpoints.controller,
        endpoints.edit,
        endpoints.controller,
        endpoints.delete
    );
    println!();

    for field in &schema.fields {
        let rules: Vec<String> = field.rules.iter().map(describe_rule).collect();
        let mut line = format!("  {} {:<10}", format!("{:<22}", field.id).cyan(), field.kind.to_string());
        if !rules.is_empty() {
            line.push_str(&format!(" {}", rules.join(", ")));
        }
        if !field.when.is_empty() {
            let when: Vec<String> = field.when.iter().map(describe_condition).collect();
            line.push_str(&format!(" {}", format!("when {}", when.join(" and ")).dimmed()));
        }
        println!("{}", line.trim_end());
    }

    if !schema.checks.is_empty() {
        println!();
        for check in &schema.checks {
            println!("  {} {}", "•".yellow(), describe_check(check));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::rules::FileConstraint;

    #[test]
    fn test_describe_rules() {
        assert_eq!(describe_rule(&FieldRule::PERCENTAGE), "number 0..100");
        assert_eq!(
            describe_rule(&FieldRule::File {
                constraint: FileConstraint::AUDIO,
                required: true
            }),
            format!("required file {} up to 10MB", FileConstraint::AUDIO.allowed_label)
        );
        assert_eq!(
            describe_condition(&Condition::Equals("audio_source", "url")),
            "audio_source = url"
        );
    }
}
