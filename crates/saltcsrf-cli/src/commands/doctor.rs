//! Doctor command to check salt configuration health

use crate::cli::SourceArgs;
use anyhow::Result;
use console::{style, Emoji};
use saltcsrf_core::SaltList;
use std::collections::HashSet;
use std::process::ExitCode;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "+ ");
static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "! ");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "x ");

/// Salts shorter than this are reported as weak.
const MIN_RECOMMENDED_SALT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Finding {
    Ok(String),
    Warn(String),
    Error(String),
}

pub fn doctor(source: &SourceArgs) -> Result<ExitCode> {
    println!(
        "{} {}",
        style("Checking salt configuration from").bold(),
        style(source.describe()).cyan()
    );
    println!();

    let salts = source.salt_source()?.salt_list();
    let findings = inspect(&salts);

    let mut failed = false;
    for finding in &findings {
        match finding {
            Finding::Ok(msg) => println!("{} {}", CHECK, msg),
            Finding::Warn(msg) => println!("{} {}", WARN, style(msg).yellow()),
            Finding::Error(msg) => {
                failed = true;
                println!("{} {}", ERROR, style(msg).red());
            }
        }
    }

    println!();
    if failed {
        println!("{}", style("Doctor found problems.").red());
        Ok(ExitCode::FAILURE)
    } else {
        println!("{}", style("Doctor check passed!").green());
        Ok(ExitCode::SUCCESS)
    }
}

/// Never includes salt values in the findings, only positions.
fn inspect(salts: &SaltList) -> Vec<Finding> {
    if salts.is_empty() {
        return vec![Finding::Error(
            "no salts configured, tokens cannot be issued or validated".to_string(),
        )];
    }

    let mut findings = vec![Finding::Ok(format!(
        "{} salt(s) configured, 1 current and {} retired",
        salts.len(),
        salts.len() - 1
    ))];

    let mut seen = HashSet::new();
    for (idx, salt) in salts.iter().enumerate() {
        let value = salt.as_bytes();

        if value.is_empty() {
            findings.push(Finding::Error(format!(
                "salt #{} is empty, validation stops there and rejects tokens issued under later salts",
                idx
            )));
            continue;
        }
        let padded = value.first().is_some_and(u8::is_ascii_whitespace)
            || value.last().is_some_and(u8::is_ascii_whitespace);
        if padded {
            findings.push(Finding::Warn(format!(
                "salt #{} has leading or trailing whitespace, which is part of the salt",
                idx
            )));
        }
        if salt.to_str().is_none() {
            findings.push(Finding::Warn(format!(
                "salt #{} is not valid UTF-8 and is used as raw bytes",
                idx
            )));
        }
        if value.len() < MIN_RECOMMENDED_SALT_LEN {
            findings.push(Finding::Warn(format!(
                "salt #{} is shorter than {} bytes",
                idx, MIN_RECOMMENDED_SALT_LEN
            )));
        }
        if !seen.insert(value) {
            findings.push(Finding::Warn(format!(
                "salt #{} duplicates an earlier salt and only costs extra derivations",
                idx
            )));
        }
    }

    if findings.len() == 1 {
        findings.push(Finding::Ok("no problems found in individual salts".to_string()));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(findings: &[Finding], f: fn(&Finding) -> bool) -> usize {
        findings.iter().filter(|x| f(x)).count()
    }

    #[test]
    fn test_empty_list_is_error() {
        let findings = inspect(&SaltList::new());
        assert_eq!(findings.len(), 1);
        assert!(matches!(findings[0], Finding::Error(_)));
    }

    #[test]
    fn test_healthy_list() {
        let findings = inspect(&SaltList::parse(
            "aaaaaaaaaaaaaaaaaaaaaaaa,bbbbbbbbbbbbbbbbbbbbbbbb",
        ));
        assert_eq!(count(&findings, |f| matches!(f, Finding::Ok(_))), 2);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_reports_problems_by_position() {
        let findings = inspect(&SaltList::parse("short,, padded-salt-value-xxxx,short"));

        assert_eq!(count(&findings, |f| matches!(f, Finding::Error(_))), 1);
        assert!(findings.contains(&Finding::Error(
            "salt #1 is empty, validation stops there and rejects tokens issued under later salts"
                .to_string()
        )));
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::Warn(m) if m.starts_with("salt #2 has leading"))));
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::Warn(m) if m.starts_with("salt #3 duplicates"))));
    }

    #[test]
    fn test_reports_non_utf8_salt() {
        let findings = inspect(&SaltList::parse_bytes(
            b"aaaaaaaaaaaaaaaaaaaaaaaa,\xe9bbbbbbbbbbbbbbbbbbbbbbb",
        ));
        assert_eq!(count(&findings, |f| matches!(f, Finding::Error(_))), 0);
        assert!(findings.contains(&Finding::Warn(
            "salt #1 is not valid UTF-8 and is used as raw bytes".to_string()
        )));
    }

    #[test]
    fn test_findings_do_not_leak_salts() {
        let findings = inspect(&SaltList::parse("topsecret,topsecret"));
        for finding in findings {
            let msg = match finding {
                Finding::Ok(m) | Finding::Warn(m) | Finding::Error(m) => m,
            };
            assert!(!msg.contains("topsecret"));
        }
    }
}
