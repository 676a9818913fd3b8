use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Value};

use reconcile_diff::{compute_merge, render_record_diff, DiffLine};
use reconcile_merge::{merge_contact_details, reconcile_people, MergeConfig, MergeOutcome};
use reconcile_types::{normalize_offices, Operation};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Contacts(args) => cmd_contacts(args, &cli.format),
    }
}

fn read_record(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let old = read_record(&args.old)?;
    let new = read_record(&args.new)?;
    let changes = compute_merge(&old, &new, args.keep_both_ids)?;

    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }
    if changes.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for op in &changes {
        match op {
            Operation::Append { path, value } => {
                println!("  {} {} += {}", "append".green(), path.to_string().bold(), value);
            }
            Operation::Replace { path, old: Some(old), new } => {
                println!("  {} {}: {} → {}", "replace".yellow(), path.to_string().bold(), old.to_string().dimmed(), new);
            }
            Operation::Replace { path, old: None, new } => {
                println!("  {} {}: {}", "set".cyan(), path.to_string().bold(), new);
            }
        }
    }
    println!("{} append(s), {} replace(s)", changes.appends(), changes.replaces());
    Ok(())
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("failed to load merge config {}", path.display()))?,
        None => MergeConfig::default(),
    };
    if args.keep_both_ids {
        config.keep_both_ids = true;
    }

    let old = read_record(&args.old)?;
    let new = read_record(&args.new)?;
    let merged = match reconcile_people(&old, &new, &config)? {
        MergeOutcome::Unchanged => {
            match format {
                OutputFormat::Json => println!("{}", json!({"changed": false})),
                OutputFormat::Text => println!("{} No changes.", "✓".green()),
            }
            return Ok(());
        }
        MergeOutcome::Changed(merged) => merged,
    };

    if args.show_diff {
        print_record_diff(&old, &merged)?;
    }

    let rendered = serde_json::to_string_pretty(&merged)?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            match format {
                OutputFormat::Json => println!("{}", json!({"changed": true, "output": path.display().to_string()})),
                OutputFormat::Text => println!("{} Merged record written to {}", "✓".green().bold(), path.display()),
            }
        }
        None => match format {
            OutputFormat::Json => println!("{}", json!({"changed": true, "record": merged})),
            OutputFormat::Text => println!("{rendered}"),
        },
    }
    Ok(())
}

fn print_record_diff(old: &Value, merged: &Value) -> anyhow::Result<()> {
    let diff = render_record_diff(old, merged)?;
    for hunk in &diff.hunks {
        println!("{}", hunk.header().cyan());
        for line in &hunk.lines {
            match line {
                DiffLine::Added(_) => println!("{}", line.to_string().green()),
                DiffLine::Removed(_) => println!("{}", line.to_string().red()),
                DiffLine::Context(_) => println!("{}", line.to_string().dimmed()),
            }
        }
    }
    println!("{} insertion(s), {} deletion(s)", diff.additions().to_string().green(), diff.deletions().to_string().red());
    Ok(())
}

fn contact_list(record: &Value, path: &Path) -> anyhow::Result<Vec<Value>> {
    let mut fields = record
        .as_object()
        .cloned()
        .with_context(|| format!("{} is not a record", path.display()))?;
    normalize_offices(&mut fields)?;
    match fields.shift_remove("contact_details") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => anyhow::bail!("{}: contact_details is not a list", path.display()),
    }
}

fn cmd_contacts(args: ContactsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let old = contact_list(&read_record(&args.old)?, &args.old)?;
    let new = contact_list(&read_record(&args.new)?, &args.new)?;

    match merge_contact_details(&old, &new)? {
        MergeOutcome::Unchanged => match format {
            OutputFormat::Json => println!("{}", json!({"changed": false})),
            OutputFormat::Text => println!("{} Contact details unchanged.", "✓".green()),
        },
        MergeOutcome::Changed(merged) => match format {
            OutputFormat::Json => println!("{}", json!({"changed": true, "contact_details": merged})),
            OutputFormat::Text => {
                for entry in &merged {
                    let note = entry.get("note").and_then(Value::as_str).unwrap_or("(no note)");
                    println!("{}", note.yellow().bold());
                    if let Some(fields) = entry.as_object() {
                        for (key, value) in fields.iter().filter(|(k, _)| k.as_str() != "note") {
                            println!("  {}: {}", key, value);
                        }
                    }
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_json(dir: &tempfile::TempDir, name: &str, value: Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn merge_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_json(&dir, "old.json", json!({"name": "Bob", "extras": {"_internal_id": 1}}));
        let new = write_json(&dir, "new.json", json!({"name": "Robert"}));
        let output = dir.path().join("merged.json");

        cmd_merge(
            MergeArgs {
                old,
                new,
                keep_both_ids: false,
                config: None,
                output: Some(output.clone()),
                show_diff: true,
            },
            &OutputFormat::Text,
        )
        .unwrap();

        let merged: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(
            merged,
            json!({"name": "Robert", "other_names": [{"name": "Bob"}], "extras": {"_internal_id": 1}})
        );
    }

    #[test]
    fn merge_unchanged_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_json(&dir, "old.json", json!({"name": "Anna", "birth_date": "1980"}));
        let new = write_json(&dir, "new.json", json!({"name": "Anna"}));
        let output = dir.path().join("merged.json");

        cmd_merge(
            MergeArgs { old, new, keep_both_ids: false, config: None, output: Some(output.clone()), show_diff: false },
            &OutputFormat::Json,
        )
        .unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn merge_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_json(&dir, "old.json", json!({"id": "1"}));
        let new = write_json(&dir, "new.json", json!({"id": "2"}));
        let config = dir.path().join("merge.toml");
        fs::write(&config, "keep_both_ids = true\nidentifier_scheme = \"legacy\"\n").unwrap();
        let output = dir.path().join("merged.json");

        cmd_merge(
            MergeArgs { old, new, keep_both_ids: false, config: Some(config), output: Some(output.clone()), show_diff: false },
            &OutputFormat::Text,
        )
        .unwrap();

        let merged: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(merged["other_identifiers"], json!([{"identifier": "2", "scheme": "legacy"}]));
    }

    #[test]
    fn diff_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.json");
        fs::write(&old, "{not json").unwrap();
        let new = write_json(&dir, "new.json", json!({}));
        let err = cmd_diff(DiffArgs { old, new, keep_both_ids: false }, &OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn diff_text_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_json(&dir, "old.json", json!({"name": "A", "links": []}));
        let new = write_json(&dir, "new.json", json!({"name": "B", "links": [{"url": "x"}]}));
        for format in [OutputFormat::Text, OutputFormat::Json] {
            cmd_diff(
                DiffArgs { old: old.clone(), new: new.clone(), keep_both_ids: true },
                &format,
            )
            .unwrap();
        }
    }

    #[test]
    fn contact_list_normalizes_offices() {
        let record = json!({"capitol_office": {"voice": "123"}});
        let list = contact_list(&record, Path::new("old.json")).unwrap();
        assert_eq!(list, vec![json!({"note": "Capitol Office", "voice": "123"})]);
        assert!(contact_list(&json!({}), Path::new("new.json")).unwrap().is_empty());
    }

    #[test]
    fn contacts_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_json(&dir, "old.json", json!({"contact_details": [{"note": "Capitol Office", "voice": "1"}]}));
        let new = write_json(&dir, "new.json", json!({"district_office": {"address": "abc"}}));
        cmd_contacts(ContactsArgs { old, new }, &OutputFormat::Text).unwrap();
    }
}
